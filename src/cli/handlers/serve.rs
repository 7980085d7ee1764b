//! `serve` subcommand: dry-run validation or the full server lifecycle.

use crate::api::routes::create_router;
use crate::config::{SERVICE_NAME, Settings};
use crate::db::establish_async_connection_pool;
use crate::server::Server;
use crate::state::AppState;

use super::migrate::run_pending_migrations;

pub struct ServeCommandHandler {
    settings: Settings,
}

impl ServeCommandHandler {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub async fn execute(&self, dry_run: bool) -> anyhow::Result<()> {
        if dry_run {
            self.validate_only()
        } else {
            self.serve().await
        }
    }

    /// Validates the configuration and prints what `serve` would use.
    pub fn validate_only(&self) -> anyhow::Result<()> {
        self.settings.validate()?;
        let database = self.settings.primary_database()?;

        println!("Configuration is valid");
        println!("  listen address: {}", self.settings.app.address());
        println!(
            "  database:       {}@{}:{}/{}",
            database.user, database.host, database.port, database.name
        );
        println!(
            "  logger:         {} ({})",
            self.settings.logger.level, self.settings.logger.format
        );
        Ok(())
    }

    async fn serve(&self) -> anyhow::Result<()> {
        let app = &self.settings.app;
        let database = self.settings.primary_database()?;

        tracing::info!(
            app_name = %app.name,
            version = crate::pkg_version(),
            address = %app.address(),
            request_timeout = app.request_timeout,
            shutdown_timeout = app.shutdown_timeout,
            "Application starting"
        );

        if database.auto_migrate {
            let applied = run_pending_migrations(database.url()).await?;
            tracing::info!(count = applied.len(), migrations = ?applied, "Migrations applied");
        }

        let pool = establish_async_connection_pool(database).await?;
        let router = create_router(AppState::new(pool), app.request_timeout());

        let server = Server::new();
        server.start(router, &app.address()).await?;
        server.run_until_signal(app.shutdown_timeout()).await?;

        tracing::info!(service = SERVICE_NAME, "Server exiting");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_settings() -> Settings {
        let mut settings = Settings::default();
        let db = settings.primary_database_mut();
        db.user = "postgres".into();
        db.name = "starter".into();
        settings
    }

    #[tokio::test]
    async fn dry_run_accepts_valid_settings() {
        let handler = ServeCommandHandler::new(valid_settings());
        assert!(handler.execute(true).await.is_ok());
        assert_eq!(handler.settings().app.port, 8080);
    }

    #[tokio::test]
    async fn dry_run_rejects_invalid_settings() {
        let mut settings = valid_settings();
        settings.app.port = 0;
        assert!(ServeCommandHandler::new(settings).execute(true).await.is_err());
    }
}
