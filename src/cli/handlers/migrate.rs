//! `migrate` subcommand and the blocking migration helpers it shares with
//! `serve` auto-migration.

use anyhow::{Context, bail};
use diesel::Connection;
use diesel::migration::Migration;
use diesel::pg::PgConnection;
use diesel_migrations::MigrationHarness;

use crate::config::{SERVICE_NAME, Settings};
use crate::db::MIGRATIONS;

pub struct MigrateCommandHandler {
    settings: Settings,
}

impl MigrateCommandHandler {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Applies, previews, or reverts migrations on the service database.
    pub async fn execute(&self, dry_run: bool, rollback: Option<u32>) -> anyhow::Result<()> {
        if rollback == Some(0) {
            bail!("number of rollback steps must be greater than 0");
        }
        let database = self.settings.primary_database()?;
        database.validate(SERVICE_NAME)?;
        let url = database.url();

        if dry_run {
            let pending = pending_migrations(url).await?;
            if pending.is_empty() {
                println!("No pending migrations, database is up to date");
            } else {
                println!("Pending migrations:");
                for name in &pending {
                    println!("  - {name}");
                }
            }
            return Ok(());
        }

        if let Some(steps) = rollback {
            let reverted = revert_migrations(url, steps).await?;
            println!("Rolled back {} migration(s):", reverted.len());
            for version in &reverted {
                println!("  - {version}");
            }
            return Ok(());
        }

        let applied = run_pending_migrations(url).await?;
        if applied.is_empty() {
            println!("No migrations to apply, database is up to date");
        } else {
            println!("Applied {} migration(s):", applied.len());
            for version in &applied {
                println!("  - {version}");
            }
        }
        Ok(())
    }
}

/// Runs `f` on a fresh synchronous connection in the blocking pool.
async fn with_connection<T, F>(url: String, f: F) -> anyhow::Result<T>
where
    T: Send + 'static,
    F: FnOnce(&mut PgConnection) -> anyhow::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut conn =
            PgConnection::establish(&url).context("failed to connect for migrations")?;
        f(&mut conn)
    })
    .await
    .context("migration task panicked")?
}

pub async fn pending_migrations(url: String) -> anyhow::Result<Vec<String>> {
    with_connection(url, |conn| {
        let pending = conn
            .pending_migrations(MIGRATIONS)
            .map_err(|e| anyhow::anyhow!(e))
            .context("failed to list pending migrations")?;
        Ok(pending
            .iter()
            .map(|m| m.name().to_string())
            .collect())
    })
    .await
}

/// Applies pending migrations and returns their versions.
pub async fn run_pending_migrations(url: String) -> anyhow::Result<Vec<String>> {
    with_connection(url, |conn| {
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| anyhow::anyhow!(e))
            .context("failed to run pending migrations")?;
        Ok(applied.iter().map(ToString::to_string).collect())
    })
    .await
}

pub async fn revert_migrations(url: String, steps: u32) -> anyhow::Result<Vec<String>> {
    with_connection(url, move |conn| {
        let applied = conn
            .applied_migrations()
            .map_err(|e| anyhow::anyhow!(e))
            .context("failed to list applied migrations")?;
        if applied.len() < steps as usize {
            bail!(
                "cannot roll back {steps} migration(s), only {} applied",
                applied.len()
            );
        }
        let mut reverted = Vec::with_capacity(steps as usize);
        for _ in 0..steps {
            let version = conn
                .revert_last_migration(MIGRATIONS)
                .map_err(|e| anyhow::anyhow!(e))
                .context("failed to revert migration")?;
            reverted.push(version.to_string());
        }
        Ok(reverted)
    })
    .await
}
