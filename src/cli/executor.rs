//! Entry point from `main`: settings, logger, then the subcommand.

use super::config_merger::ConfigurationMerger;
use super::handlers::{MigrateCommandHandler, ServeCommandHandler};
use super::parser::{Cli, Commands};
use crate::config::Settings;
use crate::logger::init_logger;

pub async fn execute_command(cli: Cli) -> anyhow::Result<()> {
    let settings = ConfigurationMerger::from_cli(&cli)?.merge_cli_args(&cli)?;
    init_logger(settings.logger.clone().into_logger_config()?)?;
    dispatch(cli.command(), settings).await
}

async fn dispatch(command: Commands, settings: Settings) -> anyhow::Result<()> {
    match command {
        Commands::Serve { dry_run, .. } => ServeCommandHandler::new(settings).execute(dry_run).await,
        Commands::Migrate { dry_run, rollback } => {
            MigrateCommandHandler::new(settings)
                .execute(dry_run, rollback)
                .await
        }
    }
}
