//! Applies command line overrides on top of file and environment settings.
//!
//! Precedence, lowest first: config file, `STARTER_*` variables,
//! `--verbose`/`--quiet`, then subcommand flags.

use super::parser::{Cli, Commands};
use crate::config::{ConfigError, ConfigLoader, Settings};

pub struct ConfigurationMerger {
    base: Settings,
}

impl ConfigurationMerger {
    pub fn new(base: Settings) -> Self {
        Self { base }
    }

    /// Loads unvalidated settings as selected by `--config` and `--env`.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut loader = ConfigLoader::new()?;
        if let Some(env) = cli.env {
            loader = loader.with_environment(env.into());
        }
        if let Some(path) = &cli.config {
            loader = loader.with_config_file(path)?;
        }
        tracing::debug!(environment = %loader.environment(), "Loading configuration");
        Ok(Self::new(loader.load_unvalidated()?))
    }

    /// Returns validated settings with CLI overrides applied.
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut settings = self.base.clone();

        if cli.verbose {
            settings.logger.level = "debug".to_string();
        } else if cli.quiet {
            settings.logger.level = "error".to_string();
        }

        if let Commands::Serve {
            host,
            port,
            log_level,
            ..
        } = cli.command()
        {
            if let Some(host) = host {
                settings.app.host = host;
            }
            if let Some(port) = port {
                settings.app.port = port;
            }
            if let Some(level) = log_level {
                settings.logger.level = level.as_str().to_string();
            }
        }

        settings.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::tests::{DEV_JSON, ENV_MUTEX, EnvGuard, setup_config_dir};
    use clap::Parser;

    fn base() -> Settings {
        let mut settings = Settings::default();
        let db = settings.primary_database_mut();
        db.user = "postgres".into();
        db.name = "starter".into();
        settings
    }

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["rest-api-starter"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn serve_flags_override_settings() {
        let merged = ConfigurationMerger::new(base())
            .merge_cli_args(&parse(&["serve", "--host", "127.0.0.1", "--port", "9100"]))
            .unwrap();
        assert_eq!(merged.app.address(), "127.0.0.1:9100");
    }

    #[test]
    fn log_level_flag_beats_verbose() {
        let merged = ConfigurationMerger::new(base())
            .merge_cli_args(&parse(&["--verbose", "serve", "--log-level", "trace"]))
            .unwrap();
        assert_eq!(merged.logger.level, "trace");

        let merged = ConfigurationMerger::new(base())
            .merge_cli_args(&parse(&["--quiet"]))
            .unwrap();
        assert_eq!(merged.logger.level, "error");
    }

    #[test]
    fn merged_settings_are_validated() {
        let mut settings = base();
        settings.databases.clear();
        let result = ConfigurationMerger::new(settings).merge_cli_args(&parse(&["serve"]));
        assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
    }

    #[test]
    fn from_cli_honors_config_flag() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let _env = EnvGuard::clean();
        let dir = setup_config_dir(&[("starter.json", DEV_JSON)]);
        let path = dir.path().join("starter.json");
        let cli = parse(&["--config", path.to_str().unwrap(), "serve", "--port", "7000"]);

        let merged = ConfigurationMerger::from_cli(&cli)
            .unwrap()
            .merge_cli_args(&cli)
            .unwrap();
        assert_eq!(merged.app.name, "starter-dev");
        assert_eq!(merged.app.port, 7000);
    }

    #[test]
    fn from_cli_uses_env_flag() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = setup_config_dir(&[("rest-api-starter.test.json", DEV_JSON)]);
        let mut env = EnvGuard::clean();
        env.set("STARTER_CONFIG_DIR", dir.path());

        let cli = parse(&["--env", "test"]);
        let merged = ConfigurationMerger::from_cli(&cli)
            .unwrap()
            .merge_cli_args(&cli)
            .unwrap();
        assert_eq!(merged.jwt_key, "dev-key");
    }
}
