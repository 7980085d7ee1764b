//! Layered configuration loading.
//!
//! Sources, lowest priority first:
//! 1. `{dir}/rest-api-starter.{environment}.json` (required)
//! 2. `{dir}/rest-api-starter.local.json` (optional)
//! 3. `STARTER_*` environment variables, `__` between nested keys
//!
//! A single file given through `STARTER_CONFIG_FILE` or `--config` replaces
//! steps 1 and 2.

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};

use crate::config::environment::Environment as AppEnvironment;
use crate::config::error::ConfigError;
use crate::config::settings::{SERVICE_NAME, Settings};

const CONFIG_DIR_ENV: &str = "STARTER_CONFIG_DIR";
const CONFIG_FILE_ENV: &str = "STARTER_CONFIG_FILE";
const DEFAULT_CONFIG_DIR: &str = "env";
const ENV_PREFIX: &str = "STARTER";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug)]
pub struct ConfigLoader {
    config_dir: PathBuf,
    /// Set when `STARTER_CONFIG_DIR` chose the directory.
    dir_from_env: bool,
    config_file: Option<PathBuf>,
    environment: AppEnvironment,
}

impl ConfigLoader {
    /// Reads `STARTER_CONFIG_DIR`, `STARTER_CONFIG_FILE` and `STARTER_APP_ENV`.
    ///
    /// # Errors
    ///
    /// Fails when both the directory and the file variables are set.
    pub fn new() -> Result<Self, ConfigError> {
        let dir_var = std::env::var(CONFIG_DIR_ENV).ok();
        let config_file = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);

        if dir_var.is_some() && config_file.is_some() {
            return Err(ConfigError::mutual_exclusivity(format!(
                "{CONFIG_DIR_ENV} and {CONFIG_FILE_ENV} cannot both be set; use \
                 {CONFIG_DIR_ENV} for layered files or {CONFIG_FILE_ENV} for a single file"
            )));
        }

        Ok(Self {
            dir_from_env: dir_var.is_some(),
            config_dir: dir_var
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR)),
            config_file,
            environment: AppEnvironment::from_env(),
        })
    }

    /// Loads exactly `path` instead of the layered files.
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        if self.dir_from_env {
            return Err(ConfigError::mutual_exclusivity(format!(
                "--config cannot be combined with {CONFIG_DIR_ENV}"
            )));
        }
        self.config_file = Some(path.into());
        Ok(self)
    }

    pub fn with_environment(mut self, environment: AppEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn environment(&self) -> AppEnvironment {
        self.environment
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Loads and validates the settings.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let settings = self.load_unvalidated()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads the settings without running validation, for callers that
    /// apply further overrides first.
    pub fn load_unvalidated(&self) -> Result<Settings, ConfigError> {
        self.build_config()?
            .try_deserialize()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    fn build_config(&self) -> Result<Config, ConfigError> {
        let builder = Config::builder();
        let builder = match &self.config_file {
            Some(file) => add_file_source(builder, file, true)?,
            None => self.build_layered_config(builder)?,
        };
        add_env_source(builder).build().map_err(ConfigError::from)
    }

    fn build_layered_config(
        &self,
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let env_path = self
            .config_dir
            .join(format!("{SERVICE_NAME}.{}.json", self.environment.as_str()));
        let builder = add_file_source(builder, &env_path, true)?;

        let local_path = self.config_dir.join(format!("{SERVICE_NAME}.local.json"));
        add_file_source(builder, &local_path, false)
    }
}

fn add_file_source(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
    required: bool,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if required && !path.is_file() {
        return Err(ConfigError::file_not_found(path.display().to_string()));
    }
    let name = path
        .to_str()
        .ok_or_else(|| ConfigError::file_not_found(path.display().to_string()))?;
    Ok(builder.add_source(File::new(name, FileFormat::Json).required(required)))
}

/// `STARTER_APP__PORT=9000` becomes `app.port`.
fn add_env_source(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator(ENV_SEPARATOR)
            .ignore_empty(true)
            .try_parsing(true),
    )
}
