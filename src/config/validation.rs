//! Configuration validation rules.

use crate::config::error::ConfigError;
use crate::config::settings::{
    AppConfig, DatabaseConfig, LoggerSettings, SERVICE_NAME, Settings,
};
use crate::logger::LogFormat;

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::validation(
                "app.port",
                "port must be between 1 and 65535",
            ));
        }
        if self.host.trim().is_empty() {
            return Err(ConfigError::validation("app.host", "host must not be empty"));
        }
        if self.request_timeout == 0 {
            return Err(ConfigError::validation(
                "app.request_timeout",
                "request timeout must be greater than 0 seconds",
            ));
        }
        if self.shutdown_timeout == 0 {
            return Err(ConfigError::validation(
                "app.shutdown_timeout",
                "shutdown timeout must be greater than 0 seconds",
            ));
        }
        Ok(())
    }
}

impl DatabaseConfig {
    /// `key` is the entry name under `databases`, used in error fields.
    pub fn validate(&self, key: &str) -> Result<(), ConfigError> {
        let field = |name: &str| format!("databases.{key}.{name}");

        if self.host.trim().is_empty() {
            return Err(ConfigError::validation(field("host"), "host is required"));
        }
        if self.user.trim().is_empty() {
            return Err(ConfigError::validation(field("user"), "user is required"));
        }
        if self.name.trim().is_empty() {
            return Err(ConfigError::validation(field("name"), "database name is required"));
        }
        if self.port == 0 {
            return Err(ConfigError::validation(field("port"), "port must be between 1 and 65535"));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::validation(
                field("max_connections"),
                "max connections must be greater than 0",
            ));
        }
        if self.min_connections > self.max_connections {
            return Err(ConfigError::validation(
                field("min_connections"),
                format!(
                    "min connections ({}) cannot exceed max connections ({})",
                    self.min_connections, self.max_connections
                ),
            ));
        }
        if self.connection_timeout == 0 {
            return Err(ConfigError::validation(
                field("connection_timeout"),
                "connection timeout must be greater than 0 seconds",
            ));
        }
        Ok(())
    }
}

impl LoggerSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let directive = self.level.contains(['=', ',']);
        if !directive && !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "logger.level",
                format!(
                    "invalid log level '{}', expected one of {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            ));
        }
        if self.format.parse::<LogFormat>().is_err() {
            return Err(ConfigError::validation(
                "logger.format",
                format!(
                    "invalid log format '{}', expected one of {}",
                    self.format,
                    LogFormat::VARIANTS.join(", ")
                ),
            ));
        }
        Ok(())
    }
}

impl Settings {
    /// Validates every section; the service database entry must exist.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.app.validate()?;
        self.logger.validate()?;

        let primary = self.primary_database()?;
        primary.validate(SERVICE_NAME)?;
        for (key, db) in &self.databases {
            if key != SERVICE_NAME {
                db.validate(key)?;
            }
        }
        Ok(())
    }
}
