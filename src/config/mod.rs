//! Configuration for the service.
//!
//! Settings come from JSON files under `env/` (see [`loader`]) overlaid with
//! `STARTER_*` environment variables, then checked by [`validation`].

pub mod environment;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use environment::Environment;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use settings::{AppConfig, DatabaseConfig, LoggerSettings, SERVICE_NAME, Settings};
