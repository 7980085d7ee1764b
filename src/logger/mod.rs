//! Logger setup on top of `tracing-subscriber`.
//!
//! One console layer in `pretty`, `compact` or `json` format, filtered by an
//! `EnvFilter`. `RUST_LOG` wins over the configured level when set.

pub mod config;
pub mod error;

pub use config::{LogFormat, LoggerConfig};
pub use error::LoggerError;

use std::io::IsTerminal;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global subscriber.
///
/// # Errors
///
/// Fails on an invalid level or when a global subscriber is already set.
pub fn init_logger(config: LoggerConfig) -> Result<(), LoggerError> {
    config.validate()?;

    let filter = build_filter(&config.level)?;
    let use_ansi = config.colored && std::io::stdout().is_terminal();
    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_ansi(use_ansi).with_target(true))
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_ansi(use_ansi).with_target(true))
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .try_init(),
    };

    result.map_err(|e| LoggerError::init(e.to_string()))
}

fn build_filter(level: &str) -> Result<EnvFilter, LoggerError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level).map_err(|e| LoggerError::config(format!("invalid filter '{level}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_filter_accepts_directives() {
        assert!(build_filter("info,rest_api_starter=debug").is_ok());
    }

    #[test]
    fn second_init_is_rejected() {
        let config = LoggerConfig::new("error", LogFormat::Compact, false).unwrap();
        // Another test may have installed the subscriber first, so only the
        // second call is checked.
        let _ = init_logger(config.clone());
        assert!(matches!(init_logger(config), Err(LoggerError::Init { .. })));
    }
}
