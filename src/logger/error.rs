//! Error types for logger setup

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("logger configuration error: {message}")]
    Config { message: String },

    #[error("failed to install global subscriber: {message}")]
    Init { message: String },
}

impl LoggerError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn init(message: impl Into<String>) -> Self {
        Self::Init {
            message: message.into(),
        }
    }
}
