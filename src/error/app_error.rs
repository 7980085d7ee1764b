use axum::http::StatusCode;
use std::error::Error as StdError;
use thiserror::Error;

/// Error classes understood by the HTTP error writer.
///
/// Each variant wraps the underlying cause so the full chain stays available
/// for logging, while the variant itself decides the response status. Lower
/// layers add plain context with `anyhow::Context`; only the use case layer
/// picks a class.
#[derive(Error, Debug)]
pub enum AppError {
    /// Client supplied an invalid request (400)
    #[error("bad request")]
    BadRequest {
        #[source]
        source: anyhow::Error,
    },

    /// Requested resource does not exist (404)
    #[error("not found")]
    NotFound {
        #[source]
        source: anyhow::Error,
    },

    /// Any other failure (500)
    #[error("internal server error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    pub fn bad_request(source: impl Into<anyhow::Error>) -> Self {
        AppError::BadRequest {
            source: source.into(),
        }
    }

    pub fn not_found(source: impl Into<anyhow::Error>) -> Self {
        AppError::NotFound {
            source: source.into(),
        }
    }

    pub fn internal(source: impl Into<anyhow::Error>) -> Self {
        AppError::Internal {
            source: source.into(),
        }
    }

    /// HTTP status for this class of error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The wrapped cause, including any context layers added below.
    pub fn cause(&self) -> &anyhow::Error {
        match self {
            AppError::BadRequest { source }
            | AppError::NotFound { source }
            | AppError::Internal { source } => source,
        }
    }

    /// Deepest error in the wrapped chain.
    pub fn root_cause(&self) -> &(dyn StdError + 'static) {
        self.cause().root_cause()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        // Keep an already classified error instead of burying it under Internal
        match error.downcast::<AppError>() {
            Ok(app) => app,
            Err(other) => AppError::Internal { source: other },
        }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;
