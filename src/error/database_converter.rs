use crate::error::StoreError;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// Utility for converting diesel errors into store sentinels.
///
/// `NotFound` and unique violations become [`StoreError`] values that
/// callers can recognise through any amount of added context. Everything
/// else is passed through unchanged.
pub struct DatabaseErrorConverter;

impl DatabaseErrorConverter {
    /// Converts a diesel error into an `anyhow::Error`.
    ///
    /// # Arguments
    /// * `error` - The diesel error to convert
    pub fn convert(error: DieselError) -> anyhow::Error {
        match error {
            DieselError::NotFound => anyhow::Error::new(StoreError::NotFound),
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                tracing::debug!(
                    constraint = info.constraint_name().unwrap_or("unknown"),
                    message = info.message(),
                    "unique constraint violation"
                );
                anyhow::Error::new(StoreError::Duplicate)
            }
            other => anyhow::Error::new(other),
        }
    }
}
