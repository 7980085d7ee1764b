//! Application state for Axum web framework.
//!
//! Contains shared services that are accessible across all request handlers.

use crate::db::AsyncDbPool;
use crate::services::Services;

/// Application state containing all shared services.
///
/// This struct is designed to be used with Axum's State extractor.
/// Cloning is cheap since services sit behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// All business logic services
    pub services: Services,
}

impl AppState {
    /// Creates a new AppState backed by the given database pool.
    ///
    /// # Example
    /// ```ignore
    /// let pool = establish_async_connection_pool(&database).await?;
    /// let state = AppState::new(pool);
    /// ```
    pub fn new(pool: AsyncDbPool) -> Self {
        Self::from_services(Services::new(pool))
    }

    /// Creates an AppState from already wired services.
    pub fn from_services(services: Services) -> Self {
        Self { services }
    }
}
