//! Service layer for business logic operations.
//!
//! Services encapsulate business logic and coordinate between
//! repositories and handlers.

mod user_service;

pub use user_service::{UserService, UserUsecase};

use std::sync::Arc;

use crate::db::AsyncDbPool;
use crate::repositories::UserRepository;
use crate::utils::clock::SystemClock;

/// Aggregates all services for convenient access.
///
/// This struct is designed to be used as Axum application state.
/// Cloning is cheap since every service sits behind an `Arc`.
#[derive(Clone)]
pub struct Services {
    pub users: Arc<dyn UserUsecase>,
}

impl Services {
    /// Wires the PostgreSQL backed services.
    pub fn new(pool: AsyncDbPool) -> Self {
        let users = UserService::new(UserRepository::new(pool), Arc::new(SystemClock));
        Self {
            users: Arc::new(users),
        }
    }
}
