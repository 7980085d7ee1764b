//! Repository layer for data access operations.
//!
//! [`UserStore`] is the capability the use case layer depends on;
//! [`UserRepository`] implements it on PostgreSQL with diesel_async.

mod filter;
mod user_repo;

pub use filter::{FilterArg, filter_user};
pub use user_repo::UserRepository;

use async_trait::async_trait;

use crate::api::dto::UserFilter;
use crate::db::TxHandle;
use crate::models::{NewUser, UpdateUser, User};

/// Persistence operations for users.
///
/// Writes run inside a transaction obtained from [`UserStore::tx_begin`] and
/// terminated with [`UserStore::tx_end`]. A missing user is reported as
/// `StoreError::NotFound` and a unique violation as `StoreError::Duplicate`,
/// both reachable with `downcast_ref` through added context.
#[async_trait]
pub trait UserStore: Send + Sync {
    type Tx: TxHandle;

    /// One page of users matching `filter`, ordered by id.
    async fn get_users(&self, filter: &UserFilter) -> anyhow::Result<Vec<User>>;

    /// Number of users matching `filter`, ignoring pagination.
    async fn count_users(&self, filter: &UserFilter) -> anyhow::Result<i64>;

    async fn get_user_by_id(&self, id: i64) -> anyhow::Result<User>;

    /// Inserts `user` and returns the generated id.
    async fn insert_user(&self, tx: &mut Self::Tx, user: NewUser) -> anyhow::Result<i64>;

    async fn update_user(&self, tx: &mut Self::Tx, id: i64, user: UpdateUser) -> anyhow::Result<()>;

    async fn tx_begin(&self) -> anyhow::Result<Self::Tx>;

    async fn tx_end(&self, tx: Self::Tx, op_err: Option<&anyhow::Error>) -> anyhow::Result<()>;
}
