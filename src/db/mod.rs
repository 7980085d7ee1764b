//! Database access helpers.
//!
//! Provides the async PostgreSQL connection pool (diesel_async with bb8),
//! dynamic query helpers and transaction primitives shared by repositories.

mod pool;
pub mod query;
pub mod transaction;

pub use pool::{AsyncDbPool, MIGRATIONS, establish_async_connection_pool};
pub use query::{BatchExecutor, QueryError, batch_select, query_pagination};
pub use transaction::{PgTx, TransactionError, TxHandle, tx_begin, tx_end};
