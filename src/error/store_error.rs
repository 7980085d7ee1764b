use thiserror::Error;

/// Sentinel errors raised by the persistence layer.
///
/// Callers match on these with `downcast_ref` after context has been layered
/// on top, so each variant carries no payload.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    #[error("data not found")]
    NotFound,

    #[error("data must be unique")]
    Duplicate,

    /// The transaction was rolled back cleanly but the operation inside it
    /// still failed.
    #[error("transaction aborted and rolled back")]
    TransactionAborted,
}
