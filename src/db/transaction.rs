//! Transaction primitives.
//!
//! A [`PgTx`] owns a pooled connection for the lifetime of one database
//! transaction. Termination goes through [`tx_end`], which commits or rolls
//! back depending on whether the enclosed operation failed.

use async_trait::async_trait;
use diesel_async::pooled_connection::bb8::PooledConnection;
use diesel_async::{AnsiTransactionManager, AsyncPgConnection, TransactionManager};
use thiserror::Error;

use crate::db::AsyncDbPool;
use crate::error::{DatabaseErrorConverter, StoreError};

#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("failed to begin transaction")]
    Begin {
        #[source]
        source: anyhow::Error,
    },

    #[error("transaction rollback failed (operation error: {operation})")]
    Rollback {
        operation: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("transaction commit failed")]
    Commit {
        #[source]
        source: anyhow::Error,
    },
}

/// An open transaction that can be terminated exactly once.
///
/// Both methods consume the handle, so a second termination does not compile.
#[async_trait]
pub trait TxHandle: Send {
    async fn commit(self) -> anyhow::Result<()>;
    async fn rollback(self) -> anyhow::Result<()>;
}

/// Terminates `tx` according to the outcome of the operation it enclosed.
///
/// * no operation error: commit, a commit failure is returned as
///   [`TransactionError::Commit`]
/// * operation error and rollback succeeds: [`StoreError::TransactionAborted`]
/// * operation error and rollback fails: [`TransactionError::Rollback`], which
///   names the operation error
pub async fn tx_end<T: TxHandle>(tx: T, op_err: Option<&anyhow::Error>) -> anyhow::Result<()> {
    match op_err {
        Some(op_err) => {
            if let Err(source) = tx.rollback().await {
                return Err(TransactionError::Rollback {
                    operation: format!("{op_err:#}"),
                    source,
                }
                .into());
            }
            Err(StoreError::TransactionAborted.into())
        }
        None => tx
            .commit()
            .await
            .map_err(|source| TransactionError::Commit { source }.into()),
    }
}

/// A PostgreSQL transaction bound to one pooled connection.
///
/// If the handle is dropped before it is terminated the connection goes back
/// to the pool still inside the transaction; the pool treats such a
/// connection as broken and closes it, which rolls the work back server side.
pub struct PgTx {
    conn: PooledConnection<'static, AsyncPgConnection>,
    finished: bool,
}

/// Acquires a connection from `pool` and issues `BEGIN` on it.
pub async fn tx_begin(pool: &AsyncDbPool) -> Result<PgTx, TransactionError> {
    let mut conn = pool
        .get_owned()
        .await
        .map_err(|e| TransactionError::Begin {
            source: anyhow::Error::new(e),
        })?;

    AnsiTransactionManager::begin_transaction(&mut *conn)
        .await
        .map_err(|e| TransactionError::Begin {
            source: DatabaseErrorConverter::convert(e),
        })?;

    Ok(PgTx {
        conn,
        finished: false,
    })
}

impl PgTx {
    /// Connection to run statements inside the transaction.
    pub fn connection(&mut self) -> &mut AsyncPgConnection {
        &mut self.conn
    }
}

#[async_trait]
impl TxHandle for PgTx {
    async fn commit(mut self) -> anyhow::Result<()> {
        self.finished = true;
        AnsiTransactionManager::commit_transaction(&mut *self.conn)
            .await
            .map_err(DatabaseErrorConverter::convert)
    }

    async fn rollback(mut self) -> anyhow::Result<()> {
        self.finished = true;
        AnsiTransactionManager::rollback_transaction(&mut *self.conn)
            .await
            .map_err(DatabaseErrorConverter::convert)
    }
}

impl Drop for PgTx {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!("transaction dropped without commit or rollback, discarding connection");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Outcome {
        Committed,
        RolledBack,
    }

    struct FakeTx {
        log: Arc<Mutex<Vec<Outcome>>>,
        fail_commit: bool,
        fail_rollback: bool,
    }

    impl FakeTx {
        fn new() -> (Self, Arc<Mutex<Vec<Outcome>>>) {
            let log = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    log: log.clone(),
                    fail_commit: false,
                    fail_rollback: false,
                },
                log,
            )
        }
    }

    #[async_trait]
    impl TxHandle for FakeTx {
        async fn commit(self) -> anyhow::Result<()> {
            self.log.lock().unwrap().push(Outcome::Committed);
            if self.fail_commit {
                anyhow::bail!("connection closed");
            }
            Ok(())
        }

        async fn rollback(self) -> anyhow::Result<()> {
            self.log.lock().unwrap().push(Outcome::RolledBack);
            if self.fail_rollback {
                anyhow::bail!("connection closed");
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_commit_on_success() {
        let (tx, log) = FakeTx::new();

        tx_end(tx, None).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec![Outcome::Committed]);
    }

    #[tokio::test]
    async fn test_commit_failure_is_wrapped() {
        let (mut tx, _log) = FakeTx::new();
        tx.fail_commit = true;

        let err = tx_end(tx, None).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<TransactionError>(),
            Some(TransactionError::Commit { .. })
        ));
        assert_eq!(err.root_cause().to_string(), "connection closed");
    }

    #[tokio::test]
    async fn test_rollback_on_operation_error_returns_aborted() {
        let (tx, log) = FakeTx::new();
        let op_err = anyhow::anyhow!("insert failed");

        let err = tx_end(tx, Some(&op_err)).await.unwrap_err();

        assert_eq!(
            err.downcast_ref::<StoreError>(),
            Some(&StoreError::TransactionAborted)
        );
        assert_eq!(*log.lock().unwrap(), vec![Outcome::RolledBack]);
    }

    #[tokio::test]
    async fn test_rollback_failure_names_operation_error() {
        let (mut tx, _log) = FakeTx::new();
        tx.fail_rollback = true;
        let op_err = anyhow::anyhow!("insert failed");

        let err = tx_end(tx, Some(&op_err)).await.unwrap_err();

        assert!(err.downcast_ref::<StoreError>().is_none());
        match err.downcast_ref::<TransactionError>() {
            Some(TransactionError::Rollback { operation, .. }) => {
                assert_eq!(operation, "insert failed");
            }
            other => panic!("expected rollback error, got {other:?}"),
        }
        assert!(err.to_string().contains("insert failed"));
    }
}
