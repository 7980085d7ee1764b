//! Dynamic SQL helpers.
//!
//! Pagination clauses, `?` to `$n` placeholder rebinding and the batched
//! `IN (...)` executor used when a lookup list may exceed the bind limit of
//! a single statement.

use std::fmt::Write;

use async_trait::async_trait;
use diesel::QueryableByName;
use diesel::pg::Pg;
use diesel::sql_types::BigInt;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use thiserror::Error;

use crate::error::DatabaseErrorConverter;
use crate::utils::pagination::PaginationError;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("batch size must be > 0")]
    InvalidBatchSize,

    #[error("query must contain exactly one `?` expansion point, found {found}")]
    Placeholder { found: usize },

    #[error("batch {batch} failed")]
    Execution {
        batch: usize,
        #[source]
        source: anyhow::Error,
    },
}

/// Builds the `LIMIT .. OFFSET ..` fragment for a 1-based page.
pub fn query_pagination(page: i64, limit: i64) -> Result<String, PaginationError> {
    if page < 1 {
        return Err(PaginationError::InvalidPage);
    }
    if limit <= 0 {
        return Err(PaginationError::InvalidLimit);
    }

    let offset = (page - 1).saturating_mul(limit);
    Ok(format!("LIMIT {limit} OFFSET {offset}"))
}

/// Rewrites every `?` into a numbered PostgreSQL placeholder.
pub fn rebind(query: &str) -> String {
    let mut out = String::with_capacity(query.len() + 8);
    let mut position = 0;
    for ch in query.chars() {
        if ch == '?' {
            position += 1;
            let _ = write!(out, "${position}");
        } else {
            out.push(ch);
        }
    }
    out
}

/// Expands the single `?` of `query` into `count` comma separated placeholders.
pub fn expand_in(query: &str, count: usize) -> Result<String, QueryError> {
    let found = query.matches('?').count();
    if found != 1 {
        return Err(QueryError::Placeholder { found });
    }

    let placeholders = vec!["?"; count].join(", ");
    Ok(query.replacen('?', &placeholders, 1))
}

/// Something able to run one expanded `IN (...)` statement.
#[async_trait]
pub trait BatchExecutor<T: Send> {
    async fn select_batch(&mut self, sql: &str, ids: &[i64]) -> anyhow::Result<Vec<T>>;
}

#[async_trait]
impl<T> BatchExecutor<T> for AsyncPgConnection
where
    T: QueryableByName<Pg> + Send + 'static,
{
    async fn select_batch(&mut self, sql: &str, ids: &[i64]) -> anyhow::Result<Vec<T>> {
        let mut query = diesel::sql_query(sql).into_boxed::<Pg>();
        for id in ids {
            query = query.bind::<BigInt, _>(*id);
        }
        query
            .load::<T>(self)
            .await
            .map_err(DatabaseErrorConverter::convert)
    }
}

/// Runs `query` once per chunk of at most `max_batch` ids and appends every
/// row to `dest`, in batch order.
///
/// `query` must contain exactly one `?`, the expansion point for the ids,
/// e.g. `SELECT * FROM users WHERE id IN (?)`. Rows from batches that ran
/// before a failure stay in `dest`.
pub async fn batch_select<T, E>(
    executor: &mut E,
    query: &str,
    ids: &[i64],
    max_batch: usize,
    dest: &mut Vec<T>,
) -> Result<(), QueryError>
where
    T: Send,
    E: BatchExecutor<T> + Send + ?Sized,
{
    if max_batch == 0 {
        return Err(QueryError::InvalidBatchSize);
    }

    for (index, batch) in ids.chunks(max_batch).enumerate() {
        let sql = rebind(&expand_in(query, batch.len())?);
        let rows = executor
            .select_batch(&sql, batch)
            .await
            .map_err(|source| QueryError::Execution {
                batch: index,
                source,
            })?;
        tracing::debug!(batch = index, ids = batch.len(), rows = rows.len(), "batch selected");
        dest.extend(rows);
    }

    Ok(())
}
