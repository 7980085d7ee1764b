//! User repository for async database operations.
//!
//! Listings use dynamic SQL built from the filter; single-row reads and
//! writes use the diesel DSL.

use anyhow::Context;
use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use diesel_async::RunQueryDsl;

use crate::api::dto::UserFilter;
use crate::db::query::rebind;
use crate::db::{AsyncDbPool, PgTx, batch_select, query_pagination, transaction};
use crate::error::{DatabaseErrorConverter, StoreError};
use crate::models::{NewUser, UpdateUser, User};
use crate::repositories::{UserStore, filter_user};

const USER_COLUMNS: &str =
    "id, email, created_at, created_by, updated_at, updated_by, deleted_at, deleted_by";

/// Ids sent in one `IN (...)` statement by [`UserRepository::get_users_by_ids`].
pub const MAX_IDS_PER_QUERY: usize = 1000;

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    total: i64,
}

/// User repository holding an async connection pool.
///
/// Since `AsyncDbPool` (bb8::Pool) internally uses `Arc`, cloning is cheap.
#[derive(Clone)]
pub struct UserRepository {
    pool: AsyncDbPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    /// Loads every user whose id is in `ids`, in batches of [`MAX_IDS_PER_QUERY`].
    ///
    /// Unknown ids are skipped.
    pub async fn get_users_by_ids(&self, ids: &[i64]) -> anyhow::Result<Vec<User>> {
        let mut conn = self
            .pool
            .get()
            .await
            .context("UserRepository.get_users_by_ids.get_connection")?;

        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id IN (?) ORDER BY id");
        let mut found = Vec::with_capacity(ids.len());
        batch_select(&mut *conn, &query, ids, MAX_IDS_PER_QUERY, &mut found)
            .await
            .context("UserRepository.get_users_by_ids.batch_select")?;
        Ok(found)
    }
}

#[async_trait]
impl UserStore for UserRepository {
    type Tx = PgTx;

    async fn get_users(&self, filter: &UserFilter) -> anyhow::Result<Vec<User>> {
        let (where_clause, args) = filter_user(filter);
        let pagination = query_pagination(
            i64::from(filter.pagination.page),
            i64::from(filter.pagination.limit),
        )
        .context("UserRepository.get_users.query_pagination")?;

        let sql = rebind(&format!(
            "SELECT {USER_COLUMNS} FROM users{where_clause} ORDER BY id {pagination}"
        ));
        let mut query = diesel::sql_query(sql).into_boxed::<Pg>();
        for arg in args {
            query = arg.bind(query);
        }

        let mut conn = self
            .pool
            .get()
            .await
            .context("UserRepository.get_users.get_connection")?;
        query
            .load::<User>(&mut conn)
            .await
            .map_err(DatabaseErrorConverter::convert)
            .context("UserRepository.get_users.load")
    }

    async fn count_users(&self, filter: &UserFilter) -> anyhow::Result<i64> {
        let (where_clause, args) = filter_user(filter);
        let sql = rebind(&format!("SELECT COUNT(*) AS total FROM users{where_clause}"));
        let mut query = diesel::sql_query(sql).into_boxed::<Pg>();
        for arg in args {
            query = arg.bind(query);
        }

        let mut conn = self
            .pool
            .get()
            .await
            .context("UserRepository.count_users.get_connection")?;
        let row = query
            .get_result::<CountRow>(&mut conn)
            .await
            .map_err(DatabaseErrorConverter::convert)
            .context("UserRepository.count_users.get_result")?;
        Ok(row.total)
    }

    async fn get_user_by_id(&self, user_id: i64) -> anyhow::Result<User> {
        use crate::schema::users::dsl::*;
        let mut conn = self
            .pool
            .get()
            .await
            .context("UserRepository.get_user_by_id.get_connection")?;

        users
            .find(user_id)
            .select(User::as_select())
            .first(&mut conn)
            .await
            .map_err(DatabaseErrorConverter::convert)
            .context("UserRepository.get_user_by_id.first")
    }

    async fn insert_user(&self, tx: &mut PgTx, user: NewUser) -> anyhow::Result<i64> {
        use crate::schema::users::dsl::*;

        diesel::insert_into(users)
            .values(&user)
            .returning(id)
            .get_result::<i64>(tx.connection())
            .await
            .map_err(DatabaseErrorConverter::convert)
            .context("UserRepository.insert_user.get_result")
    }

    async fn update_user(&self, tx: &mut PgTx, user_id: i64, user: UpdateUser) -> anyhow::Result<()> {
        use crate::schema::users::dsl::*;

        let affected = diesel::update(users.find(user_id))
            .set(&user)
            .execute(tx.connection())
            .await
            .map_err(DatabaseErrorConverter::convert)
            .context("UserRepository.update_user.execute")?;

        if affected == 0 {
            return Err(StoreError::NotFound).context("UserRepository.update_user.execute");
        }
        Ok(())
    }

    async fn tx_begin(&self) -> anyhow::Result<PgTx> {
        transaction::tx_begin(&self.pool)
            .await
            .context("UserRepository.tx_begin")
    }

    async fn tx_end(&self, tx: PgTx, op_err: Option<&anyhow::Error>) -> anyhow::Result<()> {
        transaction::tx_end(tx, op_err).await
    }
}
