use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use jiff_diesel::ToDiesel;

use crate::api::dto::UserFilter;
use crate::db::{TxHandle, tx_end};
use crate::error::StoreError;
use crate::models::{NewUser, UpdateUser, User};
use crate::repositories::UserStore;

/// Operations of [`FakeUserStore`] that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    GetUsers,
    CountUsers,
    GetUserById,
    Insert,
    Update,
    Begin,
    Commit,
}

#[derive(Default)]
struct State {
    users: Vec<User>,
    next_id: i64,
    failing: HashSet<FailPoint>,
    commits: usize,
    rollbacks: usize,
}

/// In-memory [`UserStore`] whose writes only become visible on commit.
#[derive(Clone, Default)]
pub struct FakeUserStore {
    state: Arc<Mutex<State>>,
}

enum PendingWrite {
    Insert(User),
    Update(i64, UpdateUser),
}

pub struct FakeTx {
    state: Arc<Mutex<State>>,
    pending: Vec<PendingWrite>,
}

impl FakeUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Adds a committed user and returns its id.
    pub fn seed(&self, email: &str) -> i64 {
        let mut state = self.lock();
        state.next_id += 1;
        let id = state.next_id;
        state.users.push(User {
            id,
            email: email.to_string(),
            created_at: jiff::Timestamp::UNIX_EPOCH.to_diesel(),
            created_by: email.to_string(),
            updated_at: None,
            updated_by: None,
            deleted_at: None,
            deleted_by: None,
        });
        id
    }

    pub fn fail_on(&self, point: FailPoint) {
        self.lock().failing.insert(point);
    }

    pub fn users(&self) -> Vec<User> {
        self.lock().users.clone()
    }

    pub fn commits(&self) -> usize {
        self.lock().commits
    }

    pub fn rollbacks(&self) -> usize {
        self.lock().rollbacks
    }

    fn check(&self, point: FailPoint) -> anyhow::Result<()> {
        if self.lock().failing.contains(&point) {
            anyhow::bail!("injected failure at {point:?}");
        }
        Ok(())
    }

    fn matching(&self, filter: &UserFilter) -> Vec<User> {
        self.lock()
            .users
            .iter()
            .filter(|u| filter.email.is_empty() || u.email.contains(&filter.email))
            .filter(|u| {
                filter
                    .created_at
                    .is_none_or(|since| u.created_at.to_jiff() >= since)
            })
            .cloned()
            .collect()
    }
}

#[async_trait]
impl UserStore for FakeUserStore {
    type Tx = FakeTx;

    async fn get_users(&self, filter: &UserFilter) -> anyhow::Result<Vec<User>> {
        self.check(FailPoint::GetUsers)?;
        let page = filter.pagination.page.max(1) as usize;
        let limit = filter.pagination.limit.max(1) as usize;
        Ok(self
            .matching(filter)
            .into_iter()
            .skip((page - 1) * limit)
            .take(limit)
            .collect())
    }

    async fn count_users(&self, filter: &UserFilter) -> anyhow::Result<i64> {
        self.check(FailPoint::CountUsers)?;
        Ok(self.matching(filter).len() as i64)
    }

    async fn get_user_by_id(&self, id: i64) -> anyhow::Result<User> {
        self.check(FailPoint::GetUserById)?;
        self.lock()
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound.into())
    }

    async fn insert_user(&self, tx: &mut FakeTx, user: NewUser) -> anyhow::Result<i64> {
        self.check(FailPoint::Insert)?;
        let mut state = self.lock();
        let taken = state.users.iter().any(|u| u.email == user.email)
            || tx
                .pending
                .iter()
                .any(|w| matches!(w, PendingWrite::Insert(u) if u.email == user.email));
        if taken {
            return Err(StoreError::Duplicate.into());
        }

        state.next_id += 1;
        let id = state.next_id;
        tx.pending.push(PendingWrite::Insert(User {
            id,
            email: user.email,
            created_at: user.created_at,
            created_by: user.created_by,
            updated_at: None,
            updated_by: None,
            deleted_at: None,
            deleted_by: None,
        }));
        Ok(id)
    }

    async fn update_user(&self, tx: &mut FakeTx, id: i64, user: UpdateUser) -> anyhow::Result<()> {
        self.check(FailPoint::Update)?;
        if !self.lock().users.iter().any(|u| u.id == id) {
            return Err(StoreError::NotFound.into());
        }
        tx.pending.push(PendingWrite::Update(id, user));
        Ok(())
    }

    async fn tx_begin(&self) -> anyhow::Result<FakeTx> {
        self.check(FailPoint::Begin)?;
        Ok(FakeTx {
            state: self.state.clone(),
            pending: Vec::new(),
        })
    }

    async fn tx_end(&self, tx: FakeTx, op_err: Option<&anyhow::Error>) -> anyhow::Result<()> {
        tx_end(tx, op_err).await
    }
}

#[async_trait]
impl TxHandle for FakeTx {
    async fn commit(self) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.failing.contains(&FailPoint::Commit) {
            anyhow::bail!("injected failure at {:?}", FailPoint::Commit);
        }
        for write in self.pending {
            match write {
                PendingWrite::Insert(user) => state.users.push(user),
                PendingWrite::Update(id, update) => {
                    if let Some(user) = state.users.iter_mut().find(|u| u.id == id) {
                        if let Some(email) = update.email {
                            user.email = email;
                        }
                        if update.updated_at.is_some() {
                            user.updated_at = update.updated_at;
                        }
                        if update.updated_by.is_some() {
                            user.updated_by = update.updated_by;
                        }
                    }
                }
            }
        }
        state.commits += 1;
        Ok(())
    }

    async fn rollback(self) -> anyhow::Result<()> {
        self.state.lock().unwrap().rollbacks += 1;
        Ok(())
    }
}
