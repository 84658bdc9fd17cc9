//! Storage facade over the pooled user repository.
//!
//! # Responsibility
//! - Own the process-wide connection pool.
//! - Expose create/update/delete/get/list as the only entry point to storage.
//! - Log every failure once, with operation name and user id.
//!
//! # Invariants
//! - Each call checks out one connection and returns it before returning.
//! - No transaction outlives the call that opened it.
//! - Callers receive the store by injection (`UserStorage`); there is no
//!   global instance.

use crate::config::StoreConfig;
use crate::db::{close_pool, open_pool, open_pool_in_memory, ConnectionPool};
use crate::model::page::PageFilter;
use crate::model::user::{NewUser, User, UserId, UserUpdate};
use crate::repo::error::{ErrorKind, StoreResult};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use log::{debug, error, warn};
use std::sync::Arc;
use std::time::Instant;

/// Storage operations the service layer depends on.
pub trait UserStorage: Send + Sync {
    fn create_user(&self, user: &NewUser) -> StoreResult<User>;
    fn update_user(&self, update: &UserUpdate) -> StoreResult<User>;
    fn delete_user(&self, id: UserId) -> StoreResult<()>;
    fn get_user(&self, id: UserId) -> StoreResult<User>;
    fn list_users(&self, filter: &PageFilter) -> StoreResult<Vec<User>>;
}

/// Pooled SQLite user store. Clones share one pool.
#[derive(Clone)]
pub struct UserStore {
    pool: ConnectionPool,
}

impl UserStore {
    /// Wraps an already opened pool.
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// Opens the file-backed pool described by `config`.
    pub fn open(config: &StoreConfig) -> StoreResult<Self> {
        Ok(Self::new(open_pool(config)?))
    }

    /// Opens a single-connection in-memory store.
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::new(open_pool_in_memory()?))
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Releases the pool. Other clones keep their handle alive.
    pub fn close(self) {
        close_pool(self.pool);
    }

    fn with_repo<T>(
        &self,
        run: impl FnOnce(&mut SqliteUserRepository<'_>) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut conn = self.pool.get()?;
        let mut repo = SqliteUserRepository::try_new(&mut conn)?;
        run(&mut repo)
    }
}

impl UserStorage for UserStore {
    fn create_user(&self, user: &NewUser) -> StoreResult<User> {
        let started_at = Instant::now();
        let result = self.with_repo(|repo| repo.create_user(user));
        let user_id = result.as_ref().ok().map(|created| created.id);
        log_outcome("user_create", user_id, started_at, result)
    }

    fn update_user(&self, update: &UserUpdate) -> StoreResult<User> {
        let started_at = Instant::now();
        let result = self.with_repo(|repo| repo.update_user(update));
        log_outcome("user_update", Some(update.id), started_at, result)
    }

    fn delete_user(&self, id: UserId) -> StoreResult<()> {
        let started_at = Instant::now();
        let result = self.with_repo(|repo| repo.delete_user(id));
        log_outcome("user_delete", Some(id), started_at, result)
    }

    fn get_user(&self, id: UserId) -> StoreResult<User> {
        let started_at = Instant::now();
        let result = self.with_repo(|repo| repo.get_user(id));
        log_outcome("user_get", Some(id), started_at, result)
    }

    fn list_users(&self, filter: &PageFilter) -> StoreResult<Vec<User>> {
        let started_at = Instant::now();
        let result = self.with_repo(|repo| repo.list_users(filter));
        if let Err(err) = &result {
            log_failure("user_list", None, started_at, err.kind(), err);
        } else {
            debug!(
                "event=user_list module=store status=ok page={} limit={} duration_ms={}",
                filter.page,
                filter.limit,
                started_at.elapsed().as_millis()
            );
        }
        result
    }
}

impl<S: UserStorage + ?Sized> UserStorage for Arc<S> {
    fn create_user(&self, user: &NewUser) -> StoreResult<User> {
        (**self).create_user(user)
    }

    fn update_user(&self, update: &UserUpdate) -> StoreResult<User> {
        (**self).update_user(update)
    }

    fn delete_user(&self, id: UserId) -> StoreResult<()> {
        (**self).delete_user(id)
    }

    fn get_user(&self, id: UserId) -> StoreResult<User> {
        (**self).get_user(id)
    }

    fn list_users(&self, filter: &PageFilter) -> StoreResult<Vec<User>> {
        (**self).list_users(filter)
    }
}

fn log_outcome<T>(
    event: &'static str,
    user_id: Option<UserId>,
    started_at: Instant,
    result: StoreResult<T>,
) -> StoreResult<T> {
    match &result {
        Ok(_) => debug!(
            "event={} module=store status=ok user_id={} duration_ms={}",
            event,
            display_id(user_id),
            started_at.elapsed().as_millis()
        ),
        Err(err) => log_failure(event, user_id, started_at, err.kind(), err),
    }
    result
}

fn log_failure(
    event: &'static str,
    user_id: Option<UserId>,
    started_at: Instant,
    kind: ErrorKind,
    err: &dyn std::fmt::Display,
) {
    let id = display_id(user_id);
    let duration_ms = started_at.elapsed().as_millis();
    match kind {
        ErrorKind::Internal => error!(
            "event={} module=store status=error error_kind={} user_id={} duration_ms={} error={}",
            event,
            kind.as_str(),
            id,
            duration_ms,
            err
        ),
        ErrorKind::NotFound | ErrorKind::InvalidInput => warn!(
            "event={} module=store status=rejected error_kind={} user_id={} duration_ms={} error={}",
            event,
            kind.as_str(),
            id,
            duration_ms,
            err
        ),
    }
}

fn display_id(user_id: Option<UserId>) -> String {
    user_id.map_or_else(|| "-".to_string(), |id| id.to_string())
}
