//! User aggregate repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Orchestrate multi-table writes for create/update/delete in one
//!   transaction each.
//! - Serve single and paginated aggregate reads.
//!
//! # Invariants
//! - Write commands are validated before any statement is issued.
//! - Any failing step drops the transaction, which rolls it back; commit is
//!   only reached after every step succeeded.
//! - Create inserts exactly one `user_type` row; update only overwrites it.
//! - Delete leaves no `item`, `user_item` or `user_type` row for the user.

use super::error::{StoreError, StoreResult};
use super::user_read::{select_user, select_users_page};
use super::user_write::{
    delete_owned_items, delete_user_items, delete_user_row, delete_user_type, insert_items,
    insert_user, insert_user_items, insert_user_type, now_epoch_ms, update_owned_item,
    update_user_row, update_user_type,
};
use crate::db::migrations::{current_version, latest_version};
use crate::model::page::PageFilter;
use crate::model::user::{Item, NewUser, User, UserId, UserUpdate};
use log::debug;
use rusqlite::{Connection, TransactionBehavior};
use uuid::Uuid;

const REQUIRED_TABLES: &[&str] = &["user", "user_type", "item", "user_item"];

/// Repository interface for the user aggregate.
pub trait UserRepository {
    /// Creates a user, its classification and its initial items atomically.
    fn create_user(&mut self, user: &NewUser) -> StoreResult<User>;
    /// Applies field, classification and item-name changes, then re-reads.
    fn update_user(&mut self, update: &UserUpdate) -> StoreResult<User>;
    /// Deletes a user together with everything it owns.
    fn delete_user(&mut self, id: UserId) -> StoreResult<()>;
    /// Loads one aggregate; `NotFound` when the id is unknown.
    fn get_user(&self, id: UserId) -> StoreResult<User>;
    /// Loads one page of aggregates ordered by user id.
    fn list_users(&self, filter: &PageFilter) -> StoreResult<Vec<User>>;
}

/// SQLite-backed user repository bound to one connection.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema version does not match.
    /// - `MissingRequiredTable` when a required table is absent.
    pub fn try_new(conn: &'conn mut Connection) -> StoreResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&mut self, user: &NewUser) -> StoreResult<User> {
        user.validate()?;

        let id = Uuid::new_v4();
        let created_at = now_epoch_ms();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        insert_user(&tx, id, user, created_at)?;
        insert_user_type(&tx, id, user.user_type)?;

        let inserted = insert_items(&tx, &user.items, created_at)?;
        let item_ids: Vec<_> = inserted.iter().map(|item| item.id).collect();
        insert_user_items(&tx, id, &item_ids)?;

        tx.commit()?;
        debug!(
            "event=user_create module=repo status=committed user_id={} items={}",
            id,
            inserted.len()
        );

        Ok(User {
            id,
            name: user.name.clone(),
            age: user.age,
            user_type: user.user_type,
            created_at,
            updated_at: None,
            items: inserted
                .into_iter()
                .map(|item| Item {
                    id: item.id,
                    name: item.name,
                    user_id: id,
                    created_at: item.created_at,
                    updated_at: None,
                })
                .collect(),
        })
    }

    fn update_user(&mut self, update: &UserUpdate) -> StoreResult<User> {
        update.validate()?;

        let now = now_epoch_ms();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        if update_user_row(&tx, update.id, &update.name, update.age, now)? == 0 {
            return Err(StoreError::NotFound(update.id));
        }
        if update_user_type(&tx, update.id, update.user_type)? != 1 {
            return Err(StoreError::Integrity(format!(
                "user {} has no classification row",
                update.id
            )));
        }

        let mut skipped = 0usize;
        for item in &update.items {
            // validate() guarantees every entry carries an id.
            let Some(item_id) = item.id else {
                continue;
            };
            if update_owned_item(&tx, update.id, item_id, &item.name, now)? == 0 {
                skipped += 1;
            }
        }

        tx.commit()?;
        debug!(
            "event=user_update module=repo status=committed user_id={} items={} skipped_items={}",
            update.id,
            update.items.len(),
            skipped
        );

        select_user(&*self.conn, update.id)
    }

    fn delete_user(&mut self, id: UserId) -> StoreResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let items = delete_owned_items(&tx, id)?;
        delete_user_items(&tx, id)?;
        delete_user_type(&tx, id)?;
        if delete_user_row(&tx, id)? == 0 {
            return Err(StoreError::NotFound(id));
        }

        tx.commit()?;
        debug!(
            "event=user_delete module=repo status=committed user_id={} items={}",
            id, items
        );
        Ok(())
    }

    fn get_user(&self, id: UserId) -> StoreResult<User> {
        select_user(&*self.conn, id)
    }

    fn list_users(&self, filter: &PageFilter) -> StoreResult<Vec<User>> {
        select_users_page(&*self.conn, filter)
    }
}

fn ensure_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &table in REQUIRED_TABLES {
        if !table_exists(conn, table)? {
            return Err(StoreError::MissingRequiredTable(table));
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
