//! Single-table write steps composed by the user repository.
//!
//! Every function runs inside a caller-owned transaction and touches one
//! table with one prepared statement. Commit and rollback belong to the
//! caller.

use super::error::{StoreError, StoreResult};
use crate::model::user::{ItemId, NewItem, NewUser, UserId, UserType};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Transaction};
use std::time::{SystemTime, UNIX_EPOCH};

/// Row returned by the bulk item insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InsertedItem {
    pub id: ItemId,
    pub name: String,
    pub created_at: i64,
}

/// Current wall clock in Unix epoch milliseconds.
pub(crate) fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

pub(crate) fn insert_user(
    tx: &Transaction<'_>,
    id: UserId,
    user: &NewUser,
    created_at: i64,
) -> StoreResult<()> {
    let mut stmt = tx.prepare_cached(
        "INSERT INTO \"user\" (id, name, age, created_at)
         VALUES (?1, ?2, ?3, ?4);",
    )?;
    stmt.execute(params![id.to_string(), user.name.as_str(), user.age, created_at])?;
    Ok(())
}

pub(crate) fn insert_user_type(
    tx: &Transaction<'_>,
    id: UserId,
    user_type: UserType,
) -> StoreResult<()> {
    let mut stmt =
        tx.prepare_cached("INSERT INTO user_type (user_id, type_id) VALUES (?1, ?2);")?;
    stmt.execute(params![id.to_string(), user_type.type_id()])?;
    Ok(())
}

/// Inserts all items with one multi-row statement.
///
/// Returned rows are sorted by id, which matches insertion order because
/// `item.id` is AUTOINCREMENT. Binds two parameters per item; callers keep
/// `items` within `MAX_ITEMS_PER_CREATE` so the statement stays under
/// SQLite's bound-parameter limit.
pub(crate) fn insert_items(
    tx: &Transaction<'_>,
    items: &[NewItem],
    created_at: i64,
) -> StoreResult<Vec<InsertedItem>> {
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["(?, ?)"; items.len()].join(", ");
    let sql = format!(
        "INSERT INTO item (name, created_at) VALUES {placeholders}
         RETURNING id, name, created_at;"
    );
    let mut bind_values: Vec<Value> = Vec::with_capacity(items.len() * 2);
    for item in items {
        bind_values.push(Value::Text(item.name.clone()));
        bind_values.push(Value::Integer(created_at));
    }

    let mut stmt = tx.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut inserted = Vec::with_capacity(items.len());
    while let Some(row) = rows.next()? {
        inserted.push(InsertedItem {
            id: row.get("id")?,
            name: row.get("name")?,
            created_at: row.get("created_at")?,
        });
    }

    if inserted.len() != items.len() {
        return Err(StoreError::Integrity(format!(
            "item insert returned {} rows for {} items",
            inserted.len(),
            items.len()
        )));
    }

    inserted.sort_by_key(|item| item.id);
    Ok(inserted)
}

/// Links items to their owner with one multi-row statement.
pub(crate) fn insert_user_items(
    tx: &Transaction<'_>,
    user_id: UserId,
    item_ids: &[ItemId],
) -> StoreResult<()> {
    if item_ids.is_empty() {
        return Ok(());
    }

    let placeholders = vec!["(?, ?)"; item_ids.len()].join(", ");
    let sql = format!("INSERT INTO user_item (user_id, item_id) VALUES {placeholders};");
    let owner = user_id.to_string();
    let mut bind_values: Vec<Value> = Vec::with_capacity(item_ids.len() * 2);
    for item_id in item_ids {
        bind_values.push(Value::Text(owner.clone()));
        bind_values.push(Value::Integer(*item_id));
    }

    tx.execute(&sql, params_from_iter(bind_values))?;
    Ok(())
}

/// Updates name, age and `updated_at`. Returns affected row count.
///
/// `updated_at` never lands on or before `created_at`, even when both fall
/// into the same millisecond.
pub(crate) fn update_user_row(
    tx: &Transaction<'_>,
    id: UserId,
    name: &str,
    age: i32,
    now: i64,
) -> StoreResult<usize> {
    let mut stmt = tx.prepare_cached(
        "UPDATE \"user\"
         SET
            name = ?2,
            age = ?3,
            updated_at = MAX(?4, created_at + 1)
         WHERE id = ?1;",
    )?;
    let changed = stmt.execute(params![id.to_string(), name, age, now])?;
    Ok(changed)
}

pub(crate) fn update_user_type(
    tx: &Transaction<'_>,
    id: UserId,
    user_type: UserType,
) -> StoreResult<usize> {
    let mut stmt = tx.prepare_cached("UPDATE user_type SET type_id = ?2 WHERE user_id = ?1;")?;
    let changed = stmt.execute(params![id.to_string(), user_type.type_id()])?;
    Ok(changed)
}

/// Renames one item if it is owned by `user_id`. Never inserts.
pub(crate) fn update_owned_item(
    tx: &Transaction<'_>,
    user_id: UserId,
    item_id: ItemId,
    name: &str,
    now: i64,
) -> StoreResult<usize> {
    let mut stmt = tx.prepare_cached(
        "UPDATE item
         SET
            name = ?3,
            updated_at = MAX(?4, created_at + 1)
         WHERE id = ?2
           AND id IN (SELECT item_id FROM user_item WHERE user_id = ?1);",
    )?;
    let changed = stmt.execute(params![user_id.to_string(), item_id, name, now])?;
    Ok(changed)
}

/// Deletes every item linked to `user_id`.
pub(crate) fn delete_owned_items(tx: &Transaction<'_>, user_id: UserId) -> StoreResult<usize> {
    let mut stmt = tx.prepare_cached(
        "DELETE FROM item
         WHERE id IN (SELECT item_id FROM user_item WHERE user_id = ?1);",
    )?;
    let changed = stmt.execute([user_id.to_string()])?;
    Ok(changed)
}

pub(crate) fn delete_user_items(tx: &Transaction<'_>, user_id: UserId) -> StoreResult<usize> {
    let mut stmt = tx.prepare_cached("DELETE FROM user_item WHERE user_id = ?1;")?;
    let changed = stmt.execute([user_id.to_string()])?;
    Ok(changed)
}

pub(crate) fn delete_user_type(tx: &Transaction<'_>, user_id: UserId) -> StoreResult<usize> {
    let mut stmt = tx.prepare_cached("DELETE FROM user_type WHERE user_id = ?1;")?;
    let changed = stmt.execute([user_id.to_string()])?;
    Ok(changed)
}

pub(crate) fn delete_user_row(tx: &Transaction<'_>, user_id: UserId) -> StoreResult<usize> {
    let mut stmt = tx.prepare_cached("DELETE FROM \"user\" WHERE id = ?1;")?;
    let changed = stmt.execute([user_id.to_string()])?;
    Ok(changed)
}
