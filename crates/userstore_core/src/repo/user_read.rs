//! Join queries that load user aggregates.
//!
//! # Responsibility
//! - Issue the `user ⋈ user_type ⟕ user_item ⟕ item` join for one user or
//!   one page of users.
//! - Decode rows and stream them through the `Reconstructor`.
//!
//! # Invariants
//! - Rows are ordered by user id, then item id, so aggregates are
//!   deterministic across runs.
//! - Page membership is decided on user ids alone, never on joined rows.

use super::error::{StoreError, StoreResult};
use super::reconstruct::{ItemColumns, Reconstructor, UserRow};
use crate::model::page::PageFilter;
use crate::model::user::{User, UserId, UserType};
use rusqlite::{params, Connection, Row, Rows};
use uuid::Uuid;

const USER_AGGREGATE_SELECT_SQL: &str = "SELECT
    u.id AS user_id,
    u.name AS user_name,
    u.age AS user_age,
    ut.type_id AS user_type_id,
    u.created_at AS user_created_at,
    u.updated_at AS user_updated_at,
    i.id AS item_id,
    i.name AS item_name,
    i.created_at AS item_created_at,
    i.updated_at AS item_updated_at
FROM \"user\" u
INNER JOIN user_type ut ON ut.user_id = u.id
LEFT JOIN user_item ui ON ui.user_id = u.id
LEFT JOIN item i ON i.id = ui.item_id";

/// Loads exactly one aggregate by id.
///
/// # Errors
/// - `NotFound` when no row matches.
/// - `Integrity` when rows for more than one user come back.
pub(crate) fn select_user(conn: &Connection, id: UserId) -> StoreResult<User> {
    let mut stmt = conn.prepare_cached(&format!(
        "{USER_AGGREGATE_SELECT_SQL}
         WHERE u.id = ?1
         ORDER BY i.id ASC;"
    ))?;
    let rows = stmt.query([id.to_string()])?;
    let mut users = collect_users(rows)?;

    match users.len() {
        0 => Err(StoreError::NotFound(id)),
        1 => Ok(users.remove(0)),
        count => Err(StoreError::Integrity(format!(
            "lookup by id {id} matched {count} distinct users"
        ))),
    }
}

/// Loads one page of aggregates ordered by ascending user id.
pub(crate) fn select_users_page(conn: &Connection, filter: &PageFilter) -> StoreResult<Vec<User>> {
    if !filter.is_valid() {
        return Err(StoreError::InvalidInput(format!(
            "page and limit must be >= 1, got page={} limit={}",
            filter.page, filter.limit
        )));
    }

    let mut stmt = conn.prepare_cached(&format!(
        "{USER_AGGREGATE_SELECT_SQL}
         WHERE u.id IN (
            SELECT id FROM \"user\" ORDER BY id ASC LIMIT ?1 OFFSET ?2
         )
         ORDER BY u.id ASC, i.id ASC;"
    ))?;
    let rows = stmt.query(params![i64::from(filter.limit), filter.offset()])?;
    collect_users(rows)
}

fn collect_users(mut rows: Rows<'_>) -> StoreResult<Vec<User>> {
    let mut reconstructor = Reconstructor::new();
    while let Some(row) = rows.next()? {
        reconstructor.push(parse_user_row(row)?);
    }
    Ok(reconstructor.finish())
}

fn parse_user_row(row: &Row<'_>) -> StoreResult<UserRow> {
    let id_text: String = row.get("user_id")?;
    let user_id = Uuid::parse_str(&id_text).map_err(|_| {
        StoreError::InvalidData(format!("invalid uuid value `{id_text}` in user.id"))
    })?;

    let type_id: i64 = row.get("user_type_id")?;
    let user_type = UserType::from_type_id(type_id).ok_or_else(|| {
        StoreError::InvalidData(format!(
            "unknown type id `{type_id}` in user_type.type_id for user {user_id}"
        ))
    })?;

    Ok(UserRow {
        user_id,
        name: row.get("user_name")?,
        age: row.get("user_age")?,
        user_type,
        created_at: row.get("user_created_at")?,
        updated_at: row.get("user_updated_at")?,
        item: parse_item_columns(row)?,
    })
}

fn parse_item_columns(row: &Row<'_>) -> StoreResult<Option<ItemColumns>> {
    let id: Option<i64> = row.get("item_id")?;
    let name: Option<String> = row.get("item_name")?;
    let (Some(id), Some(name)) = (id, name) else {
        return Ok(None);
    };

    let created_at: Option<i64> = row.get("item_created_at")?;
    let created_at = created_at.ok_or_else(|| {
        StoreError::InvalidData(format!("missing created_at for item {id}"))
    })?;

    Ok(Some(ItemColumns {
        id,
        name,
        created_at,
        updated_at: row.get("item_updated_at")?,
    }))
}
