//! Row-stream to aggregate grouping.
//!
//! # Responsibility
//! - Fold denormalized `user x item` join rows into `User` aggregates.
//!
//! # Invariants
//! - One pass over the rows; each row is looked at exactly once.
//! - Users come out in the order their first row arrived.
//! - Items of one user keep row arrival order.
//! - A row without item columns contributes the user shell only.

use crate::model::user::{Item, ItemId, User, UserId, UserType};
use std::collections::HashMap;

/// Item half of a join row. Absent when the user owns no items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemColumns {
    pub id: ItemId,
    pub name: String,
    pub created_at: i64,
    pub updated_at: Option<i64>,
}

/// One decoded row of the user aggregate join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub user_id: UserId,
    pub name: String,
    pub age: i32,
    pub user_type: UserType,
    pub created_at: i64,
    pub updated_at: Option<i64>,
    pub item: Option<ItemColumns>,
}

/// Incremental grouping state: ordered users plus an id -> position index.
#[derive(Debug, Default)]
pub struct Reconstructor {
    users: Vec<User>,
    positions: HashMap<UserId, usize>,
}

impl Reconstructor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one row into the aggregate set.
    ///
    /// User columns of repeated rows are ignored; the first row seen for a
    /// user id defines the shell.
    pub fn push(&mut self, row: UserRow) {
        let position = match self.positions.get(&row.user_id) {
            Some(position) => *position,
            None => {
                let position = self.users.len();
                self.positions.insert(row.user_id, position);
                self.users.push(User {
                    id: row.user_id,
                    name: row.name,
                    age: row.age,
                    user_type: row.user_type,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                    items: Vec::new(),
                });
                position
            }
        };

        if let Some(item) = row.item {
            self.users[position].items.push(Item {
                id: item.id,
                name: item.name,
                user_id: row.user_id,
                created_at: item.created_at,
                updated_at: item.updated_at,
            });
        }
    }

    pub fn finish(self) -> Vec<User> {
        self.users
    }
}

/// Groups a complete row sequence in one pass.
pub fn reconstruct(rows: impl IntoIterator<Item = UserRow>) -> Vec<User> {
    let mut reconstructor = Reconstructor::new();
    for row in rows {
        reconstructor.push(row);
    }
    reconstructor.finish()
}
