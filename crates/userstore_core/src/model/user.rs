//! User aggregate model.
//!
//! # Responsibility
//! - Define the User aggregate (user record, classification, owned items).
//! - Define write commands accepted by the persistence core.
//! - Re-check write commands before they reach storage.
//!
//! # Invariants
//! - `User::id` is generated by the write pipeline and never reused.
//! - A persisted user always carries exactly one `UserType`.
//! - `updated_at` is `None` until the first successful update.
//! - Every persisted `Item` belongs to exactly one user.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a user aggregate.
pub type UserId = Uuid;

/// Backend-generated identifier of an owned item.
pub type ItemId = i64;

/// Upper bound of items accepted by one create.
///
/// Items are written with one multi-row statement binding two parameters
/// each, which must stay below SQLite's 32766 bound-parameter limit.
pub const MAX_ITEMS_PER_CREATE: usize = 10_000;

/// Classification stored in the `user_type` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    /// No classification chosen by the caller.
    Unspecified,
    /// Internal staff member.
    Employee,
    /// External contractor.
    Contractor,
    /// Paying customer.
    Customer,
}

impl UserType {
    /// Numeric id persisted in `user_type.type_id`.
    pub fn type_id(self) -> i64 {
        match self {
            Self::Unspecified => 0,
            Self::Employee => 1,
            Self::Contractor => 2,
            Self::Customer => 3,
        }
    }

    /// Maps a persisted `type_id` back to the enum.
    ///
    /// Returns `None` for ids this build does not know about.
    pub fn from_type_id(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Unspecified),
            1 => Some(Self::Employee),
            2 => Some(Self::Contractor),
            3 => Some(Self::Customer),
            _ => None,
        }
    }
}

/// Item owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    /// Owning user; never dangling once the item is persisted.
    pub user_id: UserId,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds of the last update, if any.
    pub updated_at: Option<i64>,
}

/// User aggregate as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub age: i32,
    #[serde(rename = "type")]
    pub user_type: UserType,
    /// Unix epoch milliseconds. Set once at creation.
    pub created_at: i64,
    /// Unix epoch milliseconds. Strictly later than `created_at` when set.
    pub updated_at: Option<i64>,
    /// Items in insertion order. Empty, never absent, for users without items.
    pub items: Vec<Item>,
}

/// Item payload for user creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
}

impl NewItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Command for creating a user together with its initial items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub age: i32,
    pub user_type: UserType,
    pub items: Vec<NewItem>,
}

impl NewUser {
    /// Creates a command without items.
    pub fn new(name: impl Into<String>, age: i32, user_type: UserType) -> Self {
        Self {
            name: name.into(),
            age,
            user_type,
            items: Vec::new(),
        }
    }

    /// Appends one item name to the creation command.
    pub fn with_item(mut self, name: impl Into<String>) -> Self {
        self.items.push(NewItem::new(name));
        self
    }

    /// Re-checks fields the persistence core relies on.
    pub fn validate(&self) -> Result<(), UserValidationError> {
        ensure_name(&self.name)?;
        if self.items.len() > MAX_ITEMS_PER_CREATE {
            return Err(UserValidationError::TooManyItems {
                count: self.items.len(),
                max: MAX_ITEMS_PER_CREATE,
            });
        }
        for (index, item) in self.items.iter().enumerate() {
            if item.name.trim().is_empty() {
                return Err(UserValidationError::EmptyItemName { index });
            }
        }
        Ok(())
    }
}

/// Item payload for user update. `id` is mandatory for every entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUpdate {
    pub id: Option<ItemId>,
    pub name: String,
}

impl ItemUpdate {
    pub fn new(id: ItemId, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
        }
    }
}

/// Command for updating user fields, classification and item names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    pub id: UserId,
    pub name: String,
    pub age: i32,
    pub user_type: UserType,
    pub items: Vec<ItemUpdate>,
}

impl UserUpdate {
    /// Creates an update command that does not touch any item.
    pub fn new(id: UserId, name: impl Into<String>, age: i32, user_type: UserType) -> Self {
        Self {
            id,
            name: name.into(),
            age,
            user_type,
            items: Vec::new(),
        }
    }

    /// Appends one item rename to the update command.
    pub fn with_item(mut self, id: ItemId, name: impl Into<String>) -> Self {
        self.items.push(ItemUpdate::new(id, name));
        self
    }

    /// Re-check run before any statement is issued.
    ///
    /// # Errors
    /// - `EmptyName` when the user name is blank.
    /// - `MissingItemId` when any item entry lacks an identity.
    /// - `EmptyItemName` when any item entry has a blank name.
    pub fn validate(&self) -> Result<(), UserValidationError> {
        ensure_name(&self.name)?;
        for (index, item) in self.items.iter().enumerate() {
            if item.id.is_none() {
                return Err(UserValidationError::MissingItemId { index });
            }
            if item.name.trim().is_empty() {
                return Err(UserValidationError::EmptyItemName { index });
            }
        }
        Ok(())
    }
}

/// Validation error raised by the core before touching storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyName,
    EmptyItemName { index: usize },
    MissingItemId { index: usize },
    TooManyItems { count: usize, max: usize },
}

impl Display for UserValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "user name must not be empty"),
            Self::EmptyItemName { index } => {
                write!(f, "item #{index} name must not be empty")
            }
            Self::MissingItemId { index } => write!(f, "item #{index} is missing an id"),
            Self::TooManyItems { count, max } => {
                write!(f, "{count} items exceed the limit of {max} per user")
            }
        }
    }
}

impl Error for UserValidationError {}

fn ensure_name(name: &str) -> Result<(), UserValidationError> {
    if name.trim().is_empty() {
        return Err(UserValidationError::EmptyName);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        ItemUpdate, NewItem, NewUser, UserType, UserUpdate, UserValidationError,
        MAX_ITEMS_PER_CREATE,
    };
    use uuid::Uuid;

    #[test]
    fn user_type_ids_roundtrip() {
        for kind in [
            UserType::Unspecified,
            UserType::Employee,
            UserType::Contractor,
            UserType::Customer,
        ] {
            assert_eq!(UserType::from_type_id(kind.type_id()), Some(kind));
        }
        assert_eq!(UserType::from_type_id(42), None);
    }

    #[test]
    fn new_user_rejects_blank_item_name() {
        let user = NewUser::new("alice", 30, UserType::Employee)
            .with_item("laptop")
            .with_item("  ");
        assert_eq!(
            user.validate(),
            Err(UserValidationError::EmptyItemName { index: 1 })
        );
    }

    #[test]
    fn new_user_rejects_item_lists_over_the_limit() {
        let mut user = NewUser::new("alice", 30, UserType::Employee);
        user.items = vec![NewItem::new("item"); MAX_ITEMS_PER_CREATE];
        assert_eq!(user.validate(), Ok(()));

        user.items.push(NewItem::new("one too many"));
        assert_eq!(
            user.validate(),
            Err(UserValidationError::TooManyItems {
                count: MAX_ITEMS_PER_CREATE + 1,
                max: MAX_ITEMS_PER_CREATE,
            })
        );
    }

    #[test]
    fn update_rejects_item_without_id() {
        let mut update = UserUpdate::new(Uuid::new_v4(), "alice", 31, UserType::Employee);
        update.items.push(ItemUpdate {
            id: None,
            name: "monitor".to_string(),
        });
        assert_eq!(
            update.validate(),
            Err(UserValidationError::MissingItemId { index: 0 })
        );
    }

    #[test]
    fn update_rejects_blank_user_name() {
        let update = UserUpdate::new(Uuid::new_v4(), "", 31, UserType::Employee);
        assert_eq!(update.validate(), Err(UserValidationError::EmptyName));
    }
}
