//! User use-case service.
//!
//! # Responsibility
//! - Validate raw requests before the store is invoked.
//! - Convert request values into store commands.
//! - Delegate persistence to an injected `UserStorage`.
//!
//! # Invariants
//! - Invalid requests never reach storage.
//! - Errors keep the store's three-way classification.

use super::requests::{
    CreateUserRequest, DeleteUserRequest, GetUserRequest, ListUserRequest, UpdateUserRequest,
};
use super::validation::{
    parse_item_id, parse_user_id, validate_create_user_request, validate_page_filter,
    validate_update_user_request, ValidationError,
};
use crate::model::user::{ItemUpdate, NewItem, NewUser, User, UserUpdate};
use crate::repo::error::{StoreError, StoreResult};
use crate::store::UserStorage;
use log::warn;

/// Request-level facade over a `UserStorage` implementation.
pub struct UserService<S: UserStorage> {
    storage: S,
}

impl<S: UserStorage> UserService<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn create_user(&self, request: &CreateUserRequest) -> StoreResult<User> {
        validate_create_user_request(request).map_err(|err| rejected("user_create", err))?;

        let command = NewUser {
            name: request.name.clone(),
            age: request.age,
            user_type: request.user_type,
            items: request
                .items
                .iter()
                .map(|item| NewItem::new(item.name.clone()))
                .collect(),
        };
        self.storage.create_user(&command)
    }

    /// Updates a user and returns the merged aggregate.
    pub fn update_user(&self, request: &UpdateUserRequest) -> StoreResult<User> {
        let command = build_update(request).map_err(|err| rejected("user_update", err))?;
        self.storage.update_user(&command)
    }

    pub fn delete_user(&self, request: &DeleteUserRequest) -> StoreResult<()> {
        let id = parse_user_id(request).map_err(|err| rejected("user_delete", err))?;
        self.storage.delete_user(id)
    }

    pub fn get_user(&self, request: &GetUserRequest) -> StoreResult<User> {
        let id = parse_user_id(request).map_err(|err| rejected("user_get", err))?;
        self.storage.get_user(id)
    }

    pub fn list_users(&self, request: &ListUserRequest) -> StoreResult<Vec<User>> {
        let filter = validate_page_filter(request).map_err(|err| rejected("user_list", err))?;
        self.storage.list_users(&filter)
    }
}

fn build_update(request: &UpdateUserRequest) -> Result<UserUpdate, ValidationError> {
    validate_update_user_request(request)?;
    let id = parse_user_id(request)?;

    let mut items = Vec::with_capacity(request.items.len());
    for (index, item) in request.items.iter().enumerate() {
        let item_id = parse_item_id(item).map_err(|err| ValidationError::Item {
            index,
            source: Box::new(err),
        })?;
        items.push(ItemUpdate::new(item_id, item.name.clone()));
    }

    Ok(UserUpdate {
        id,
        name: request.name.clone(),
        age: request.age,
        user_type: request.user_type,
        items,
    })
}

fn rejected(event: &'static str, err: ValidationError) -> StoreError {
    warn!(
        "event={} module=service status=rejected error_kind=invalid_input error={}",
        event, err
    );
    StoreError::InvalidInput(err.to_string())
}
