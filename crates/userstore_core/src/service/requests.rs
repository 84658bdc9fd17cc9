//! Raw request shapes accepted by `UserService`.
//!
//! Values arrive unvalidated: ids are strings, numbers are wide signed
//! integers, and the page filter may be missing altogether. Each request
//! implements only the capability traits its validation needs.

use super::validation::{HasAge, HasId, HasItems, HasName, HasPageFilter};
use crate::model::user::UserType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub age: i32,
    pub user_type: UserType,
    #[serde(default)]
    pub items: Vec<CreateItemRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateItemRequest {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub id: String,
    pub name: String,
    pub age: i32,
    pub user_type: UserType,
    #[serde(default)]
    pub items: Vec<UpdateItemRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetUserRequest {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteUserRequest {
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFilterRequest {
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListUserRequest {
    pub page_filter: Option<PageFilterRequest>,
}

impl HasName for CreateItemRequest {
    fn name(&self) -> &str {
        &self.name
    }
}

impl HasName for CreateUserRequest {
    fn name(&self) -> &str {
        &self.name
    }
}

impl HasAge for CreateUserRequest {
    fn age(&self) -> i32 {
        self.age
    }
}

impl HasItems for CreateUserRequest {
    type Item = CreateItemRequest;

    fn items(&self) -> &[CreateItemRequest] {
        &self.items
    }
}

impl HasId for UpdateItemRequest {
    fn id(&self) -> &str {
        &self.id
    }
}

impl HasName for UpdateItemRequest {
    fn name(&self) -> &str {
        &self.name
    }
}

impl HasId for UpdateUserRequest {
    fn id(&self) -> &str {
        &self.id
    }
}

impl HasName for UpdateUserRequest {
    fn name(&self) -> &str {
        &self.name
    }
}

impl HasAge for UpdateUserRequest {
    fn age(&self) -> i32 {
        self.age
    }
}

impl HasItems for UpdateUserRequest {
    type Item = UpdateItemRequest;

    fn items(&self) -> &[UpdateItemRequest] {
        &self.items
    }
}

impl HasId for GetUserRequest {
    fn id(&self) -> &str {
        &self.id
    }
}

impl HasId for DeleteUserRequest {
    fn id(&self) -> &str {
        &self.id
    }
}

impl HasPageFilter for ListUserRequest {
    fn page_filter(&self) -> Option<(i64, i64)> {
        self.page_filter.map(|filter| (filter.page, filter.limit))
    }
}
