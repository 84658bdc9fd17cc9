//! Relational persistence core for the user aggregate.
//! A user, its classification and its owned items are stored across four
//! normalized tables and always read and written as one unit.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{ConfigError, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::page::PageFilter;
pub use model::user::{
    Item, ItemId, ItemUpdate, NewItem, NewUser, User, UserId, UserType, UserUpdate,
    UserValidationError, MAX_ITEMS_PER_CREATE,
};
pub use repo::error::{ErrorKind, StoreError, StoreResult};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use service::requests::{
    CreateItemRequest, CreateUserRequest, DeleteUserRequest, GetUserRequest, ListUserRequest,
    PageFilterRequest, UpdateItemRequest, UpdateUserRequest,
};
pub use service::user_service::UserService;
pub use service::validation::ValidationError;
pub use store::{UserStorage, UserStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
