//! Domain model for the user aggregate.
//!
//! # Responsibility
//! - Define the aggregate returned by reads and the commands accepted by writes.
//! - Keep storage-independent shapes shared by the store and service layers.
//!
//! # Invariants
//! - A `User` owns its `Item`s; items never outlive their user.
//! - Listing is offset-paginated through `PageFilter`.

pub mod page;
pub mod user;
