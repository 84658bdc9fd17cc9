//! Repository layer for the user aggregate.
//!
//! # Responsibility
//! - Define the aggregate data access contract.
//! - Keep SQL, transactions and row decoding inside the persistence boundary.
//!
//! # Invariants
//! - Writes run inside one transaction per call; nothing partial is visible.
//! - Reads go through the `Reconstructor`, never hand-assembled aggregates.
//! - Failures are classified through `StoreError::kind()`.

pub mod error;
pub mod reconstruct;
mod user_read;
pub mod user_repo;
mod user_write;
