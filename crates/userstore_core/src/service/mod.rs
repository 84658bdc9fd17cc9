//! Request-facing use-case services.
//!
//! # Responsibility
//! - Validate raw request values with capability-based validators.
//! - Keep callers decoupled from storage and SQL details.

pub mod requests;
pub mod user_service;
pub mod validation;
