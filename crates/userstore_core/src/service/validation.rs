//! Request validation built from per-field capabilities.
//!
//! # Responsibility
//! - Declare one small trait per validated field (`HasName`, `HasAge`, ...).
//! - Provide one validator per capability and generic composites per
//!   request shape.
//!
//! # Invariants
//! - Validators never touch storage.
//! - Item failures report the offending item position.

use crate::model::page::PageFilter;
use crate::model::user::{ItemId, UserId};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub trait HasName {
    fn name(&self) -> &str;
}

pub trait HasAge {
    fn age(&self) -> i32;
}

pub trait HasId {
    fn id(&self) -> &str;
}

pub trait HasItems {
    type Item;

    fn items(&self) -> &[Self::Item];
}

/// Exposes the raw `(page, limit)` pair, if the caller sent one.
pub trait HasPageFilter {
    fn page_filter(&self) -> Option<(i64, i64)>;
}

/// Request validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingId,
    MalformedId(String),
    MissingName,
    NonPositiveAge(i32),
    MissingPageFilter,
    NonPositivePage(i64),
    NonPositiveLimit(i64),
    PageFilterOutOfRange { page: i64, limit: i64 },
    Item {
        index: usize,
        source: Box<ValidationError>,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingId => write!(f, "id is missing"),
            Self::MalformedId(value) => write!(f, "id `{value}` is malformed"),
            Self::MissingName => write!(f, "name is missing"),
            Self::NonPositiveAge(age) => write!(f, "age of user must be positive, age = {age}"),
            Self::MissingPageFilter => write!(f, "page filter is missing"),
            Self::NonPositivePage(page) => write!(f, "page must be > 0, page = {page}"),
            Self::NonPositiveLimit(limit) => write!(f, "limit must be > 0, limit = {limit}"),
            Self::PageFilterOutOfRange { page, limit } => write!(
                f,
                "page filter out of range, page = {page}, limit = {limit}"
            ),
            Self::Item { index, source } => write!(f, "item #{index} is invalid: {source}"),
        }
    }
}

impl Error for ValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Item { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

pub fn validate_name(data: &impl HasName) -> Result<(), ValidationError> {
    if data.name().trim().is_empty() {
        return Err(ValidationError::MissingName);
    }
    Ok(())
}

pub fn validate_age(data: &impl HasAge) -> Result<(), ValidationError> {
    if data.age() <= 0 {
        return Err(ValidationError::NonPositiveAge(data.age()));
    }
    Ok(())
}

pub fn validate_id(data: &impl HasId) -> Result<(), ValidationError> {
    if data.id().trim().is_empty() {
        return Err(ValidationError::MissingId);
    }
    Ok(())
}

/// Validates and converts a user id.
pub fn parse_user_id(data: &impl HasId) -> Result<UserId, ValidationError> {
    validate_id(data)?;
    let raw = data.id().trim();
    Uuid::parse_str(raw).map_err(|_| ValidationError::MalformedId(raw.to_string()))
}

/// Validates and converts an item id.
pub fn parse_item_id(data: &impl HasId) -> Result<ItemId, ValidationError> {
    validate_id(data)?;
    let raw = data.id().trim();
    raw.parse::<ItemId>()
        .map_err(|_| ValidationError::MalformedId(raw.to_string()))
}

/// Validates page/limit and narrows them to the store's `PageFilter`.
pub fn validate_page_filter(data: &impl HasPageFilter) -> Result<PageFilter, ValidationError> {
    let (page, limit) = data
        .page_filter()
        .ok_or(ValidationError::MissingPageFilter)?;
    if page <= 0 {
        return Err(ValidationError::NonPositivePage(page));
    }
    if limit <= 0 {
        return Err(ValidationError::NonPositiveLimit(limit));
    }

    match (u32::try_from(page), u32::try_from(limit)) {
        (Ok(page), Ok(limit)) => Ok(PageFilter::new(page, limit)),
        _ => Err(ValidationError::PageFilterOutOfRange { page, limit }),
    }
}

pub fn validate_create_user_request<R>(request: &R) -> Result<(), ValidationError>
where
    R: HasName + HasAge + HasItems,
    R::Item: HasName,
{
    validate_age(request)?;
    validate_name(request)?;
    for (index, item) in request.items().iter().enumerate() {
        validate_name(item).map_err(|err| item_error(index, err))?;
    }
    Ok(())
}

pub fn validate_update_user_request<R>(request: &R) -> Result<(), ValidationError>
where
    R: HasId + HasName + HasAge + HasItems,
    R::Item: HasId + HasName,
{
    validate_id(request)?;
    validate_age(request)?;
    validate_name(request)?;
    for (index, item) in request.items().iter().enumerate() {
        validate_id(item).map_err(|err| item_error(index, err))?;
        validate_name(item).map_err(|err| item_error(index, err))?;
    }
    Ok(())
}

fn item_error(index: usize, err: ValidationError) -> ValidationError {
    ValidationError::Item {
        index,
        source: Box::new(err),
    }
}
