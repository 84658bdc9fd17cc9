//! Offset pagination filter for user listing.

use serde::{Deserialize, Serialize};

/// 1-based page selector.
///
/// Both fields must be at least 1; the repository rejects zero values
/// instead of clamping them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFilter {
    pub page: u32,
    pub limit: u32,
}

impl PageFilter {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    /// Returns `true` when page and limit are both positive.
    pub fn is_valid(&self) -> bool {
        self.page >= 1 && self.limit >= 1
    }

    /// Number of user rows skipped before this page: `limit * (page - 1)`.
    ///
    /// Saturates at `i64::MAX`, which selects an empty page.
    pub fn offset(&self) -> i64 {
        i64::from(self.limit).saturating_mul(i64::from(self.page.max(1)) - 1)
    }
}
