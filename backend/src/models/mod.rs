//! Data models shared across database access and API handlers.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_LIMIT: i64 = 10;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Query parameters for paginated endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationQuery {
    /// Maximum number of records to return (default: 10, max: 100).
    #[serde(default)]
    pub limit: Option<i64>,
    /// Number of records to skip (default: 0).
    #[serde(default)]
    pub offset: Option<i64>,
}

impl PaginationQuery {
    /// Returns a clamped limit value: non-positive or missing means the
    /// default, anything above the maximum is capped.
    pub fn limit(&self) -> i64 {
        match self.limit {
            Some(limit) if limit > 0 => limit.min(MAX_PAGE_LIMIT),
            _ => DEFAULT_PAGE_LIMIT,
        }
    }

    /// Returns offset, floored at 0.
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

/// Wrapper for paginated API responses.
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T: Serialize> {
    /// The data items for the current page.
    pub data: Vec<T>,
    /// Total number of records matching the query.
    pub total: i64,
    /// Page size that was applied.
    pub limit: i64,
    /// Number of records skipped.
    pub offset: i64,
    /// `ceil(total / limit)`.
    pub total_pages: i64,
}

impl<T: Serialize> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total: i64, limit: i64, offset: i64) -> Self {
        Self {
            data,
            total,
            limit,
            offset,
            total_pages: total_pages(total, limit),
        }
    }
}

pub fn total_pages(total: i64, limit: i64) -> i64 {
    if limit <= 0 || total <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}

pub mod about;
pub mod announcement;
pub mod banner;
pub mod donation;
pub mod event;
pub mod gallery;
pub mod kajian;
pub mod session;
pub mod user;
