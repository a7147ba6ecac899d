//! API Response types
//!
//! Standardized listing envelope returned by every collection endpoint.

use serde::{Deserialize, Serialize};

/// Pagination metadata for a listing operation
///
/// Computed from the accumulated filter state and the total match count,
/// independent of which page was actually fetched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageMeta {
    /// Current page number (1-based)
    pub page: u32,
    /// Items per page
    pub limit: u32,
    /// Total number of matching records
    pub total: u64,
    /// Total number of pages
    pub total_page: u32,
}

impl PageMeta {
    /// Create pagination metadata, deriving `total_page` as ceil(total / limit)
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let total_page = if limit == 0 {
            0
        } else {
            ((total as f64) / (limit as f64)).ceil() as u32
        };
        Self {
            page,
            limit,
            total,
            total_page,
        }
    }
}

/// Listing response wrapper: `{ meta, result }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    /// Pagination metadata
    pub meta: PageMeta,
    /// Matching records
    pub result: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new(meta: PageMeta, result: Vec<T>) -> Self {
        Self { meta, result }
    }
}
