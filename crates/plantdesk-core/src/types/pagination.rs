//! Pagination types for the notification list endpoint.

use serde::{Deserialize, Serialize};

/// Default page size.
const DEFAULT_PAGE_SIZE: u64 = 20;
/// Maximum page size.
const MAX_PAGE_SIZE: u64 = 100;

/// Query parameters for `GET /notifications`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    /// Page number (1-based).
    #[serde(default = "default_page")]
    pub page: u64,
    /// Number of items per page.
    #[serde(default = "default_page_size")]
    pub limit: u64,
    /// Only return notifications the viewing user has not read.
    #[serde(default)]
    pub unread_only: bool,
}

impl ListParams {
    /// Create new list parameters, clamping page and limit into range.
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_SIZE),
            unread_only: false,
        }
    }

    /// Restrict the listing to unread notifications.
    pub fn unread_only(mut self, unread_only: bool) -> Self {
        self.unread_only = unread_only;
        self
    }

    /// Query string pairs in wire order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if self.unread_only {
            pairs.push(("unreadOnly", "true".to_string()));
        }
        pairs
    }
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            unread_only: false,
        }
    }
}

/// Pagination metadata returned alongside a notification page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Current page number (1-based).
    #[serde(default = "default_page")]
    pub current_page: u64,
    /// Total number of pages.
    #[serde(default = "default_page")]
    pub total_pages: u64,
    /// Total number of items across all pages.
    #[serde(default, alias = "total")]
    pub total_count: u64,
    /// Whether there is a next page.
    #[serde(default)]
    pub has_next: bool,
    /// Whether there is a previous page.
    #[serde(default, alias = "hasPrevious")]
    pub has_prev: bool,
}

impl Pagination {
    /// Build metadata for a page of a list with `total_count` items.
    pub fn new(current_page: u64, limit: u64, total_count: u64) -> Self {
        let limit = limit.max(1);
        let total_pages = if total_count == 0 {
            1
        } else {
            total_count.div_ceil(limit)
        };
        Self {
            current_page,
            total_pages,
            total_count,
            has_next: current_page < total_pages,
            has_prev: current_page > 1,
        }
    }

    /// Metadata for a response that carried none.
    pub fn single_page(total_count: u64) -> Self {
        Self::new(1, total_count.max(1), total_count)
    }
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}
