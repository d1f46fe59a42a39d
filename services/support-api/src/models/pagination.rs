//! Offset pagination parsed from raw query strings

use serde::Deserialize;

/// Page used when none (or an unusable one) is given
pub const DEFAULT_PAGE: i64 = 1;

/// Raw list query parameters. Kept as strings so malformed numbers fall back
/// to defaults instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
}

impl ListQuery {
    pub fn pagination(&self, default_limit: i64) -> Pagination {
        Pagination::parse(self.page.as_deref(), self.limit.as_deref(), default_limit)
    }

    /// Exact-match status filter, ignoring an empty value
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref().filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    /// Parse page and limit. Missing, non-numeric and non-positive values use
    /// the defaults, so the offset is never negative.
    pub fn parse(page: Option<&str>, limit: Option<&str>, default_limit: i64) -> Self {
        let positive = |raw: Option<&str>| {
            raw.and_then(|v| v.trim().parse::<i64>().ok())
                .filter(|v| *v > 0)
        };

        Self {
            page: positive(page).unwrap_or(DEFAULT_PAGE),
            limit: positive(limit).unwrap_or(default_limit),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}
