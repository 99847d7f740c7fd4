//! Page/offset/limit arithmetic shared by every paginated listing.

use serde::Serialize;
use serde_json::json;

use crate::error::AppError;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// Validates `page >= 1` and `limit >= 1`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] when either bound is violated.
    pub fn new(page: i64, limit: i64) -> Result<Self, AppError> {
        if page < 1 {
            return Err(AppError::bad_request(
                "Page must be greater than 0",
                json!({ "page": page }),
            ));
        }

        if limit < 1 {
            return Err(AppError::bad_request(
                "Limit must be greater than 0",
                json!({ "limit": limit }),
            ));
        }

        Ok(Self { page, limit })
    }

    /// Applies defaults (page 1, limit 10) to omitted values, then validates.
    pub fn or_default(page: Option<i64>, limit: Option<i64>) -> Result<Self, AppError> {
        Self::new(page.unwrap_or(DEFAULT_PAGE), limit.unwrap_or(DEFAULT_LIMIT))
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Completes the request with the total item count.
    pub fn with_total(&self, total: i64) -> Pagination {
        Pagination {
            page: self.page,
            limit: self.limit,
            offset: self.offset(),
            total,
            total_pages: total_pages(total, self.limit),
        }
    }
}

/// Pagination metadata for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub offset: i64,
    pub total: i64,
    pub total_pages: i64,
}

/// Computes offset and page count for `total` items.
///
/// An empty result set still reports one (empty) page.
///
/// # Errors
///
/// Returns [`AppError::Validation`] if `page < 1` or `limit < 1`.
pub fn paginate(total: i64, page: i64, limit: i64) -> Result<Pagination, AppError> {
    Ok(PageRequest::new(page, limit)?.with_total(total))
}

fn total_pages(total: i64, limit: i64) -> i64 {
    let total = total.max(0);
    let pages = total / limit + i64::from(total % limit != 0);
    pages.max(1)
}
