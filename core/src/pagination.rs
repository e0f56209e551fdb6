//! Pagination primitives.
//!
//! Pages are 1-indexed. Every listing returns a [`Page`] whose
//! [`Page::pagination`] summary carries `currentPage`, `totalPages`,
//! `totalCount`, `hasNext` and `hasPrev`.

use serde::Serialize;
use thiserror::Error;

/// Rejected page parameters.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PageRequestError {
    /// `page` was zero.
    #[error("page must be 1 or greater")]
    PageOutOfRange,

    /// `limit` was zero or above the maximum.
    #[error("limit must be between 1 and {max}")]
    LimitOutOfRange {
        /// Largest accepted limit
        max: u32,
    },
}

/// A validated request for one page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Largest page size served in one response.
    pub const MAX_LIMIT: u32 = 100;

    /// Validate a 1-indexed page number and page size.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError`] if `page` is zero or `limit` is outside
    /// `1..=MAX_LIMIT`.
    pub const fn new(page: u32, limit: u32) -> Result<Self, PageRequestError> {
        if page == 0 {
            return Err(PageRequestError::PageOutOfRange);
        }
        if limit == 0 || limit > Self::MAX_LIMIT {
            return Err(PageRequestError::LimitOutOfRange {
                max: Self::MAX_LIMIT,
            });
        }
        Ok(Self { page, limit })
    }

    /// Build from optional query parameters, falling back to page 1 and
    /// `default_limit`.
    ///
    /// # Errors
    ///
    /// Same as [`PageRequest::new`].
    pub fn from_query(
        page: Option<u32>,
        limit: Option<u32>,
        default_limit: u32,
    ) -> Result<Self, PageRequestError> {
        Self::new(page.unwrap_or(1), limit.unwrap_or(default_limit))
    }

    /// 1-indexed page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Page size.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of rows to skip.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

/// One page of results plus the total number of matching rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Total matching rows across all pages.
    pub total: u64,
    /// The request that produced this page.
    pub request: PageRequest,
}

impl<T> Page<T> {
    /// Assemble a page.
    #[must_use]
    pub const fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            request,
        }
    }

    /// Slice an already filtered and ordered collection.
    #[must_use]
    pub fn from_sorted(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len() as u64;
        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let items = all
            .into_iter()
            .skip(offset)
            .take(request.limit() as usize)
            .collect();
        Self::new(items, total, request)
    }

    /// Number of pages needed to show `total` rows.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.request.limit as u64)
    }

    /// Summary for response bodies.
    #[must_use]
    pub const fn pagination(&self) -> Pagination {
        let total_pages = self.total_pages();
        let current_page = self.request.page;
        Pagination {
            current_page,
            total_pages,
            total_count: self.total,
            has_next: (current_page as u64) < total_pages,
            has_prev: current_page > 1,
        }
    }

    /// Transform the items, keeping the paging metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            request: self.request,
        }
    }
}

/// Pagination summary serialized into listing responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// 1-indexed page that was served
    pub current_page: u32,
    /// Number of pages available
    pub total_pages: u64,
    /// Number of matching rows
    pub total_count: u64,
    /// Whether a later page exists
    pub has_next: bool,
    /// Whether an earlier page exists
    pub has_prev: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_page_zero() {
        assert_eq!(PageRequest::new(0, 10), Err(PageRequestError::PageOutOfRange));
    }

    #[test]
    fn test_rejects_limit_out_of_range() {
        assert!(PageRequest::new(1, 0).is_err());
        assert!(PageRequest::new(1, 101).is_err());
        assert!(PageRequest::new(1, 100).is_ok());
    }

    #[test]
    fn test_offset() {
        let request = PageRequest::new(3, 20).unwrap();
        assert_eq!(request.offset(), 40);
    }

    #[test]
    fn test_pagination_summary() {
        let request = PageRequest::new(2, 10).unwrap();
        let page = Page::from_sorted((0..25).collect::<Vec<u32>>(), request);

        assert_eq!(page.items, (10..20).collect::<Vec<u32>>());
        let summary = page.pagination();
        assert_eq!(summary.current_page, 2);
        assert_eq!(summary.total_pages, 3);
        assert_eq!(summary.total_count, 25);
        assert!(summary.has_next);
        assert!(summary.has_prev);
    }

    #[test]
    fn test_empty_result_has_no_pages() {
        let request = PageRequest::new(1, 10).unwrap();
        let page: Page<u32> = Page::from_sorted(Vec::new(), request);
        let summary = page.pagination();
        assert_eq!(summary.total_pages, 0);
        assert!(!summary.has_next);
        assert!(!summary.has_prev);
    }

    #[test]
    fn test_pagination_serializes_camel_case() {
        let request = PageRequest::new(1, 10).unwrap();
        let page: Page<u32> = Page::new(vec![1], 1, request);
        let json = serde_json::to_value(page.pagination()).unwrap();
        assert_eq!(json["currentPage"], 1);
        assert_eq!(json["hasNext"], false);
        assert_eq!(json["totalCount"], 1);
    }
}
