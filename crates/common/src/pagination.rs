//! Page/size pagination shared by every listing.

use serde::{Deserialize, Serialize};

/// Page used when none (or a non-positive one) is requested.
pub const DEFAULT_PAGE: i64 = 1;
/// Page size used when none (or a non-positive one) is requested.
pub const DEFAULT_PAGE_SIZE: i64 = 20;
/// Largest page size a caller can get.
pub const MAX_PAGE_SIZE: i64 = 100;
/// Largest page number kept by [`PageRequest::clamp`]; the offset of any
/// clamped window fits in an `i64`.
pub const MAX_PAGE: i64 = i64::MAX / MAX_PAGE_SIZE;

/// A requested page window. Out-of-range values are clamped, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Items per page.
    #[serde(default = "default_size")]
    pub size: i64,
}

const fn default_page() -> i64 {
    DEFAULT_PAGE
}

const fn default_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Create a page request as given by the caller.
    #[must_use]
    pub const fn new(page: i64, size: i64) -> Self {
        Self { page, size }
    }

    /// Clamp into `1 <= page <= MAX_PAGE`, `1 <= size <= 100`.
    #[must_use]
    pub const fn clamp(self) -> Self {
        let page = if self.page <= 0 {
            DEFAULT_PAGE
        } else if self.page > MAX_PAGE {
            MAX_PAGE
        } else {
            self.page
        };
        let size = if self.size <= 0 {
            DEFAULT_PAGE_SIZE
        } else if self.size > MAX_PAGE_SIZE {
            MAX_PAGE_SIZE
        } else {
            self.size
        };
        Self { page, size }
    }

    /// Row limit for this window.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.size as u64
    }

    /// Row offset for this window. Saturates instead of overflowing.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        let offset = self.page.saturating_sub(1).saturating_mul(self.size);
        if offset < 0 { 0 } else { offset as u64 }
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Total number of matching items across all pages.
    pub total: u64,
    /// Clamped page number.
    pub page: i64,
    /// Clamped page size.
    pub size: i64,
}

impl<T> Page<T> {
    /// Assemble a page from items fetched with `window`.
    #[must_use]
    pub const fn new(items: Vec<T>, total: u64, window: PageRequest) -> Self {
        Self {
            items,
            total,
            page: window.page,
            size: window.size,
        }
    }

    /// An empty first page for `window`.
    #[must_use]
    pub const fn empty(window: PageRequest) -> Self {
        Self::new(Vec::new(), 0, window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_out_of_range() {
        assert_eq!(PageRequest::new(0, 500).clamp(), PageRequest::new(1, 100));
        assert_eq!(PageRequest::new(-3, 0).clamp(), PageRequest::new(1, 20));
        assert_eq!(PageRequest::new(2, -1).clamp(), PageRequest::new(2, 20));
    }

    #[test]
    fn test_clamp_keeps_valid_values() {
        assert_eq!(PageRequest::new(3, 15).clamp(), PageRequest::new(3, 15));
        assert_eq!(PageRequest::new(1, 100).clamp(), PageRequest::new(1, 100));
        assert_eq!(PageRequest::new(1, 1).clamp(), PageRequest::new(1, 1));
    }

    #[test]
    fn test_limit_offset() {
        let window = PageRequest::new(3, 25).clamp();
        assert_eq!(window.limit(), 25);
        assert_eq!(window.offset(), 50);
        assert_eq!(PageRequest::default().offset(), 0);
    }

    #[test]
    fn test_clamp_huge_page() {
        let window = PageRequest::new(i64::MAX, 100).clamp();
        assert_eq!(window.page, MAX_PAGE);
        assert_eq!(window.offset(), ((MAX_PAGE - 1) * 100) as u64);
        assert!(i64::try_from(window.offset()).is_ok());
    }

    #[test]
    fn test_offset_saturates_when_unclamped() {
        assert_eq!(PageRequest::new(i64::MAX, 100).offset(), i64::MAX as u64);
        assert_eq!(PageRequest::new(-5, 10).offset(), 0);
    }
}
