//! Page-number pagination primitives.

/// Upper bound for the page size a client may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Page number, starting at 1.
    pub page: u32,
    /// Maximum number of items on the page.
    pub limit: u32,
}

impl PageRequest {
    /// Builds a request, clamping `page` to at least 1 and `limit` to
    /// `1..=MAX_PAGE_SIZE`.
    #[must_use]
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Number of rows to skip.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }

    /// Page size as a SQL-friendly integer.
    #[must_use]
    pub fn limit_i64(&self) -> i64 {
        i64::from(self.limit)
    }
}

/// One page of results together with the total number of matching items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Total matching items across all pages.
    pub total: i64,
    /// The request that produced this page.
    pub request: PageRequest,
}

impl<T> Page<T> {
    /// Creates a page.
    #[must_use]
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            request,
        }
    }

    /// Maps every item, keeping the paging information.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            request: self.request,
        }
    }

    /// Whether a page follows this one.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.request.offset() + i64::from(self.request.limit) < self.total
    }

    /// Whether a page precedes this one.
    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.request.page > 1
    }

    /// True when the request points past the last page. Page 1 is always
    /// valid, even for an empty result.
    #[must_use]
    pub fn is_out_of_range(&self) -> bool {
        self.request.page > 1 && self.items.is_empty()
    }
}

/// Slices an in-memory, already ordered collection into a page.
#[must_use]
pub fn paginate_slice<T: Clone>(items: &[T], request: PageRequest) -> Page<T> {
    let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(request.limit).unwrap_or(usize::MAX);
    let page_items = items.iter().skip(offset).take(limit).cloned().collect();
    let total = i64::try_from(items.len()).unwrap_or(i64::MAX);
    Page::new(page_items, total, request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_clamps_values() {
        let request = PageRequest::new(0, 1000);

        assert_eq!(request.page, 1);
        assert_eq!(request.limit, MAX_PAGE_SIZE);
        assert_eq!(PageRequest::new(3, 0).limit, 1);
    }

    #[test]
    fn test_offset_is_zero_based() {
        assert_eq!(PageRequest::new(1, 6).offset(), 0);
        assert_eq!(PageRequest::new(3, 6).offset(), 12);
    }

    #[test]
    fn test_paginate_slice_reports_neighbours() {
        // Arrange
        let items: Vec<i32> = (1..=13).collect();

        // Act
        let first = paginate_slice(&items, PageRequest::new(1, 5));
        let last = paginate_slice(&items, PageRequest::new(3, 5));

        // Assert
        assert_eq!(first.items, vec![1, 2, 3, 4, 5]);
        assert!(first.has_next());
        assert!(!first.has_previous());
        assert_eq!(last.items, vec![11, 12, 13]);
        assert!(!last.has_next());
        assert!(last.has_previous());
        assert_eq!(last.total, 13);
    }

    #[test]
    fn test_out_of_range_only_after_first_page() {
        let empty: Vec<i32> = Vec::new();

        assert!(!paginate_slice(&empty, PageRequest::new(1, 5)).is_out_of_range());
        assert!(paginate_slice(&empty, PageRequest::new(2, 5)).is_out_of_range());
    }
}
