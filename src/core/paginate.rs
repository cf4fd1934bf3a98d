// ListingDesk - core/paginate.rs
//
// Page window over the filtered + sorted view. Pages are 1-based.

use crate::util::constants::{
    DEFAULT_ROWS_PER_PAGE, NARROW_ROWS_PER_PAGE, ROWS_PER_PAGE_OPTIONS,
};
use std::ops::Range;

/// Current page and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    current_page: usize,
    rows_per_page: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current_page: 1,
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
        }
    }
}

/// Whether `rows` is one of the offered page sizes.
pub fn is_valid_rows_per_page(rows: usize) -> bool {
    ROWS_PER_PAGE_OPTIONS.contains(&rows)
}

/// Default page size for a viewport: 25 when narrow, 50 otherwise.
pub fn default_rows_per_page(viewport_width: u32, narrow_threshold: u32) -> usize {
    if viewport_width < narrow_threshold {
        NARROW_ROWS_PER_PAGE
    } else {
        DEFAULT_ROWS_PER_PAGE
    }
}

impl Pagination {
    /// Restore a persisted position. Unknown page sizes fall back to
    /// `fallback_rows` (itself checked); page 0 becomes 1.
    pub fn new(current_page: usize, rows_per_page: usize, fallback_rows: usize) -> Self {
        let rows_per_page = if is_valid_rows_per_page(rows_per_page) {
            rows_per_page
        } else if is_valid_rows_per_page(fallback_rows) {
            tracing::debug!(rows_per_page, fallback_rows, "Ignoring unsupported page size");
            fallback_rows
        } else {
            tracing::debug!(rows_per_page, "Ignoring unsupported page size");
            DEFAULT_ROWS_PER_PAGE
        };
        Self {
            current_page: current_page.max(1),
            rows_per_page,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    /// Number of pages needed for `total` rows (0 for an empty view).
    pub fn total_pages(&self, total: usize) -> usize {
        total.div_ceil(self.rows_per_page)
    }

    /// Change the page size. Returns false (and changes nothing) for sizes
    /// outside the offered options. Always returns to page 1 on success.
    pub fn set_rows_per_page(&mut self, rows: usize) -> bool {
        if !is_valid_rows_per_page(rows) {
            return false;
        }
        self.rows_per_page = rows;
        self.current_page = 1;
        true
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    /// Jump to `page`, clamped to `1..=max(1, total_pages)`.
    pub fn go_to(&mut self, page: usize, total: usize) {
        let last = self.total_pages(total).max(1);
        self.current_page = page.clamp(1, last);
    }

    pub fn next(&mut self, total: usize) {
        self.go_to(self.current_page + 1, total);
    }

    pub fn previous(&mut self, total: usize) {
        self.go_to(self.current_page.saturating_sub(1), total);
    }

    pub fn first(&mut self) {
        self.current_page = 1;
    }

    pub fn last(&mut self, total: usize) {
        self.go_to(usize::MAX, total);
    }

    /// Pull the current page back when the view shrank below it.
    /// Returns true when the page changed.
    pub fn clamp(&mut self, total: usize) -> bool {
        let last = self.total_pages(total).max(1);
        if self.current_page > last {
            self.current_page = last;
            true
        } else {
            false
        }
    }

    /// `[(page-1)*size, min(page*size, total))`, empty when past the end.
    pub fn range(&self, total: usize) -> Range<usize> {
        let start = (self.current_page - 1)
            .saturating_mul(self.rows_per_page)
            .min(total);
        let end = self
            .current_page
            .saturating_mul(self.rows_per_page)
            .min(total);
        start..end
    }

    /// The slice of `items` shown on the current page.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.range(items.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rows_per_page_by_viewport() {
        assert_eq!(default_rows_per_page(400, 768), 25);
        assert_eq!(default_rows_per_page(1280, 768), 50);
    }

    #[test]
    fn test_range_of_last_partial_page() {
        let mut p = Pagination::new(1, 10, DEFAULT_ROWS_PER_PAGE);
        p.go_to(3, 25);
        assert_eq!(p.range(25), 20..25);
    }

    #[test]
    fn test_pages_partition_the_view() {
        let items: Vec<usize> = (0..137).collect();
        let mut p = Pagination::new(1, 25, DEFAULT_ROWS_PER_PAGE);
        let pages = p.total_pages(items.len());
        let mut seen = Vec::new();
        for page in 1..=pages {
            p.go_to(page, items.len());
            let slice = p.slice(&items);
            assert!(slice.len() <= 25);
            if page < pages {
                assert_eq!(slice.len(), 25);
            }
            seen.extend_from_slice(slice);
        }
        assert_eq!(seen, items);
    }

    #[test]
    fn test_clamp_after_shrink() {
        let mut p = Pagination::new(5, 10, DEFAULT_ROWS_PER_PAGE);
        assert!(p.clamp(22));
        assert_eq!(p.current_page(), 3);
        assert!(p.clamp(0));
        assert_eq!(p.current_page(), 1);
        assert!(!p.clamp(0));
    }

    #[test]
    fn test_rows_per_page_change_resets_page() {
        let mut p = Pagination::new(4, 10, DEFAULT_ROWS_PER_PAGE);
        assert!(p.set_rows_per_page(100));
        assert_eq!(p.current_page(), 1);
        assert!(!p.set_rows_per_page(33));
        assert_eq!(p.rows_per_page(), 100);
    }

    #[test]
    fn test_navigation_is_clamped() {
        let mut p = Pagination::new(1, 10, DEFAULT_ROWS_PER_PAGE);
        p.previous(35);
        assert_eq!(p.current_page(), 1);
        p.last(35);
        assert_eq!(p.current_page(), 4);
        p.next(35);
        assert_eq!(p.current_page(), 4);
        p.first();
        assert_eq!(p.current_page(), 1);
    }

    #[test]
    fn test_restore_with_unknown_size_uses_fallback() {
        let p = Pagination::new(0, 7, NARROW_ROWS_PER_PAGE);
        assert_eq!(p.current_page(), 1);
        assert_eq!(p.rows_per_page(), NARROW_ROWS_PER_PAGE);

        let p = Pagination::new(1, 7, 3);
        assert_eq!(p.rows_per_page(), DEFAULT_ROWS_PER_PAGE);
    }
}
