//! Listing pagination

use rustc_hash::FxHashMap;

use crate::catalog::Segment;

/// Catalog entries shown per listing page.
pub const PRODUCTS_PER_PAGE: usize = 12;

/// Per-segment current page numbers (1-based). Each segment paginates
/// independently.
#[derive(Debug, Clone)]
pub struct Pagination {
    pages: FxHashMap<Segment, usize>,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            pages: Segment::ALL.into_iter().map(|s| (s, 1)).collect(),
        }
    }
}

impl Pagination {
    /// The current page for a segment.
    #[must_use]
    pub fn page(&self, segment: Segment) -> usize {
        self.pages.get(&segment).copied().unwrap_or(1)
    }

    /// Sets a segment's current page.
    pub fn set_page(&mut self, segment: Segment, page: usize) {
        self.pages.insert(segment, page.max(1));
    }

    /// Sets a page by URL slug; unknown keys are ignored, never an error.
    pub fn set_page_for_slug(&mut self, slug: &str, page: usize) {
        if let Some(segment) = Segment::from_slug(slug) {
            self.set_page(segment, page);
        }
    }

    /// Resets a segment back to its first page (filter changes do this).
    pub fn reset(&mut self, segment: Segment) {
        self.set_page(segment, 1);
    }
}

/// One page cut from a larger list.
#[derive(Debug, PartialEq, Eq)]
pub struct PageSlice<'a, T> {
    /// The entries on this page; empty past the end of the list.
    pub items: &'a [T],
    /// The requested page number.
    pub page: usize,
    /// Total number of pages (at least 1).
    pub total_pages: usize,
    /// Total entries across all pages.
    pub total_items: usize,
}

/// Cuts the `page`-th page of [`PRODUCTS_PER_PAGE`] entries from a list.
#[must_use]
pub fn paginate<T>(items: &[T], page: usize) -> PageSlice<'_, T> {
    let page = page.max(1);
    let start = (page - 1) * PRODUCTS_PER_PAGE;
    let end = (start + PRODUCTS_PER_PAGE).min(items.len());
    let slice = items.get(start.min(items.len())..end).unwrap_or(&[]);

    PageSlice {
        items: slice,
        page,
        total_pages: items.len().div_ceil(PRODUCTS_PER_PAGE).max(1),
        total_items: items.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_start_on_page_one() {
        let pagination = Pagination::default();

        assert_eq!(pagination.page(Segment::CarWash), 1);
        assert_eq!(pagination.page(Segment::TyreReplacement), 1);
    }

    #[test]
    fn pages_are_independent_per_segment() {
        let mut pagination = Pagination::default();

        pagination.set_page(Segment::CarWash, 3);

        assert_eq!(pagination.page(Segment::CarWash), 3);
        assert_eq!(pagination.page(Segment::CarCare), 1);
    }

    #[test]
    fn unknown_slug_is_a_no_op() {
        let mut pagination = Pagination::default();

        pagination.set_page_for_slug("scooter-wash", 7);

        for segment in Segment::ALL {
            assert_eq!(pagination.page(segment), 1);
        }
    }

    #[test]
    fn known_slug_sets_the_matching_segment() {
        let mut pagination = Pagination::default();

        pagination.set_page_for_slug("tyre-replacement", 2);

        assert_eq!(pagination.page(Segment::TyreReplacement), 2);
    }

    #[test]
    fn paginate_cuts_twelve_per_page() {
        let items: Vec<usize> = (0..30).collect();

        let first = paginate(&items, 1);
        assert_eq!(first.items.len(), PRODUCTS_PER_PAGE);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.total_items, 30);

        let last = paginate(&items, 3);
        assert_eq!(last.items, &[24, 25, 26, 27, 28, 29]);
    }

    #[test]
    fn paginate_past_the_end_is_empty_not_panicking() {
        let items: Vec<usize> = (0..5).collect();

        let page = paginate(&items, 4);

        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn empty_list_still_reports_one_page() {
        let items: Vec<usize> = Vec::new();

        assert_eq!(paginate(&items, 1).total_pages, 1);
    }
}
