//! Fixed-size pagination.

/// One page of a larger result list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number actually served.
    pub page: usize,
    pub page_size: usize,
    /// Items across all pages.
    pub total_items: usize,
    /// `ceil(total_items / page_size)`; zero for an empty list.
    pub total_pages: usize,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// Slice out page `page` (1-based) of `items`.
///
/// Page 0 is treated as page 1. Pages past the end are empty. A zero
/// `page_size` is treated as 1.
#[must_use]
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size);

    let start = (page - 1).saturating_mul(page_size);
    let page_items = items
        .iter()
        .skip(start)
        .take(page_size)
        .cloned()
        .collect();

    Page {
        items: page_items,
        page,
        page_size,
        total_items,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twenty_five_by_twelve() {
        let items: Vec<u32> = (0..25).collect();

        let first = paginate(&items, 1, 12);
        assert_eq!(first.items.len(), 12);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.total_items, 25);
        assert!(first.has_next());
        assert!(!first.has_previous());

        let last = paginate(&items, 3, 12);
        assert_eq!(last.items, vec![24]);
        assert!(!last.has_next());
        assert!(last.has_previous());
    }

    #[test]
    fn test_edges() {
        let items: Vec<u32> = (0..5).collect();

        assert_eq!(paginate(&items, 0, 2), paginate(&items, 1, 2));
        assert!(paginate(&items, 9, 2).items.is_empty());
        assert_eq!(paginate(&items, 1, 0).items, vec![0]);

        let empty = paginate::<u32>(&[], 1, 12);
        assert_eq!(empty.total_pages, 0);
        assert!(empty.items.is_empty());
        assert!(!empty.has_next());
    }
}
