use serde::Serialize;

/// Stories are paged six at a time everywhere they are listed.
pub const PER_PAGE: i64 = 6;

/// Offset for a 1-based page number; pages below 1 are clamped.
pub fn offset_for(page: i64) -> i64 {
    (page.max(1) - 1) * PER_PAGE
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_next: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: i64, total: i64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + PER_PAGE - 1) / PER_PAGE
        };
        Self {
            items,
            page,
            per_page: PER_PAGE,
            total,
            total_pages,
            has_next: page < total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_clamps_to_first_page() {
        assert_eq!(offset_for(1), 0);
        assert_eq!(offset_for(0), 0);
        assert_eq!(offset_for(-3), 0);
        assert_eq!(offset_for(3), 12);
    }

    #[test]
    fn total_pages_and_has_next() {
        let page = Page::new(vec![1, 2, 3, 4, 5, 6], 1, 13);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next);

        let page = Page::new(vec![13], 3, 13);
        assert!(!page.has_next);

        let empty: Page<i32> = Page::new(vec![], 1, 0);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next);
    }

    #[test]
    fn exact_multiple_has_no_phantom_page() {
        let page = Page::new(vec![(); 6], 2, 12);
        assert_eq!(page.total_pages, 2);
        assert!(!page.has_next);
    }
}
