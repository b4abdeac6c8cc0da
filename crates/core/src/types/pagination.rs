//! Paged list results and requests.

use serde::{Deserialize, Serialize};

/// One page of a server-side paginated list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total: u64,
    pub limit: u32,
}

impl<T> Page<T> {
    /// An empty first page.
    #[must_use]
    pub const fn empty(limit: u32) -> Self {
        Self {
            items: Vec::new(),
            current_page: 1,
            total_pages: 0,
            total: 0,
            limit,
        }
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    /// Map the items, keeping the pagination metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            current_page: self.current_page,
            total_pages: self.total_pages,
            total: self.total,
            limit: self.limit,
        }
    }
}

/// Page number and size. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    #[must_use]
    pub const fn new(page: u32, limit: u32) -> Self {
        Self {
            page: if page == 0 { 1 } else { page },
            limit: if limit == 0 { 1 } else { limit },
        }
    }

    /// First page with the given size.
    #[must_use]
    pub const fn first(limit: u32) -> Self {
        Self::new(1, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_navigation_flags() {
        let page = Page {
            items: vec![1, 2],
            current_page: 2,
            total_pages: 3,
            total: 6,
            limit: 2,
        };
        assert!(page.has_next());
        assert!(page.has_previous());
        assert!(!Page::<u8>::empty(10).has_next());
    }

    #[test]
    fn test_page_request_floors_at_one() {
        assert_eq!(PageRequest::new(0, 0), PageRequest { page: 1, limit: 1 });
    }
}
