//! Page requests for the metadata and distinct-value providers.
//!
//! Pages are 1-indexed, matching the filter UI's dropdown paging.
//!
//! ```rust
//! use tessera_query::Page;
//!
//! let page_3 = Page::new(3, 25);
//! assert_eq!(page_3.offset(), 50);
//! assert_eq!(page_3.next(), Page::new(4, 25));
//! ```

use serde::{Deserialize, Serialize};

/// Default number of entries per page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// One page of a paginated listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Page number, starting at 1.
    pub page: u32,
    /// Entries per page.
    pub page_size: u32,
}

impl Page {
    /// Create a page request. Page 0 is treated as page 1.
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size,
        }
    }

    /// The first page.
    pub fn first(page_size: u32) -> Self {
        Self::new(1, page_size)
    }

    /// The page after this one.
    #[must_use]
    pub fn next(&self) -> Self {
        Self::new(self.page.saturating_add(1), self.page_size)
    }

    /// Number of entries before this page.
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize).saturating_mul(self.page_size as usize)
    }

    /// Apply this page to an in-memory listing.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.offset().min(items.len());
        let end = start.saturating_add(self.page_size as usize).min(items.len());
        &items[start..end]
    }

    /// Whether a page holding `len` entries is the last one.
    pub fn is_last(&self, len: usize) -> bool {
        len < self.page_size as usize
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_SIZE)
    }
}
