//! Serialisable page envelope.

use serde::{Deserialize, Serialize};

use crate::{PageIndex, PageSize};

/// One page of results plus the total number of matches.
///
/// `total_results` counts every row matching the query, independent of the
/// window used to select `items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    page: u32,
    page_size: u32,
    total_results: u64,
    items: Vec<T>,
}

impl<T> Page<T> {
    /// Assemble a page.
    #[must_use]
    pub const fn new(index: PageIndex, size: PageSize, total_results: u64, items: Vec<T>) -> Self {
        Self {
            page: index.get(),
            page_size: size.get(),
            total_results,
            items,
        }
    }

    /// Zero-based page index.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Configured page size.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Total number of matching rows across all pages.
    #[must_use]
    pub const fn total_results(&self) -> u64 {
        self.total_results
    }

    /// Items on this page.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consume the page, returning its items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Map every item, keeping the envelope fields.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            page: self.page,
            page_size: self.page_size,
            total_results: self.total_results,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}
