//! Page sizes and the `LIMIT`/`OFFSET` window derived from them.

use std::num::NonZeroU32;

use crate::PageIndex;

/// Largest page size accepted by [`PageSize::new`].
pub const MAX_PAGE_SIZE: u32 = 500;

/// Errors raised when constructing a [`PageSize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageSizeError {
    /// A page must hold at least one item.
    #[error("page size must be at least 1")]
    Zero,
    /// The page size exceeds [`MAX_PAGE_SIZE`].
    #[error("page size {requested} exceeds maximum of {max}")]
    TooLarge {
        /// Requested size.
        requested: u32,
        /// Upper bound.
        max: u32,
    },
}

/// Number of items per page.
///
/// ## Invariants
/// - `1 <= size <= MAX_PAGE_SIZE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageSize(NonZeroU32);

impl PageSize {
    /// Validate and wrap a page size.
    ///
    /// # Errors
    /// Returns [`PageSizeError`] when `size` is zero or above
    /// [`MAX_PAGE_SIZE`].
    pub const fn new(size: u32) -> Result<Self, PageSizeError> {
        if size > MAX_PAGE_SIZE {
            return Err(PageSizeError::TooLarge {
                requested: size,
                max: MAX_PAGE_SIZE,
            });
        }
        match NonZeroU32::new(size) {
            Some(size) => Ok(Self(size)),
            None => Err(PageSizeError::Zero),
        }
    }

    /// Numeric size value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Window selecting the rows of `index`.
    #[must_use]
    pub fn window(self, index: PageIndex) -> PageWindow {
        PageWindow {
            limit: i64::from(self.get()),
            offset: i64::from(index.get()) * i64::from(self.get()),
        }
    }
}

/// `LIMIT`/`OFFSET` pair for a single page.
///
/// Values are `i64` because SQL `BIGINT` is what Diesel binds for both
/// clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    limit: i64,
    offset: i64,
}

impl PageWindow {
    /// Maximum number of rows to return.
    #[must_use]
    pub const fn limit(self) -> i64 {
        self.limit
    }

    /// Number of rows to skip.
    #[must_use]
    pub const fn offset(self) -> i64 {
        self.offset
    }

    /// Convert the window into `usize` bounds for slicing in-memory data.
    ///
    /// Returns `None` when the offset does not fit the platform's `usize`.
    #[must_use]
    pub fn as_range_bounds(self) -> Option<(usize, usize)> {
        let offset = usize::try_from(self.offset).ok()?;
        let limit = usize::try_from(self.limit).ok()?;
        Some((offset, limit))
    }
}
