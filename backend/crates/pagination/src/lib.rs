//! Page-number pagination primitives.
//!
//! Endpoints in this workspace page through result sets with a zero-based
//! page index and a fixed page size. This crate keeps the three moving parts
//! apart:
//!
//! - [`PageIndex`] parses the caller's `page` parameter leniently.
//! - [`PageSize`] and [`PageWindow`] turn an index into `LIMIT`/`OFFSET`
//!   values suitable for a query builder.
//! - [`Page`] is the serialisable envelope returned to clients, carrying the
//!   total match count alongside the requested slice.
//!
//! # Examples
//! ```
//! use pagination::{Page, PageIndex, PageSize};
//!
//! let size = PageSize::new(50).expect("valid page size");
//! let index = PageIndex::parse_lenient(Some("2"));
//! let window = size.window(index);
//! assert_eq!(window.limit(), 50);
//! assert_eq!(window.offset(), 100);
//!
//! let page = Page::new(index, size, 120, vec!["a"; 20]);
//! assert_eq!(page.total_results(), 120);
//! ```

mod envelope;
mod index;
mod window;

pub use envelope::Page;
pub use index::PageIndex;
pub use window::{MAX_PAGE_SIZE, PageSize, PageSizeError, PageWindow};
