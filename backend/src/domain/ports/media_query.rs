//! Driving port for media reads.

use async_trait::async_trait;
use pagination::{Page, PageIndex};

use crate::domain::{AccountId, Error, MediaContent, MediaFilters, MediaLocator, MediaRecord};

/// Read-side access to media records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaQuery: Send + Sync {
    /// Records visible to `caller` that match `filters`, one page at a time.
    async fn search(
        &self,
        caller: AccountId,
        filters: MediaFilters,
        page: PageIndex,
    ) -> Result<Page<MediaRecord>, Error>;

    /// Bytes of a record `caller` may read.
    async fn fetch_content(
        &self,
        caller: AccountId,
        locator: MediaLocator,
    ) -> Result<MediaContent, Error>;
}
