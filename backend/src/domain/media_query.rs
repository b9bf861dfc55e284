//! Permission-scoped media search and content reads.
//!
//! A search compiles the caller's optional filters and identity into a
//! [`MediaPredicate`]. The repository evaluates the predicate twice: once
//! unpaginated for the total, once for the requested window.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use pagination::{Page, PageIndex, PageSize};
use tracing::{debug, error};

use super::ports::{BlobStore, MediaQuery, MediaRepository, MediaRepositoryError};
use super::{
    AccessPolicy, AccountId, Error, MediaContent, MediaId, MediaLocator, MediaRecord,
};

/// Fixed number of records per result page.
pub const MEDIA_PAGE_SIZE: PageSize = match PageSize::new(50) {
    Ok(size) => size,
    Err(_) => panic!("media page size out of range"),
};

/// Optional equality filters supplied by the caller.
///
/// A present but empty `title` or `encoding` filters on the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaFilters {
    pub id: Option<MediaId>,
    pub owner: Option<AccountId>,
    pub title: Option<String>,
    pub encoding: Option<String>,
    pub shareable: Option<bool>,
}

impl MediaFilters {
    /// Read filters from query parameters.
    ///
    /// Recognised keys are `id`, `uid`, `title`, `encoding`, and
    /// `shareable`. Other keys, `page` included, are ignored.
    ///
    /// # Errors
    /// Returns an invalid-request error when `id`, `uid`, or `shareable`
    /// cannot be parsed.
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, Error> {
        let id = params
            .get("id")
            .map(|raw| {
                raw.parse::<MediaId>()
                    .map_err(|_| Error::invalid_request("id must be an integer"))
            })
            .transpose()?;
        let owner = params
            .get("uid")
            .map(|raw| {
                raw.parse::<AccountId>()
                    .map_err(|_| Error::invalid_request("uid must be an integer"))
            })
            .transpose()?;
        let shareable = params
            .get("shareable")
            .map(|raw| parse_flag(raw))
            .transpose()?;

        Ok(Self {
            id,
            owner,
            title: params.get("title").cloned(),
            encoding: params.get("encoding").cloned(),
            shareable,
        })
    }

    /// No filter was supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.owner.is_none()
            && self.title.is_none()
            && self.encoding.is_none()
            && self.shareable.is_none()
    }
}

fn parse_flag(raw: &str) -> Result<bool, Error> {
    match raw.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(Error::invalid_request("shareable must be true or false")),
    }
}

/// Mandatory visibility clause derived from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Only the caller's own records.
    OwnedBy(AccountId),
    /// The caller's records plus anything shareable.
    OwnedOrShareable(AccountId),
}

impl Visibility {
    /// Whether `record` passes this clause.
    #[must_use]
    pub fn admits(self, record: &MediaRecord) -> bool {
        match self {
            Self::OwnedBy(caller) => record.owner == caller,
            Self::OwnedOrShareable(caller) => AccessPolicy::can_read(caller, record),
        }
    }
}

/// Filters conjoined with a visibility clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPredicate {
    pub filters: MediaFilters,
    pub visibility: Visibility,
}

impl MediaPredicate {
    /// Scope `filters` to what `caller` may see.
    ///
    /// With no filters the search means "my library" and is narrowed to the
    /// caller's own records.
    ///
    /// # Examples
    /// ```
    /// use pixbin::domain::{AccountId, MediaFilters, MediaPredicate, Visibility};
    ///
    /// let caller = AccountId::new(4);
    /// let predicate = MediaPredicate::compile(caller, MediaFilters::default());
    /// assert_eq!(predicate.visibility, Visibility::OwnedBy(caller));
    /// ```
    #[must_use]
    pub fn compile(caller: AccountId, filters: MediaFilters) -> Self {
        let visibility = if filters.is_empty() {
            Visibility::OwnedBy(caller)
        } else {
            Visibility::OwnedOrShareable(caller)
        };
        Self {
            filters,
            visibility,
        }
    }

    /// Evaluate the predicate in memory.
    #[must_use]
    pub fn matches(&self, record: &MediaRecord) -> bool {
        let filters = &self.filters;
        self.visibility.admits(record)
            && filters.id.is_none_or(|id| record.id == id)
            && filters.owner.is_none_or(|owner| record.owner == owner)
            && filters
                .title
                .as_deref()
                .is_none_or(|title| record.title == title)
            && filters
                .encoding
                .as_deref()
                .is_none_or(|encoding| record.media_type.mime() == encoding)
            && filters
                .shareable
                .is_none_or(|shareable| record.shareable == shareable)
    }
}

/// [`MediaQuery`] over a media repository and blob store.
#[derive(Clone)]
pub struct MediaQueryService<M, B> {
    media: Arc<M>,
    blobs: Arc<B>,
}

impl<M, B> MediaQueryService<M, B> {
    /// Create the service.
    pub fn new(media: Arc<M>, blobs: Arc<B>) -> Self {
        Self { media, blobs }
    }
}

impl<M, B> MediaQueryService<M, B>
where
    M: MediaRepository,
    B: BlobStore,
{
    fn map_repository_error(err: MediaRepositoryError) -> Error {
        error!(error = %err, "media repository failure");
        Error::internal(format!("media repository error: {err}"))
    }
}

#[async_trait]
impl<M, B> MediaQuery for MediaQueryService<M, B>
where
    M: MediaRepository,
    B: BlobStore,
{
    async fn search(
        &self,
        caller: AccountId,
        filters: MediaFilters,
        page: PageIndex,
    ) -> Result<Page<MediaRecord>, Error> {
        let predicate = MediaPredicate::compile(caller, filters);
        let total = self
            .media
            .count(&predicate)
            .await
            .map_err(Self::map_repository_error)?;
        let window = MEDIA_PAGE_SIZE.window(page);
        let items = self
            .media
            .select(&predicate, window)
            .await
            .map_err(Self::map_repository_error)?;
        debug!(
            caller = %caller,
            page = page.get(),
            total,
            returned = items.len(),
            "media search"
        );
        Ok(Page::new(page, MEDIA_PAGE_SIZE, total, items))
    }

    async fn fetch_content(
        &self,
        caller: AccountId,
        locator: MediaLocator,
    ) -> Result<MediaContent, Error> {
        let record = self
            .media
            .find_by_id(locator.id)
            .await
            .map_err(Self::map_repository_error)?
            .ok_or_else(|| Error::not_found("image not found"))?;
        AccessPolicy::ensure_locator_matches(&locator, &record)?;
        AccessPolicy::authorize_read(caller, &record)?;

        let bytes = self.blobs.read(&record.blob_key()).await.map_err(|err| {
            error!(media_id = %record.id, owner_id = %record.owner, error = %err, "blob read failed");
            Error::internal(format!("failed to read image bytes: {err}"))
        })?;
        Ok(MediaContent {
            media_type: record.media_type,
            bytes,
        })
    }
}

#[cfg(test)]
#[path = "media_query_tests.rs"]
mod tests;
