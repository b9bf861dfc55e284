//! Driven port for media metadata rows.

use async_trait::async_trait;
use pagination::PageWindow;

use crate::domain::{MediaId, MediaPredicate, MediaRecord, NewMediaRecord};

use super::define_port_error;

define_port_error! {
    /// Failures raised by media repository adapters.
    pub enum MediaRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "media repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "media repository query failed: {message}",
        /// The row targeted by an update does not exist.
        Missing { id: i64 } => "media record {id} does not exist",
    }
}

/// Persistence for [`MediaRecord`] rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaRepository: Send + Sync {
    /// Insert a record with an empty reference, returning the stored row.
    async fn insert(&self, record: &NewMediaRecord) -> Result<MediaRecord, MediaRepositoryError>;

    /// Store the public reference of a freshly inserted row.
    async fn update_reference(
        &self,
        id: MediaId,
        reference: &str,
    ) -> Result<(), MediaRepositoryError>;

    /// Overwrite title and shareable flag, returning the row as stored.
    ///
    /// The reference column is never written here.
    async fn update_metadata(
        &self,
        id: MediaId,
        title: &str,
        shareable: bool,
    ) -> Result<MediaRecord, MediaRepositoryError>;

    /// Remove a row. Removing a missing id is not an error.
    async fn delete(&self, id: MediaId) -> Result<(), MediaRepositoryError>;

    /// Fetch a row by id.
    async fn find_by_id(&self, id: MediaId) -> Result<Option<MediaRecord>, MediaRepositoryError>;

    /// Number of rows matching `predicate`, ignoring pagination.
    async fn count(&self, predicate: &MediaPredicate) -> Result<u64, MediaRepositoryError>;

    /// Rows matching `predicate` inside `window`, ordered by id.
    async fn select(
        &self,
        predicate: &MediaPredicate,
        window: PageWindow,
    ) -> Result<Vec<MediaRecord>, MediaRepositoryError>;
}
