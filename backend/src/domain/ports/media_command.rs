//! Driving port for media mutations.

use async_trait::async_trait;

use crate::domain::{AccountId, Error, MediaLocator, MediaPatch, MediaRecord};

/// Raw upload as received from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub owner: AccountId,
    pub bytes: Vec<u8>,
    /// Explicit `title` form field.
    pub title: Option<String>,
    /// File name of the uploaded part, used when no title is given.
    pub file_name: Option<String>,
    pub shareable: bool,
}

/// Create, modify, and remove media records together with their bytes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaCommand: Send + Sync {
    /// Store a new record and its bytes.
    async fn upload(&self, request: UploadRequest) -> Result<MediaRecord, Error>;

    /// Apply `patch` to a record owned by `caller`.
    async fn update(
        &self,
        caller: AccountId,
        locator: MediaLocator,
        patch: MediaPatch,
    ) -> Result<MediaRecord, Error>;

    /// Remove a record owned by `caller`, then its bytes.
    async fn delete(&self, caller: AccountId, locator: MediaLocator) -> Result<(), Error>;
}
