//! Upload, update, and deletion of media records and their bytes.
//!
//! Metadata and bytes live in two stores with no shared transaction. Uploads
//! therefore run as a fixed sequence of [`UploadStep`]s. Each step may
//! register an [`Undo`]; when a later step fails, registered undos run in
//! reverse order before the error is returned. Undos are best effort and
//! never replace the original error.
//!
//! Deletion removes the row first and the bytes second. A failed blob delete
//! leaves an orphaned file, which is logged and otherwise ignored.

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use super::ports::{BlobStore, MediaCommand, MediaRepository, MediaRepositoryError, UploadRequest};
use super::{
    AccessPolicy, AccountId, Error, MediaId, MediaLocator, MediaPatch, MediaRecord, MediaType,
    NewMediaRecord, ReferenceBase, normalise_title,
};

/// Upload stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStep {
    /// Classify the content from its leading bytes.
    Sniff,
    /// Insert the row with an empty reference to obtain an id.
    Insert,
    /// Derive the reference from owner, id, and detected extension.
    ComputeReference,
    /// Store the reference on the row.
    PersistReference,
    /// Write the bytes to the blob store.
    WriteBlob,
}

impl UploadStep {
    /// Every step, in the order they run.
    pub const ORDER: [Self; 5] = [
        Self::Sniff,
        Self::Insert,
        Self::ComputeReference,
        Self::PersistReference,
        Self::WriteBlob,
    ];

    /// Compensation owed once this step has succeeded.
    #[must_use]
    pub const fn undo(self) -> Option<Undo> {
        match self {
            Self::Insert => Some(Undo::DeleteRecord),
            Self::Sniff | Self::ComputeReference | Self::PersistReference | Self::WriteBlob => None,
        }
    }
}

/// Compensating actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Undo {
    /// Remove the inserted metadata row.
    DeleteRecord,
}

/// Completed steps of one upload, with what is needed to undo them.
struct UploadJournal {
    owner: AccountId,
    completed: Vec<UploadStep>,
    record: Option<MediaId>,
}

impl UploadJournal {
    fn new(owner: AccountId) -> Self {
        Self {
            owner,
            completed: Vec::with_capacity(UploadStep::ORDER.len()),
            record: None,
        }
    }

    fn complete(&mut self, step: UploadStep) {
        self.completed.push(step);
    }
}

/// [`MediaCommand`] over a media repository and blob store.
#[derive(Clone)]
pub struct IngestionCoordinator<M, B> {
    media: Arc<M>,
    blobs: Arc<B>,
    references: ReferenceBase,
}

impl<M, B> IngestionCoordinator<M, B> {
    /// Create a coordinator that publishes references under `references`.
    pub fn new(media: Arc<M>, blobs: Arc<B>, references: ReferenceBase) -> Self {
        Self {
            media,
            blobs,
            references,
        }
    }
}

impl<M, B> IngestionCoordinator<M, B>
where
    M: MediaRepository,
    B: BlobStore,
{
    fn map_repository_error(err: MediaRepositoryError) -> Error {
        error!(error = %err, "media repository failure");
        Error::internal(format!("media repository error: {err}"))
    }

    fn detect(bytes: &[u8]) -> Result<MediaType, Error> {
        MediaType::sniff(&mut Cursor::new(bytes))
            .map_err(|err| Error::internal(format!("failed to inspect upload: {err}")))?
            .ok_or_else(|| {
                Error::invalid_request("unsupported media type; upload a PNG or JPEG image")
            })
    }

    fn title_for(request: &UploadRequest, media_type: MediaType) -> String {
        let raw = request
            .title
            .as_deref()
            .filter(|title| !title.trim().is_empty())
            .or(request.file_name.as_deref())
            .unwrap_or_default();
        normalise_title(raw, media_type)
    }

    /// Run registered undos in reverse and return `cause`.
    async fn abort(&self, journal: UploadJournal, failed: UploadStep, cause: Error) -> Error {
        warn!(
            owner_id = %journal.owner,
            step = ?failed,
            error = %cause,
            "upload failed; compensating"
        );
        for step in journal.completed.iter().rev() {
            match (step.undo(), journal.record) {
                (Some(Undo::DeleteRecord), Some(id)) => {
                    if let Err(err) = self.media.delete(id).await {
                        error!(
                            media_id = %id,
                            owner_id = %journal.owner,
                            error = %err,
                            "failed to remove row of aborted upload"
                        );
                    }
                }
                (Some(Undo::DeleteRecord), None) | (None, _) => {}
            }
        }
        cause
    }

    async fn load_for_write(
        &self,
        caller: AccountId,
        locator: MediaLocator,
    ) -> Result<MediaRecord, Error> {
        let record = self
            .media
            .find_by_id(locator.id)
            .await
            .map_err(Self::map_repository_error)?
            .ok_or_else(|| Error::not_found("image not found"))?;
        AccessPolicy::ensure_locator_matches(&locator, &record)?;
        AccessPolicy::authorize_write(caller, &record)?;
        Ok(record)
    }
}

#[async_trait]
impl<M, B> MediaCommand for IngestionCoordinator<M, B>
where
    M: MediaRepository,
    B: BlobStore,
{
    async fn upload(&self, request: UploadRequest) -> Result<MediaRecord, Error> {
        let mut journal = UploadJournal::new(request.owner);

        let media_type = Self::detect(&request.bytes)?;
        journal.complete(UploadStep::Sniff);

        let new_record = NewMediaRecord {
            owner: request.owner,
            title: Self::title_for(&request, media_type),
            size: u64::try_from(request.bytes.len()).unwrap_or(u64::MAX),
            media_type,
            shareable: request.shareable,
        };
        let mut record = self
            .media
            .insert(&new_record)
            .await
            .map_err(Self::map_repository_error)?;
        journal.record = Some(record.id);
        journal.complete(UploadStep::Insert);

        let key = record.blob_key();
        record.reference = self.references.reference_for(&key);
        journal.complete(UploadStep::ComputeReference);

        if let Err(err) = self.media.update_reference(record.id, &record.reference).await {
            let cause = Self::map_repository_error(err);
            return Err(self.abort(journal, UploadStep::PersistReference, cause).await);
        }
        journal.complete(UploadStep::PersistReference);

        if let Err(err) = self.blobs.write(&key, &request.bytes).await {
            error!(media_id = %record.id, error = %err, "blob write failed");
            let cause = Error::internal(format!("failed to store image bytes: {err}"));
            return Err(self.abort(journal, UploadStep::WriteBlob, cause).await);
        }
        journal.complete(UploadStep::WriteBlob);

        info!(
            media_id = %record.id,
            owner_id = %record.owner,
            encoding = record.media_type.mime(),
            size = record.size,
            "image stored"
        );
        Ok(record)
    }

    async fn update(
        &self,
        caller: AccountId,
        locator: MediaLocator,
        patch: MediaPatch,
    ) -> Result<MediaRecord, Error> {
        let mut record = self.load_for_write(caller, locator).await?;
        patch.apply(&mut record);
        self.media
            .update_metadata(record.id, &record.title, record.shareable)
            .await
            .map_err(Self::map_repository_error)
    }

    async fn delete(&self, caller: AccountId, locator: MediaLocator) -> Result<(), Error> {
        let record = self.load_for_write(caller, locator).await?;
        self.media
            .delete(record.id)
            .await
            .map_err(Self::map_repository_error)?;

        if let Err(err) = self.blobs.delete(&record.blob_key()).await {
            warn!(
                media_id = %record.id,
                owner_id = %record.owner,
                error = %err,
                "row deleted but blob removal failed; orphaned blob left behind"
            );
        }
        info!(media_id = %record.id, owner_id = %record.owner, "image deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "ingestion_tests.rs"]
mod tests;
