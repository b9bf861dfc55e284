//! Tests for the upload step machine, updates, and deletion.

use std::sync::Arc;

use pagination::PageWindow;

use super::*;
use crate::domain::ports::{BlobStoreError, MockBlobStore, MockMediaRepository};
use crate::domain::{ErrorCode, MediaPredicate};
use crate::test_support::{
    BlobOp, InMemoryBlobStore, InMemoryMediaRepository, MediaOp,
};
use rstest::{fixture, rstest};

const OWNER: AccountId = AccountId::new(3);
const STRANGER: AccountId = AccountId::new(4);

struct Harness {
    media: Arc<InMemoryMediaRepository>,
    blobs: Arc<InMemoryBlobStore>,
    coordinator: IngestionCoordinator<InMemoryMediaRepository, InMemoryBlobStore>,
}

#[fixture]
fn harness() -> Harness {
    let media = Arc::new(InMemoryMediaRepository::default());
    let blobs = Arc::new(InMemoryBlobStore::default());
    let coordinator = IngestionCoordinator::new(
        media.clone(),
        blobs.clone(),
        ReferenceBase::new("localhost:8000", "image"),
    );
    Harness {
        media,
        blobs,
        coordinator,
    }
}

fn png(len: usize) -> Vec<u8> {
    let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
    bytes.resize(len, 7);
    bytes
}

fn upload(bytes: Vec<u8>, title: Option<&str>, shareable: bool) -> UploadRequest {
    UploadRequest {
        owner: OWNER,
        bytes,
        title: title.map(str::to_owned),
        file_name: None,
        shareable,
    }
}

fn locator(record: &MediaRecord) -> MediaLocator {
    MediaLocator::new(record.owner, record.id)
}

#[test]
fn only_insert_registers_an_undo() {
    let undos: Vec<_> = UploadStep::ORDER.iter().map(|step| step.undo()).collect();
    assert_eq!(
        undos,
        vec![None, Some(Undo::DeleteRecord), None, None, None]
    );
}

#[rstest]
#[tokio::test]
async fn upload_stores_row_and_bytes(harness: Harness) {
    let bytes = png(10);
    let record = harness
        .coordinator
        .upload(upload(bytes.clone(), Some("a.bin"), true))
        .await
        .expect("upload");

    assert_eq!(record.media_type, MediaType::Png);
    assert_eq!(record.title, "a.png");
    assert_eq!(record.size, 10);
    assert!(record.shareable);
    assert_eq!(
        record.reference,
        format!("localhost:8000/image/{}/{}.png", OWNER, record.id)
    );
    assert_eq!(harness.media.records(), vec![record.clone()]);
    assert_eq!(harness.blobs.get(&record.blob_key()), Some(bytes));
}

#[rstest]
#[tokio::test]
async fn file_name_is_used_without_title(harness: Harness) {
    let mut request = upload(vec![0xff, 0xd8, 0xff, 0xe0, 1, 2], None, false);
    request.file_name = Some("holiday.jpg".to_owned());

    let record = harness.coordinator.upload(request).await.expect("upload");
    assert_eq!(record.title, "holiday.jpeg");
    assert!(!record.shareable);
}

#[rstest]
#[tokio::test]
async fn unsupported_content_touches_nothing(harness: Harness) {
    let error = harness
        .coordinator
        .upload(upload(b"GIF89a-not-allowed".to_vec(), Some("x.png"), false))
        .await
        .expect_err("gif rejected");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert!(harness.media.records().is_empty());
    assert!(harness.blobs.is_empty());
}

#[rstest]
#[tokio::test]
async fn failed_reference_update_removes_the_row(harness: Harness) {
    harness
        .coordinator
        .upload(upload(png(16), Some("kept"), false))
        .await
        .expect("first upload");
    let before = harness.media.count_owned_by(OWNER);

    harness.media.fail_on(MediaOp::UpdateReference);
    let error = harness
        .coordinator
        .upload(upload(png(16), Some("lost"), false))
        .await
        .expect_err("update fails");

    assert_eq!(error.code(), ErrorCode::InternalError);
    assert_eq!(harness.media.count_owned_by(OWNER), before);
    assert_eq!(harness.blobs.len(), 1);
}

#[rstest]
#[tokio::test]
async fn failed_blob_write_removes_the_row(harness: Harness) {
    harness.blobs.fail_on(BlobOp::Write);
    let error = harness
        .coordinator
        .upload(upload(png(16), None, true))
        .await
        .expect_err("write fails");

    assert_eq!(error.code(), ErrorCode::InternalError);
    assert!(harness.media.records().is_empty());
}

#[tokio::test]
async fn failed_insert_runs_no_undo() {
    let mut media = MockMediaRepository::new();
    media
        .expect_insert()
        .times(1)
        .return_once(|_| Err(MediaRepositoryError::connection("down")));
    media.expect_delete().never();
    let mut blobs = MockBlobStore::new();
    blobs.expect_write().never();
    let coordinator = IngestionCoordinator::new(
        Arc::new(media),
        Arc::new(blobs),
        ReferenceBase::new("localhost:8000", "image"),
    );

    let error = coordinator
        .upload(upload(png(12), None, false))
        .await
        .expect_err("insert fails");
    assert_eq!(error.code(), ErrorCode::InternalError);
}

#[tokio::test]
async fn failed_undo_keeps_original_error() {
    let mut media = MockMediaRepository::new();
    media.expect_insert().times(1).return_once(|new| Ok(new.clone().into_record(MediaId::new(9))));
    media
        .expect_update_reference()
        .times(1)
        .return_once(|_, _| Err(MediaRepositoryError::query("update rejected")));
    media
        .expect_delete()
        .withf(|id| *id == MediaId::new(9))
        .times(1)
        .return_once(|_| Err(MediaRepositoryError::query("delete rejected")));
    let coordinator = IngestionCoordinator::new(
        Arc::new(media),
        Arc::new(MockBlobStore::new()),
        ReferenceBase::new("localhost:8000", "image"),
    );

    let error = coordinator
        .upload(upload(png(12), None, false))
        .await
        .expect_err("update fails");
    assert_eq!(error.code(), ErrorCode::InternalError);
    assert!(error.message().contains("update rejected"));
}

#[rstest]
#[tokio::test]
async fn delete_removes_row_then_blob(harness: Harness) {
    let record = harness
        .coordinator
        .upload(upload(png(10), None, false))
        .await
        .expect("upload");

    harness
        .coordinator
        .delete(OWNER, locator(&record))
        .await
        .expect("delete");

    assert!(harness.media.records().is_empty());
    assert!(harness.blobs.is_empty());
}

#[rstest]
#[tokio::test]
async fn blob_delete_failure_still_succeeds(harness: Harness) {
    let record = harness
        .coordinator
        .upload(upload(png(10), None, false))
        .await
        .expect("upload");
    harness.blobs.fail_on(BlobOp::Delete);

    harness
        .coordinator
        .delete(OWNER, locator(&record))
        .await
        .expect("row removal decides the outcome");

    assert!(harness.media.records().is_empty());
    assert_eq!(harness.blobs.len(), 1);
}

#[tokio::test]
async fn delete_is_row_first() {
    let stored = NewMediaRecord {
        owner: OWNER,
        title: "a.png".to_owned(),
        size: 1,
        media_type: MediaType::Png,
        shareable: false,
    }
    .into_record(MediaId::new(5));
    let mut sequence = mockall::Sequence::new();
    let mut media = MockMediaRepository::new();
    let found = stored.clone();
    media
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(found)));
    media
        .expect_delete()
        .times(1)
        .in_sequence(&mut sequence)
        .return_once(|_| Ok(()));
    let mut blobs = MockBlobStore::new();
    blobs
        .expect_delete()
        .times(1)
        .in_sequence(&mut sequence)
        .return_once(|key| Err(BlobStoreError::not_found(key.relative_path().display().to_string())));
    let coordinator = IngestionCoordinator::new(
        Arc::new(media),
        Arc::new(blobs),
        ReferenceBase::new("localhost:8000", "image"),
    );

    coordinator
        .delete(OWNER, locator(&stored))
        .await
        .expect("delete");
}

#[rstest]
#[tokio::test]
async fn shareable_record_cannot_be_deleted_by_stranger(harness: Harness) {
    let record = harness
        .coordinator
        .upload(upload(png(10), None, true))
        .await
        .expect("upload");

    let error = harness
        .coordinator
        .delete(STRANGER, locator(&record))
        .await
        .expect_err("stranger");
    assert_eq!(error.code(), ErrorCode::Unauthorized);
    assert_eq!(harness.media.records().len(), 1);
}

#[rstest]
#[case(MediaLocator::new(STRANGER, MediaId::new(1)), ErrorCode::InvalidRequest)]
#[case(MediaLocator::new(OWNER, MediaId::new(99)), ErrorCode::NotFound)]
#[tokio::test]
async fn delete_checks_path_before_permission(
    harness: Harness,
    #[case] target: MediaLocator,
    #[case] expected: ErrorCode,
) {
    harness
        .coordinator
        .upload(upload(png(10), None, false))
        .await
        .expect("upload");

    let error = harness
        .coordinator
        .delete(OWNER, target)
        .await
        .expect_err("rejected");
    assert_eq!(error.code(), expected);
}

#[rstest]
#[tokio::test]
async fn update_applies_partial_patch(harness: Harness) {
    let record = harness
        .coordinator
        .upload(upload(png(10), Some("first"), false))
        .await
        .expect("upload");

    let updated = harness
        .coordinator
        .update(
            OWNER,
            locator(&record),
            MediaPatch {
                title: Some("second.gif".to_owned()),
                shareable: None,
            },
        )
        .await
        .expect("update");

    assert_eq!(updated.title, "second.png");
    assert!(!updated.shareable);
    assert_eq!(updated.reference, record.reference);
    assert_eq!(harness.media.records(), vec![updated]);
}

#[rstest]
#[tokio::test]
async fn update_by_stranger_is_unauthorized(harness: Harness) {
    let record = harness
        .coordinator
        .upload(upload(png(10), None, true))
        .await
        .expect("upload");

    let error = harness
        .coordinator
        .update(
            STRANGER,
            MediaLocator::new(OWNER, record.id),
            MediaPatch {
                title: None,
                shareable: Some(false),
            },
        )
        .await
        .expect_err("stranger");
    assert_eq!(error.code(), ErrorCode::Unauthorized);
    assert!(harness.media.records()[0].shareable);
}

/// Repository whose reads race an in-flight upload: the row is read with its
/// empty reference, then the upload stores the real reference before the
/// caller writes anything back.
struct ReferenceLandsAfterRead {
    inner: InMemoryMediaRepository,
    reference: String,
}

#[async_trait]
impl MediaRepository for ReferenceLandsAfterRead {
    async fn insert(&self, record: &NewMediaRecord) -> Result<MediaRecord, MediaRepositoryError> {
        self.inner.insert(record).await
    }

    async fn update_reference(
        &self,
        id: MediaId,
        reference: &str,
    ) -> Result<(), MediaRepositoryError> {
        self.inner.update_reference(id, reference).await
    }

    async fn update_metadata(
        &self,
        id: MediaId,
        title: &str,
        shareable: bool,
    ) -> Result<MediaRecord, MediaRepositoryError> {
        self.inner.update_metadata(id, title, shareable).await
    }

    async fn delete(&self, id: MediaId) -> Result<(), MediaRepositoryError> {
        self.inner.delete(id).await
    }

    async fn find_by_id(&self, id: MediaId) -> Result<Option<MediaRecord>, MediaRepositoryError> {
        let snapshot = self.inner.find_by_id(id).await?;
        self.inner.update_reference(id, &self.reference).await?;
        Ok(snapshot)
    }

    async fn count(&self, predicate: &MediaPredicate) -> Result<u64, MediaRepositoryError> {
        self.inner.count(predicate).await
    }

    async fn select(
        &self,
        predicate: &MediaPredicate,
        window: PageWindow,
    ) -> Result<Vec<MediaRecord>, MediaRepositoryError> {
        self.inner.select(predicate, window).await
    }
}

#[tokio::test]
async fn metadata_update_keeps_reference_stored_mid_upload() {
    let inner = InMemoryMediaRepository::default();
    let pending = inner.seed(NewMediaRecord {
        owner: OWNER,
        title: "a.png".to_owned(),
        size: 10,
        media_type: MediaType::Png,
        shareable: false,
    });
    assert!(pending.reference.is_empty());
    let reference = format!("localhost:8000/image/{OWNER}/{}.png", pending.id);
    let media = Arc::new(ReferenceLandsAfterRead {
        inner,
        reference: reference.clone(),
    });
    let coordinator = IngestionCoordinator::new(
        media.clone(),
        Arc::new(InMemoryBlobStore::default()),
        ReferenceBase::new("localhost:8000", "image"),
    );

    let updated = coordinator
        .update(
            OWNER,
            locator(&pending),
            MediaPatch {
                title: Some("b".to_owned()),
                shareable: None,
            },
        )
        .await
        .expect("update");

    assert_eq!(updated.title, "b.png");
    assert_eq!(updated.reference, reference);
    assert_eq!(media.inner.records()[0].reference, reference);
}

#[tokio::test]
async fn update_writes_only_title_and_flag() {
    let stored = NewMediaRecord {
        owner: OWNER,
        title: "a.png".to_owned(),
        size: 1,
        media_type: MediaType::Png,
        shareable: false,
    }
    .into_record(MediaId::new(5));
    let mut media = MockMediaRepository::new();
    let found = stored.clone();
    media
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(found)));
    media.expect_update_reference().never();
    let written = stored.clone();
    media
        .expect_update_metadata()
        .withf(|id, title, shareable| *id == MediaId::new(5) && title.to_string() == "a.png" && *shareable)
        .times(1)
        .return_once(move |_, _, _| {
            Ok(MediaRecord {
                shareable: true,
                ..written
            })
        });
    let coordinator = IngestionCoordinator::new(
        Arc::new(media),
        Arc::new(MockBlobStore::new()),
        ReferenceBase::new("localhost:8000", "image"),
    );

    let updated = coordinator
        .update(
            OWNER,
            locator(&stored),
            MediaPatch {
                title: None,
                shareable: Some(true),
            },
        )
        .await
        .expect("update");
    assert!(updated.shareable);
}
