//! Ingestion over the real filesystem blob store.
//!
//! Records live in memory; bytes land under a temporary directory so the
//! on-disk layout `{ownerId}/{recordId}.{extension}` can be inspected.

use std::sync::Arc;

use pixbin::domain::ports::{MediaCommand, MediaQuery, UploadRequest};
use pixbin::domain::{
    AccountId, ErrorCode, IngestionCoordinator, MediaLocator, MediaQueryService, ReferenceBase,
};
use pixbin::outbound::blob::FilesystemBlobStore;
use pixbin::test_support::{
    InMemoryMediaRepository, JPEG_BYTES, MediaOp, PNG_BYTES, temp_blob_root,
};
use rstest::{fixture, rstest};
use tempfile::TempDir;

const OWNER: AccountId = AccountId::new(7);

struct Harness {
    root: TempDir,
    media: Arc<InMemoryMediaRepository>,
    blobs: Arc<FilesystemBlobStore>,
}

impl Harness {
    fn coordinator(&self) -> IngestionCoordinator<InMemoryMediaRepository, FilesystemBlobStore> {
        IngestionCoordinator::new(
            self.media.clone(),
            self.blobs.clone(),
            ReferenceBase::new("http://localhost:8000", "image"),
        )
    }

    fn query(&self) -> MediaQueryService<InMemoryMediaRepository, FilesystemBlobStore> {
        MediaQueryService::new(self.media.clone(), self.blobs.clone())
    }
}

#[fixture]
fn harness() -> Harness {
    let root = temp_blob_root().expect("temp dir");
    let blobs = FilesystemBlobStore::open(root.path()).expect("open blob root");
    Harness {
        root,
        media: Arc::default(),
        blobs: Arc::new(blobs),
    }
}

fn upload(bytes: &[u8], file_name: &str) -> UploadRequest {
    UploadRequest {
        owner: OWNER,
        bytes: bytes.to_vec(),
        title: None,
        file_name: Some(file_name.to_owned()),
        shareable: false,
    }
}

#[rstest]
#[tokio::test]
async fn upload_writes_bytes_under_owner_directory(harness: Harness) {
    let record = harness
        .coordinator()
        .upload(upload(PNG_BYTES, "sunset.png"))
        .await
        .expect("upload");

    let path = harness
        .root
        .path()
        .join(OWNER.to_string())
        .join(format!("{}.png", record.id));
    assert_eq!(std::fs::read(path).expect("blob on disk"), PNG_BYTES);
    assert_eq!(
        record.reference,
        format!("http://localhost:8000/image/{OWNER}/{}.png", record.id)
    );

    let content = harness
        .query()
        .fetch_content(
            OWNER,
            MediaLocator::new(OWNER, record.id),
        )
        .await
        .expect("read back");
    assert_eq!(content.bytes, PNG_BYTES);
}

#[rstest]
#[tokio::test]
async fn delete_removes_file(harness: Harness) {
    let coordinator = harness.coordinator();
    let record = coordinator
        .upload(upload(JPEG_BYTES, "cat.jpg"))
        .await
        .expect("upload");
    let path = harness
        .root
        .path()
        .join(OWNER.to_string())
        .join(format!("{}.jpeg", record.id));
    assert!(path.exists());

    coordinator
        .delete(
            OWNER,
            MediaLocator::new(OWNER, record.id),
        )
        .await
        .expect("delete");

    assert!(!path.exists());
    assert!(harness.media.records().is_empty());
}

#[rstest]
#[tokio::test]
async fn delete_succeeds_when_file_already_gone(harness: Harness) {
    let coordinator = harness.coordinator();
    let record = coordinator
        .upload(upload(PNG_BYTES, "a.png"))
        .await
        .expect("upload");
    std::fs::remove_file(
        harness
            .root
            .path()
            .join(OWNER.to_string())
            .join(format!("{}.png", record.id)),
    )
    .expect("remove behind the store's back");

    coordinator
        .delete(
            OWNER,
            MediaLocator::new(OWNER, record.id),
        )
        .await
        .expect("row removal still succeeds");
    assert!(harness.media.records().is_empty());
}

#[rstest]
#[tokio::test]
async fn failed_reference_update_leaves_no_file(harness: Harness) {
    harness.media.fail_on(MediaOp::UpdateReference);

    let err = harness
        .coordinator()
        .upload(upload(PNG_BYTES, "a.png"))
        .await
        .expect_err("update failure");

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert!(harness.media.records().is_empty());
    let owner_dir = harness.root.path().join(OWNER.to_string());
    assert!(!owner_dir.exists() || std::fs::read_dir(owner_dir).expect("dir").next().is_none());
}
