//! [`BlobStore`] over a directory tree.
//!
//! Blobs live at `{root}/{ownerId}/{recordId}.{ext}`. All access goes
//! through a `cap-std` [`Dir`] opened on the root, so keys cannot reach
//! outside it. Filesystem calls block and run on tokio's blocking pool.

use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use tracing::debug;

use crate::domain::BlobKey;
use crate::domain::ports::{BlobStore, BlobStoreError};

/// Filesystem-backed blob store.
#[derive(Clone)]
pub struct FilesystemBlobStore {
    root: Arc<Dir>,
}

impl FilesystemBlobStore {
    /// Open `root`, creating it when missing.
    ///
    /// # Errors
    /// Propagates failures to create or open the directory.
    pub fn open(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = root.as_ref();
        Dir::create_ambient_dir_all(root, ambient_authority())?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())?;
        Ok(Self {
            root: Arc::new(dir),
        })
    }

    async fn blocking<T, F>(&self, key: &BlobKey, op: F) -> Result<T, BlobStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Dir, &Path) -> io::Result<T> + Send + 'static,
    {
        let root = Arc::clone(&self.root);
        let path = key.relative_path();
        let display = path.display().to_string();
        let outcome = tokio::task::spawn_blocking(move || op(&root, &path))
            .await
            .map_err(|err| BlobStoreError::io(display.as_str(), err.to_string()))?;
        outcome.map_err(|err| map_io_error(display, &err))
    }
}

fn map_io_error(path: String, error: &io::Error) -> BlobStoreError {
    debug!(%path, error = %error, "blob operation failed");
    if error.kind() == ErrorKind::NotFound {
        BlobStoreError::not_found(path)
    } else {
        BlobStoreError::io(path, error.to_string())
    }
}

fn parent_of(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn write(&self, key: &BlobKey, bytes: &[u8]) -> Result<(), BlobStoreError> {
        let bytes = bytes.to_vec();
        self.blocking(key, move |root, path| {
            let parent = parent_of(path);
            if !parent.as_os_str().is_empty() {
                root.create_dir_all(&parent)?;
            }
            root.write(path, &bytes)
        })
        .await
    }

    async fn read(&self, key: &BlobKey) -> Result<Vec<u8>, BlobStoreError> {
        self.blocking(key, |root, path| root.read(path)).await
    }

    async fn delete(&self, key: &BlobKey) -> Result<(), BlobStoreError> {
        self.blocking(key, |root, path| root.remove_file(path)).await
    }
}
