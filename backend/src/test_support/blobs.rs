//! In-memory blob store and a scratch directory for the filesystem adapter.

use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::Mutex;

use async_trait::async_trait;

use super::lock;
use crate::domain::BlobKey;
use crate::domain::ports::{BlobStore, BlobStoreError};

/// Blob store operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlobOp {
    Write,
    Read,
    Delete,
}

#[derive(Default)]
struct BlobState {
    blobs: HashMap<BlobKey, Vec<u8>>,
    failing: HashSet<BlobOp>,
}

/// Blob store holding bytes in a map.
#[derive(Default)]
pub struct InMemoryBlobStore(Mutex<BlobState>);

impl InMemoryBlobStore {
    /// Make every later call to `op` fail with an I/O error.
    pub fn fail_on(&self, op: BlobOp) {
        lock(&self.0).failing.insert(op);
    }

    /// Bytes stored at `key`, if any.
    pub fn get(&self, key: &BlobKey) -> Option<Vec<u8>> {
        lock(&self.0).blobs.get(key).cloned()
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        lock(&self.0).blobs.len()
    }

    /// No blobs are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check(&self, op: BlobOp, key: &BlobKey) -> Result<(), BlobStoreError> {
        if lock(&self.0).failing.contains(&op) {
            Err(BlobStoreError::io(
                key.relative_path().display().to_string(),
                format!("injected {op:?} failure"),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn write(&self, key: &BlobKey, bytes: &[u8]) -> Result<(), BlobStoreError> {
        self.check(BlobOp::Write, key)?;
        lock(&self.0).blobs.insert(*key, bytes.to_vec());
        Ok(())
    }

    async fn read(&self, key: &BlobKey) -> Result<Vec<u8>, BlobStoreError> {
        self.check(BlobOp::Read, key)?;
        self.get(key)
            .ok_or_else(|| BlobStoreError::not_found(key.relative_path().display().to_string()))
    }

    async fn delete(&self, key: &BlobKey) -> Result<(), BlobStoreError> {
        self.check(BlobOp::Delete, key)?;
        lock(&self.0)
            .blobs
            .remove(key)
            .map(drop)
            .ok_or_else(|| BlobStoreError::not_found(key.relative_path().display().to_string()))
    }
}

/// Fresh temporary directory for filesystem blob store tests.
pub fn temp_blob_root() -> io::Result<tempfile::TempDir> {
    tempfile::Builder::new().prefix("pixbin-blobs-").tempdir()
}
