//! Driven port for media bytes.

use async_trait::async_trait;

use crate::domain::BlobKey;

use super::define_port_error;

define_port_error! {
    /// Failures raised by blob store adapters.
    pub enum BlobStoreError {
        /// No blob exists at the key.
        NotFound { path: String } => "blob not found: {path}",
        /// The underlying store failed.
        Io { path: String, message: String } => "blob store failure at {path}: {message}",
    }
}

/// Byte storage addressed by [`BlobKey`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Create or replace the blob at `key`.
    async fn write(&self, key: &BlobKey, bytes: &[u8]) -> Result<(), BlobStoreError>;

    /// Read the blob at `key`.
    async fn read(&self, key: &BlobKey) -> Result<Vec<u8>, BlobStoreError>;

    /// Remove the blob at `key`.
    async fn delete(&self, key: &BlobKey) -> Result<(), BlobStoreError>;
}
