//! Blob store adapters.

mod filesystem;

pub use filesystem::FilesystemBlobStore;
