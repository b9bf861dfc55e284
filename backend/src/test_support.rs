//! Test utilities for the backend crate.
//!
//! In-memory adapters for every driven port, a controllable clock, and
//! helpers for wiring them into the HTTP layer. Shared by unit tests (in
//! `src/`) and integration tests (in `tests/`).

mod accounts;
mod blobs;
mod clock;
mod http;
mod media;

pub use accounts::{
    AccountOp, InMemoryAccountRepository, InMemoryCredentialRepository,
};
pub use blobs::{BlobOp, InMemoryBlobStore, temp_blob_root};
pub use clock::MutableClock;
pub use http::{
    FakeBackend, JPEG_BYTES, MULTIPART_BOUNDARY, MultipartBody, PNG_BYTES, TEST_SIGNING_KEY,
};
pub use media::{InMemoryMediaRepository, MediaOp};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a fake's state, recovering from a panicked test thread.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
