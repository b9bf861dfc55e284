//! In-memory backend wired into [`HttpState`].

use std::sync::Arc;

use chrono::{TimeZone, Utc};

use super::{
    InMemoryAccountRepository, InMemoryBlobStore, InMemoryCredentialRepository,
    InMemoryMediaRepository, MutableClock,
};
use crate::domain::ports::TokenAuthority;
use crate::domain::{
    AccountId, CredentialService, IngestionCoordinator, JwtTokenService, MediaQueryService,
    ReferenceBase,
};
use crate::inbound::http::state::HttpState;

/// Signing secret shared by every fake backend.
pub const TEST_SIGNING_KEY: &[u8] = b"pixbin-test-signing-key";

/// Cheapest bcrypt cost accepted by the `bcrypt` crate.
const TEST_BCRYPT_COST: u32 = 4;

/// Real domain services over in-memory adapters.
///
/// Fields stay public so tests can seed rows, inject failures, and inspect
/// what the services wrote.
pub struct FakeBackend {
    pub accounts: Arc<InMemoryAccountRepository>,
    pub credentials: Arc<InMemoryCredentialRepository>,
    pub media: Arc<InMemoryMediaRepository>,
    pub blobs: Arc<InMemoryBlobStore>,
    pub clock: Arc<MutableClock>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeBackend {
    /// Empty stores with the clock at 2026-03-01T12:00:00Z.
    pub fn new() -> Self {
        let start = Utc
            .with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        Self {
            accounts: Arc::default(),
            credentials: Arc::default(),
            media: Arc::default(),
            blobs: Arc::default(),
            clock: Arc::new(MutableClock::new(start)),
        }
    }

    /// Reference prefix used for every stored record.
    pub fn references() -> ReferenceBase {
        ReferenceBase::new("localhost:8000", "image")
    }

    /// Token service sharing this backend's clock and secret.
    pub fn tokens(&self) -> JwtTokenService {
        JwtTokenService::new(TEST_SIGNING_KEY, self.clock.clone())
    }

    /// Signed token for `uid`, valid at the current fake time.
    ///
    /// # Panics
    /// Panics if signing fails, which only happens on a broken key setup.
    pub fn token_for(&self, uid: AccountId, email: &str) -> String {
        match self.tokens().issue(uid, email) {
            Ok(issued) => issued.token,
            Err(err) => panic!("test token signing failed: {err}"),
        }
    }

    /// Handler state built from the fakes.
    pub fn http_state(&self) -> HttpState {
        HttpState::new(
            Arc::new(CredentialService::with_cost(
                self.accounts.clone(),
                self.credentials.clone(),
                TEST_BCRYPT_COST,
            )),
            Arc::new(self.tokens()),
            Arc::new(IngestionCoordinator::new(
                self.media.clone(),
                self.blobs.clone(),
                Self::references(),
            )),
            Arc::new(MediaQueryService::new(self.media.clone(), self.blobs.clone())),
        )
    }
}

/// Boundary used by [`MultipartBody`].
pub const MULTIPART_BOUNDARY: &str = "pixbin-test-boundary";

/// Builder for `multipart/form-data` request bodies.
#[derive(Debug, Default)]
pub struct MultipartBody {
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Content-Type` header value matching the body.
    pub fn content_type() -> String {
        format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}")
    }

    /// Append a text field.
    #[must_use]
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    /// Append a file field.
    #[must_use]
    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Close the body.
    pub fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}

/// Smallest byte string sniffed as PNG.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

/// Smallest byte string sniffed as JPEG.
pub const JPEG_BYTES: &[u8] = b"\xff\xd8\xff\xe0\0\x10JFIF\0";
