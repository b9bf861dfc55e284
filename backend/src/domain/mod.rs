//! Domain primitives, services, and ports.
//!
//! Purpose: hold the media-sharing rules independently of HTTP and storage.
//! Services here implement the driving ports in [`ports`] and depend only on
//! the driven ports, so they run unchanged over PostgreSQL and the filesystem
//! or over the in-memory fakes used in tests.
//!
//! Public surface:
//! - `Error` / `ErrorCode`: transport-agnostic failure payload.
//! - `CredentialService`: registration and password login.
//! - `JwtTokenService`: bearer token issue and validation.
//! - `IngestionCoordinator`: upload, update, and delete of media.
//! - `MediaQueryService`: scoped, paginated search and content reads.

pub mod access;
pub mod account;
pub mod auth;
pub mod credentials;
pub mod error;
pub mod ingestion;
pub mod media;
pub mod media_query;
pub mod ports;
pub mod tokens;
pub mod trace_id;

pub use self::access::AccessPolicy;
pub use self::account::{
    Account, AccountId, NewAccount, Registration, RegistrationValidationError,
};
pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::credentials::{CredentialService, DEFAULT_BCRYPT_COST, PasswordDigest};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::ingestion::{IngestionCoordinator, Undo, UploadStep};
pub use self::media::{
    BlobKey, MediaContent, MediaId, MediaLocator, MediaLocatorError, MediaPatch, MediaRecord,
    MediaType, NewMediaRecord, ReferenceBase, SNIFF_LEN, normalise_title,
};
pub use self::media_query::{
    MEDIA_PAGE_SIZE, MediaFilters, MediaPredicate, MediaQueryService, Visibility,
};
pub use self::tokens::{Claims, IssuedToken, JwtTokenService, TOKEN_LIFETIME_MINUTES};
pub use self::trace_id::TraceId;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use pixbin::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::unauthorized("missing token"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
