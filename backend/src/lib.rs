//! Media-sharing backend: accounts, signed tokens, and image storage.
//!
//! The crate is laid out hexagonally. [`domain`] holds the services and the
//! ports they depend on, [`inbound`] adapts HTTP onto the driving ports, and
//! [`outbound`] implements the driven ports over PostgreSQL and the
//! filesystem.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
