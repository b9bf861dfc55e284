//! Domain ports.
//!
//! Driven ports (repositories, blob storage) are implemented by outbound
//! adapters. Driving ports are implemented by domain services and consumed
//! by the HTTP layer.

mod macros;
pub(crate) use macros::define_port_error;

mod account_repository;
mod account_service;
mod blob_store;
mod credential_repository;
mod media_command;
mod media_query;
mod media_repository;
mod token_authority;

#[cfg(test)]
pub use account_repository::MockAccountRepository;
pub use account_repository::{AccountRepository, AccountRepositoryError};
#[cfg(test)]
pub use account_service::MockAccountService;
pub use account_service::AccountService;
#[cfg(test)]
pub use blob_store::MockBlobStore;
pub use blob_store::{BlobStore, BlobStoreError};
#[cfg(test)]
pub use credential_repository::MockCredentialRepository;
pub use credential_repository::{CredentialRepository, CredentialRepositoryError};
#[cfg(test)]
pub use media_command::MockMediaCommand;
pub use media_command::{MediaCommand, UploadRequest};
#[cfg(test)]
pub use media_query::MockMediaQuery;
pub use media_query::MediaQuery;
#[cfg(test)]
pub use media_repository::MockMediaRepository;
pub use media_repository::{MediaRepository, MediaRepositoryError};
#[cfg(test)]
pub use token_authority::MockTokenAuthority;
pub use token_authority::TokenAuthority;
