//! Wire the Diesel and filesystem adapters into [`HttpState`].

use std::sync::Arc;

use mockable::DefaultClock;
use pixbin::domain::{CredentialService, IngestionCoordinator, JwtTokenService, MediaQueryService};
use pixbin::inbound::http::state::HttpState;
use pixbin::outbound::blob::FilesystemBlobStore;
use pixbin::outbound::persistence::{
    DieselAccountRepository, DieselCredentialRepository, DieselMediaRepository,
};

use super::ServerConfig;

/// Build handler state over PostgreSQL and the media directory.
///
/// # Errors
/// Returns [`std::io::Error`] when the media directory cannot be created or
/// opened.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let accounts = Arc::new(DieselAccountRepository::new(config.db_pool.clone()));
    let credentials = Arc::new(DieselCredentialRepository::new(config.db_pool.clone()));
    let media = Arc::new(DieselMediaRepository::new(config.db_pool.clone()));
    let blobs = Arc::new(FilesystemBlobStore::open(&config.media_root)?);

    let ingestion = IngestionCoordinator::new(media.clone(), blobs.clone(), config.references.clone());
    let query = MediaQueryService::new(media, blobs);
    let tokens = JwtTokenService::new(&config.signing_key, Arc::new(DefaultClock));

    Ok(HttpState::new(
        Arc::new(CredentialService::new(accounts, credentials)),
        Arc::new(tokens),
        Arc::new(ingestion),
        Arc::new(query),
    ))
}
