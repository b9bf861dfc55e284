//! HTTP server configuration object.

use std::net::SocketAddr;
use std::path::PathBuf;

use pixbin::config::AppConfig;
use pixbin::domain::ReferenceBase;
use pixbin::outbound::persistence::DbPool;
use zeroize::Zeroizing;

/// Everything the server needs once startup checks have passed.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) media_root: PathBuf,
    pub(crate) references: ReferenceBase,
    pub(crate) signing_key: Zeroizing<Vec<u8>>,
}

impl ServerConfig {
    /// Combine the application configuration with a ready pool.
    #[must_use]
    pub fn new(app: &AppConfig, db_pool: DbPool) -> Self {
        Self {
            bind_addr: app.bind_addr,
            db_pool,
            media_root: app.media_root(),
            references: app.reference_base(),
            signing_key: Zeroizing::new(app.signing_key().to_vec()),
        }
    }
}
