//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on driving ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{AccountService, MediaCommand, MediaQuery, TokenAuthority};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountService>,
    pub tokens: Arc<dyn TokenAuthority>,
    pub media: Arc<dyn MediaCommand>,
    pub media_query: Arc<dyn MediaQuery>,
}

impl HttpState {
    /// Bundle the driving ports.
    ///
    /// # Examples
    /// ```ignore
    /// let state = HttpState::new(accounts, tokens, media, media_query);
    /// let app = App::new().app_data(web::Data::new(state));
    /// ```
    pub fn new(
        accounts: Arc<dyn AccountService>,
        tokens: Arc<dyn TokenAuthority>,
        media: Arc<dyn MediaCommand>,
        media_query: Arc<dyn MediaQuery>,
    ) -> Self {
        Self {
            accounts,
            tokens,
            media,
            media_query,
        }
    }
}
