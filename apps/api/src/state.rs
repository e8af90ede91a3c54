use std::sync::Arc;

use crate::auth::TokenKeys;
use crate::config::Config;
use crate::store::PortalStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable record store. `PgStore` in production, `MemoryStore` for
    /// tests and `STORAGE_BACKEND=memory`.
    pub store: Arc<dyn PortalStore>,
    pub tokens: Arc<TokenKeys>,
}

impl AppState {
    pub fn new(store: Arc<dyn PortalStore>, config: &Config) -> Self {
        AppState {
            store,
            tokens: Arc::new(TokenKeys::new(&config.jwt_secret, config.jwt_ttl_hours)),
        }
    }
}
