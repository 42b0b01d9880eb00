//! Application state shared across handlers.

use std::sync::Arc;

use database::Database;
use media_store::ObjectStore;

use crate::config::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// Uploaded media.
    pub store: Arc<dyn ObjectStore>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state.
    pub fn new(db: Database, store: Arc<dyn ObjectStore>, config: Config) -> Self {
        Self {
            db,
            store,
            config: Arc::new(config),
        }
    }

    /// Delete the stored object behind `url`, if this server issued it.
    ///
    /// Failures are logged, not returned.
    pub async fn discard_media(&self, url: &str) {
        let Some(key) = self.store.key_for_url(url) else {
            return;
        };

        if let Err(e) = self.store.delete(&key).await {
            tracing::warn!(key = %key, error = %e, "Failed to delete media object");
        }
    }
}
