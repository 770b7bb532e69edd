//! Application state shared by all handlers.

use clipshare_core::Config;
use clipshare_db::UploadStore;
use clipshare_services::{ExpirationReaper, RetrievalResolver, UploadIngestor};
use clipshare_storage::Storage;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn Storage>,
    pub records: Arc<dyn UploadStore>,
    pub ingestor: UploadIngestor,
    pub resolver: RetrievalResolver,
    pub reaper: ExpirationReaper,
}

impl AppState {
    /// Retention window as used for `expires_at` in responses.
    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.reaper.retention())
            .unwrap_or_else(|_| chrono::Duration::days(36_500))
    }

    /// Deep link into the receive flow for `code`.
    pub fn share_url(&self, code: &str) -> Option<String> {
        self.config
            .public_base_url()
            .map(|base| format!("{}?code={}", base.trim_end_matches('/'), code))
    }
}
