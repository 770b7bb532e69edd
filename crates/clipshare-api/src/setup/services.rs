//! Service initialization

use crate::state::AppState;
use anyhow::Result;
use clipshare_core::Config;
use clipshare_db::UploadStore;
use clipshare_services::{
    ExpirationReaper, IngestSettings, RandomCodeGenerator, ReaperSettings, RetrievalResolver,
    UploadIngestor,
};
use clipshare_storage::Storage;
use std::sync::Arc;

/// Assemble the upload services around the record store and blob storage.
pub fn initialize_services(
    config: &Config,
    records: Arc<dyn UploadStore>,
    storage: Arc<dyn Storage>,
) -> Result<Arc<AppState>> {
    let codes = RandomCodeGenerator::new(config.code_length()).map_err(|e| anyhow::anyhow!(e))?;

    let ingest_settings = IngestSettings::from_config(config);
    let reaper_settings = ReaperSettings::from_config(config);

    tracing::info!(
        code_length = codes.length(),
        max_files = ingest_settings.max_files,
        max_file_size_mb = ingest_settings.max_file_size / 1024 / 1024,
        retention_secs = reaper_settings.retention.as_secs(),
        orphan_scan = reaper_settings.orphan_scan,
        "Upload services initialized"
    );

    let ingestor = UploadIngestor::new(
        storage.clone(),
        records.clone(),
        Arc::new(codes),
        ingest_settings,
    );
    let resolver = RetrievalResolver::new(records.clone());
    let reaper = ExpirationReaper::new(storage.clone(), records.clone(), reaper_settings);

    Ok(Arc::new(AppState {
        config: config.clone(),
        storage,
        records,
        ingestor,
        resolver,
        reaper,
    }))
}
