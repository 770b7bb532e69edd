use chrono::{DateTime, Utc};
use clipshare_core::models::{SweepReport, UploadRecord};
use clipshare_core::Config;
use clipshare_db::{RecordCursor, RecordStoreError, UploadStore};
use clipshare_storage::{code_from_key, Storage, StoredObject, UPLOAD_PREFIX};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SweepError {
    /// Listing expired records failed. `partial` holds what was done before.
    #[error("Failed to scan for expired uploads: {source}")]
    Scan {
        #[source]
        source: RecordStoreError,
        partial: SweepReport,
    },
}

#[derive(Debug, Clone)]
pub struct ReaperSettings {
    pub retention: Duration,
    /// Records fetched per scan page.
    pub batch_size: i64,
    pub orphan_scan: bool,
}

impl Default for ReaperSettings {
    fn default() -> Self {
        Self {
            retention: Duration::from_secs(300),
            batch_size: 500,
            orphan_scan: true,
        }
    }
}

impl ReaperSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            retention: config.retention(),
            batch_size: config.sweep_batch_size(),
            orphan_scan: config.orphan_scan_enabled(),
        }
    }
}

/// Deletes expired uploads: every blob of a record first, then the record.
///
/// Best effort. Item failures are logged and counted, never fatal, and
/// deleting something already gone counts as done, so sweeps can be
/// repeated or overlap safely. Nothing here schedules itself.
#[derive(Clone)]
pub struct ExpirationReaper {
    storage: Arc<dyn Storage>,
    records: Arc<dyn UploadStore>,
    settings: ReaperSettings,
}

impl ExpirationReaper {
    pub fn new(
        storage: Arc<dyn Storage>,
        records: Arc<dyn UploadStore>,
        settings: ReaperSettings,
    ) -> Self {
        Self {
            storage,
            records,
            settings,
        }
    }

    pub fn retention(&self) -> Duration {
        self.settings.retention
    }

    /// Sweep with the configured retention window.
    pub async fn run_sweep(&self) -> Result<SweepReport, SweepError> {
        self.sweep(self.settings.retention).await
    }

    #[tracing::instrument(skip(self), fields(retention_secs = retention.as_secs()))]
    pub async fn sweep(&self, retention: Duration) -> Result<SweepReport, SweepError> {
        let cutoff = cutoff_for(Utc::now(), retention);
        let mut report = SweepReport::default();
        let mut cursor: Option<RecordCursor> = None;

        tracing::info!(cutoff = %cutoff, "Starting sweep of expired uploads");

        loop {
            let page = match self
                .records
                .find_older_than(cutoff, cursor, self.settings.batch_size)
                .await
            {
                Ok(page) => page,
                Err(source) => {
                    tracing::error!(error = %source, "Sweep scan failed");
                    return Err(SweepError::Scan {
                        source,
                        partial: report,
                    });
                }
            };

            let Some(last) = page.last() else {
                break;
            };
            cursor = Some(RecordCursor::after(last));
            let full_page = i64::try_from(page.len()).unwrap_or(i64::MAX) >= self.settings.batch_size;

            for record in &page {
                self.reap_record(record, &mut report).await;
            }

            if !full_page {
                break;
            }
        }

        if self.settings.orphan_scan {
            self.reap_orphans(cutoff, &mut report).await;
        }

        tracing::info!(
            records_processed = report.records_processed,
            records_deleted = report.records_deleted,
            records_failed = report.records_failed,
            blobs_deleted = report.blobs_deleted,
            blobs_failed = report.blobs_failed,
            orphan_blobs_deleted = report.orphan_blobs_deleted,
            orphan_blobs_failed = report.orphan_blobs_failed,
            "Sweep completed"
        );

        Ok(report)
    }

    async fn reap_record(&self, record: &UploadRecord, report: &mut SweepReport) {
        report.records_processed += 1;

        tracing::info!(
            upload_id = %record.id,
            code = %record.code,
            created_at = %record.created_at,
            files = record.files.len(),
            "Deleting expired upload"
        );

        let results = futures::future::join_all(
            record
                .files
                .iter()
                .map(|file| self.storage.delete(&file.storage_path)),
        )
        .await;

        for (file, result) in record.files.iter().zip(results) {
            match result {
                Ok(()) => report.blobs_deleted += 1,
                Err(e) => {
                    report.blobs_failed += 1;
                    tracing::error!(
                        error = %e,
                        storage_key = %file.storage_path,
                        "Failed to delete blob, continuing with record deletion"
                    );
                }
            }
        }

        match self.records.delete_by_id(record.id).await {
            Ok(true) => report.records_deleted += 1,
            Ok(false) => {
                tracing::debug!(upload_id = %record.id, "Record already deleted");
            }
            Err(e) => {
                report.records_failed += 1;
                tracing::error!(error = %e, upload_id = %record.id, "Failed to delete record");
            }
        }
    }

    /// Delete blobs older than `cutoff` whose code has no record.
    ///
    /// These come from uploads that failed after writing some files, or
    /// from records whose row was deleted while a blob delete failed.
    /// Only keys under the upload prefix are considered.
    async fn reap_orphans(&self, cutoff: DateTime<Utc>, report: &mut SweepReport) {
        let objects = match self.storage.list(Some(UPLOAD_PREFIX)).await {
            Ok(objects) => objects,
            Err(e) => {
                tracing::warn!(error = %e, "Orphan scan skipped: listing storage failed");
                return;
            }
        };

        let mut by_code: BTreeMap<String, Vec<StoredObject>> = BTreeMap::new();
        for object in objects {
            if object.last_modified >= cutoff {
                continue;
            }
            if let Some(code) = code_from_key(&object.key) {
                by_code.entry(code.to_string()).or_default().push(object);
            }
        }

        for (code, stale) in by_code {
            match self.records.code_exists(&code).await {
                Ok(true) => continue,
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(error = %e, code = %code, "Orphan check failed, skipping code");
                    continue;
                }
            }

            let results =
                futures::future::join_all(stale.iter().map(|o| self.storage.delete(&o.key)))
                    .await;

            for (object, result) in stale.iter().zip(results) {
                match result {
                    Ok(()) => {
                        report.orphan_blobs_deleted += 1;
                        tracing::info!(storage_key = %object.key, "Deleted orphan blob");
                    }
                    Err(e) => {
                        report.orphan_blobs_failed += 1;
                        tracing::error!(error = %e, storage_key = %object.key, "Failed to delete orphan blob");
                    }
                }
            }
        }
    }
}

/// `now - retention`, clamped instead of overflowing for absurd windows.
fn cutoff_for(now: DateTime<Utc>, retention: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(retention)
        .ok()
        .and_then(|r| now.checked_sub_signed(r))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
