use super::IngestError;
use crate::code::CodeGenerator;
use chrono::Utc;
use clipshare_core::models::{FileEntry, NewFile, UploadRecord};
use clipshare_core::Config;
use clipshare_db::UploadStore;
use clipshare_storage::{storage_key, Storage};
use std::collections::HashSet;
use std::sync::Arc;

/// Limits and failure policy for ingestion.
#[derive(Debug, Clone)]
pub struct IngestSettings {
    pub max_files: usize,
    pub max_file_size: usize,
    pub max_code_attempts: u32,
    /// Delete already written blobs when a batch fails part way.
    pub rollback_on_failure: bool,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            max_files: 20,
            max_file_size: 50 * 1024 * 1024,
            max_code_attempts: 5,
            rollback_on_failure: true,
        }
    }
}

impl IngestSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_files: config.max_files_per_upload(),
            max_file_size: config.max_file_size_bytes(),
            max_code_attempts: config.max_code_attempts(),
            rollback_on_failure: config.rollback_failed_uploads(),
        }
    }
}

/// Stores a batch of files under a fresh code and records its manifest.
#[derive(Clone)]
pub struct UploadIngestor {
    storage: Arc<dyn Storage>,
    records: Arc<dyn UploadStore>,
    codes: Arc<dyn CodeGenerator>,
    settings: IngestSettings,
}

impl UploadIngestor {
    pub fn new(
        storage: Arc<dyn Storage>,
        records: Arc<dyn UploadStore>,
        codes: Arc<dyn CodeGenerator>,
        settings: IngestSettings,
    ) -> Self {
        Self {
            storage,
            records,
            codes,
            settings,
        }
    }

    pub fn settings(&self) -> &IngestSettings {
        &self.settings
    }

    /// Store `files` in order and persist one record for them.
    ///
    /// Writes are sequential and stop at the first failure, which names the
    /// file. Nothing is recorded unless every write succeeded.
    #[tracing::instrument(skip(self, files), fields(file_count = files.len(), code = tracing::field::Empty))]
    pub async fn ingest(&self, files: Vec<NewFile>) -> Result<UploadRecord, IngestError> {
        self.validate(&files)?;

        let code = self.allocate_code().await?;
        tracing::Span::current().record("code", code.as_str());

        let mut written: Vec<String> = Vec::with_capacity(files.len());
        let mut stored = Vec::with_capacity(files.len());

        for file in files {
            let key = storage_key(&code, &file.name);
            let size = file.data.len();

            if let Err(source) = self.storage.put(&key, &file.content_type, file.data).await {
                tracing::error!(
                    error = %source,
                    code = %code,
                    file = %file.name,
                    written = written.len(),
                    "Upload aborted: file write failed"
                );
                self.discard(&written).await;
                return Err(IngestError::StorageWrite {
                    file: file.name,
                    source,
                });
            }

            written.push(key.clone());
            stored.push((file.name, key, file.content_type, size));
        }

        let entries = stored
            .into_iter()
            .map(|(name, key, content_type, size)| FileEntry {
                public_url: self.storage.public_url(&key),
                name,
                storage_path: key,
                content_type,
                size: i64::try_from(size).ok(),
            })
            .collect();

        let record = UploadRecord::new(code, entries, Utc::now());

        if let Err(e) = self.records.insert(&record).await {
            tracing::error!(
                error = %e,
                code = %record.code,
                "Upload aborted: record insert failed"
            );
            self.discard(&written).await;
            return Err(IngestError::RecordPersist(e));
        }

        tracing::info!(
            code = %record.code,
            upload_id = %record.id,
            files = record.files.len(),
            "Upload stored"
        );

        Ok(record)
    }

    fn validate(&self, files: &[NewFile]) -> Result<(), IngestError> {
        if files.is_empty() {
            return Err(IngestError::Validation("No files provided".to_string()));
        }

        if files.len() > self.settings.max_files {
            return Err(IngestError::Validation(format!(
                "Too many files: {} (maximum {})",
                files.len(),
                self.settings.max_files
            )));
        }

        let mut seen = HashSet::with_capacity(files.len());
        for file in files {
            validate_name(&file.name)?;

            if !seen.insert(file.name.as_str()) {
                return Err(IngestError::Validation(format!(
                    "Duplicate file name in upload: {}",
                    file.name
                )));
            }

            if file.data.len() > self.settings.max_file_size {
                return Err(IngestError::FileTooLarge {
                    file: file.name.clone(),
                    size: file.data.len(),
                    limit: self.settings.max_file_size,
                });
            }
        }

        Ok(())
    }

    /// Generate codes until one is not held by a stored record.
    async fn allocate_code(&self) -> Result<String, IngestError> {
        let attempts = self.settings.max_code_attempts;

        for attempt in 1..=attempts {
            let code = self.codes.generate();
            match self.records.code_exists(&code).await {
                Ok(false) => return Ok(code),
                Ok(true) => {
                    tracing::warn!(attempt, "Generated code already in use, regenerating");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Code lookup failed, upload not started");
                    return Err(IngestError::Unavailable(e));
                }
            }
        }

        Err(IngestError::CodeSpaceExhausted { attempts })
    }

    /// Best-effort removal of blobs written by a failed batch.
    async fn discard(&self, keys: &[String]) {
        if keys.is_empty() {
            return;
        }
        if !self.settings.rollback_on_failure {
            tracing::warn!(
                orphaned = keys.len(),
                "Rollback disabled, leaving written blobs for the orphan scan"
            );
            return;
        }

        let results =
            futures::future::join_all(keys.iter().map(|key| self.storage.delete(key))).await;

        for (key, result) in keys.iter().zip(results) {
            if let Err(e) = result {
                tracing::error!(error = %e, key = %key, "Failed to roll back blob");
            }
        }
    }
}

fn validate_name(name: &str) -> Result<(), IngestError> {
    let invalid = name.trim().is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.chars().any(char::is_control);

    if invalid {
        return Err(IngestError::Validation(format!(
            "Invalid file name: {:?}",
            name
        )));
    }
    Ok(())
}
