use crate::code::is_well_formed;
use clipshare_core::models::UploadRecord;
use clipshare_db::{RecordStoreError, UploadStore};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    /// No live record holds the code. Never-issued and already-swept codes look the same.
    #[error("Invalid code or files not found.")]
    NotFound,

    /// The record store could not be queried.
    #[error("Record store unavailable: {0}")]
    Store(#[source] RecordStoreError),
}

/// Read-only lookup of an upload by its code.
#[derive(Clone)]
pub struct RetrievalResolver {
    records: Arc<dyn UploadStore>,
}

impl RetrievalResolver {
    pub fn new(records: Arc<dyn UploadStore>) -> Self {
        Self { records }
    }

    /// Manifest stored under `code`, files in upload order.
    ///
    /// Matching is exact and case-sensitive; only surrounding whitespace is
    /// ignored. Records past their retention window resolve until a sweep
    /// removes them.
    #[tracing::instrument(skip(self))]
    pub async fn resolve(&self, code: &str) -> Result<UploadRecord, ResolveError> {
        let code = code.trim();
        if !is_well_formed(code) {
            return Err(ResolveError::NotFound);
        }

        match self.records.find_by_code(code).await {
            Ok(Some(record)) => Ok(record),
            Ok(None) => Err(ResolveError::NotFound),
            Err(e) => {
                tracing::error!(error = %e, "Failed to look up upload code");
                Err(ResolveError::Store(e))
            }
        }
    }
}
