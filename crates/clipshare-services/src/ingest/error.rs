use clipshare_db::RecordStoreError;
use clipshare_storage::StorageError;
use thiserror::Error;

/// Why an upload batch was not accepted.
///
/// Every variant means no record was created for the batch.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The batch itself is unacceptable (empty, bad names, too many files).
    #[error("{0}")]
    Validation(String),

    #[error("File '{file}' is {size} bytes, above the {limit} byte limit")]
    FileTooLarge { file: String, size: usize, limit: usize },

    /// Writing one file's blob failed; `file` is the name as uploaded.
    #[error("Failed to store file '{file}': {source}")]
    StorageWrite {
        file: String,
        #[source]
        source: StorageError,
    },

    /// Blobs were written but the record could not be saved.
    #[error("Failed to persist upload record: {0}")]
    RecordPersist(#[source] RecordStoreError),

    /// The record store could not be asked whether a code is free.
    /// Raised before any blob is written.
    #[error("Record store unavailable: {0}")]
    Unavailable(#[source] RecordStoreError),

    #[error("No unused code found after {attempts} attempts")]
    CodeSpaceExhausted { attempts: u32 },
}
