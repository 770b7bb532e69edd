use chrono::{DateTime, Utc};
use clipshare_core::models::UploadRecord;
use thiserror::Error;
use uuid::Uuid;

/// Record store errors
#[derive(Debug, Error)]
pub enum RecordStoreError {
    /// Another record already holds this code.
    #[error("Code already in use: {0}")]
    CodeConflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Position in an oldest-first scan. The next page starts strictly after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordCursor {
    pub created_at: DateTime<Utc>,
    pub id: Uuid,
}

impl RecordCursor {
    pub fn after(record: &UploadRecord) -> Self {
        Self {
            created_at: record.created_at,
            id: record.id,
        }
    }
}

/// Trait for upload record persistence
///
/// Records are immutable once inserted. Codes are unique across all stored
/// records; an insert that would duplicate one fails with `CodeConflict`.
#[async_trait::async_trait]
pub trait UploadStore: Send + Sync {
    async fn insert(&self, record: &UploadRecord) -> Result<(), RecordStoreError>;

    /// Exact, case-sensitive lookup.
    async fn find_by_code(&self, code: &str) -> Result<Option<UploadRecord>, RecordStoreError>;

    async fn code_exists(&self, code: &str) -> Result<bool, RecordStoreError>;

    /// Records with `created_at < cutoff`, ordered by `(created_at, id)`,
    /// starting after `after` and returning at most `limit` rows.
    async fn find_older_than(
        &self,
        cutoff: DateTime<Utc>,
        after: Option<RecordCursor>,
        limit: i64,
    ) -> Result<Vec<UploadRecord>, RecordStoreError>;

    /// Returns `false` when no record had this id.
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, RecordStoreError>;

    /// Cheap connectivity probe used by readiness checks.
    async fn ping(&self) -> Result<(), RecordStoreError> {
        Ok(())
    }
}
