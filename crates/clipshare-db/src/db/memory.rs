use super::store::{RecordCursor, RecordStoreError, UploadStore};
use chrono::{DateTime, Utc};
use clipshare_core::models::UploadRecord;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-local record store keyed by code.
///
/// Records are lost on restart. Used for development and tests.
#[derive(Default)]
pub struct MemoryUploadStore {
    records: RwLock<HashMap<String, UploadRecord>>,
}

impl MemoryUploadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl UploadStore for MemoryUploadStore {
    async fn insert(&self, record: &UploadRecord) -> Result<(), RecordStoreError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.code) {
            return Err(RecordStoreError::CodeConflict(record.code.clone()));
        }
        records.insert(record.code.clone(), record.clone());
        Ok(())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<UploadRecord>, RecordStoreError> {
        Ok(self.records.read().await.get(code).cloned())
    }

    async fn code_exists(&self, code: &str) -> Result<bool, RecordStoreError> {
        Ok(self.records.read().await.contains_key(code))
    }

    async fn find_older_than(
        &self,
        cutoff: DateTime<Utc>,
        after: Option<RecordCursor>,
        limit: i64,
    ) -> Result<Vec<UploadRecord>, RecordStoreError> {
        let records = self.records.read().await;
        let mut older: Vec<UploadRecord> = records
            .values()
            .filter(|r| r.created_at < cutoff)
            .filter(|r| match after {
                Some(cursor) => (r.created_at, r.id) > (cursor.created_at, cursor.id),
                None => true,
            })
            .cloned()
            .collect();

        older.sort_by_key(|r| (r.created_at, r.id));
        older.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(older)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, RecordStoreError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, r| r.id != id);
        Ok(records.len() < before)
    }
}
