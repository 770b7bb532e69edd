//! Test doubles shared by the service tests.

use crate::code::CodeGenerator;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use clipshare_core::models::UploadRecord;
use clipshare_core::StorageBackend;
use clipshare_db::{MemoryUploadStore, RecordCursor, RecordStoreError, UploadStore};
use clipshare_storage::{
    ByteStream, LocalStorage, Storage, StorageError, StorageResult, StoredObject,
};
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use uuid::Uuid;

/// Local storage that can be told to fail writes or deletes for chosen keys.
pub struct FlakyStorage {
    inner: LocalStorage,
    fail_put_names: Mutex<HashSet<String>>,
    fail_delete_keys: Mutex<HashSet<String>>,
    fail_list: Mutex<bool>,
}

impl FlakyStorage {
    pub fn fail_put_for(&self, name: &str) {
        self.fail_put_names.lock().unwrap().insert(name.to_string());
    }

    pub fn fail_delete_for(&self, key: &str) {
        self.fail_delete_keys.lock().unwrap().insert(key.to_string());
    }

    pub fn fail_listing(&self) {
        *self.fail_list.lock().unwrap() = true;
    }

    pub fn heal(&self) {
        self.fail_put_names.lock().unwrap().clear();
        self.fail_delete_keys.lock().unwrap().clear();
        *self.fail_list.lock().unwrap() = false;
    }

    pub async fn keys(&self) -> Vec<String> {
        self.inner
            .list(None)
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.key)
            .collect()
    }
}

#[async_trait]
impl Storage for FlakyStorage {
    async fn put(&self, storage_key: &str, content_type: &str, data: Bytes) -> StorageResult<()> {
        let name = storage_key.rsplit('/').next().unwrap_or(storage_key);
        if self.fail_put_names.lock().unwrap().contains(name) {
            return Err(StorageError::UploadFailed("simulated write failure".into()));
        }
        self.inner.put(storage_key, content_type, data).await
    }

    fn public_url(&self, storage_key: &str) -> String {
        self.inner.public_url(storage_key)
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        self.inner.download(storage_key).await
    }

    async fn download_stream(&self, storage_key: &str) -> StorageResult<ByteStream> {
        self.inner.download_stream(storage_key).await
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        if self.fail_delete_keys.lock().unwrap().contains(storage_key) {
            return Err(StorageError::DeleteFailed("simulated delete failure".into()));
        }
        self.inner.delete(storage_key).await
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        self.inner.exists(storage_key).await
    }

    async fn list(&self, prefix: Option<&str>) -> StorageResult<Vec<StoredObject>> {
        if *self.fail_list.lock().unwrap() {
            return Err(StorageError::BackendError("simulated list failure".into()));
        }
        self.inner.list(prefix).await
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

/// Hands out codes from a fixed script, then repeats the last one.
pub struct ScriptedCodes {
    codes: Mutex<VecDeque<String>>,
}

impl ScriptedCodes {
    pub fn new(codes: &[&str]) -> Self {
        Self {
            codes: Mutex::new(codes.iter().map(|c| c.to_string()).collect()),
        }
    }
}

impl CodeGenerator for ScriptedCodes {
    fn generate(&self) -> String {
        let mut codes = self.codes.lock().unwrap();
        if codes.len() > 1 {
            codes.pop_front().unwrap()
        } else {
            codes.front().cloned().unwrap()
        }
    }
}

/// Record store whose inserts always lose the race for the code.
pub struct ConflictingStore;

#[async_trait]
impl UploadStore for ConflictingStore {
    async fn insert(&self, record: &UploadRecord) -> Result<(), RecordStoreError> {
        Err(RecordStoreError::CodeConflict(record.code.clone()))
    }

    async fn find_by_code(&self, _code: &str) -> Result<Option<UploadRecord>, RecordStoreError> {
        Ok(None)
    }

    async fn code_exists(&self, _code: &str) -> Result<bool, RecordStoreError> {
        Ok(false)
    }

    async fn find_older_than(
        &self,
        _cutoff: DateTime<Utc>,
        _after: Option<RecordCursor>,
        _limit: i64,
    ) -> Result<Vec<UploadRecord>, RecordStoreError> {
        Ok(Vec::new())
    }

    async fn delete_by_id(&self, _id: Uuid) -> Result<bool, RecordStoreError> {
        Ok(false)
    }
}

/// Record store that is down.
pub struct UnavailableStore;

fn outage() -> RecordStoreError {
    RecordStoreError::Database(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl UploadStore for UnavailableStore {
    async fn insert(&self, _record: &UploadRecord) -> Result<(), RecordStoreError> {
        Err(outage())
    }

    async fn find_by_code(&self, _code: &str) -> Result<Option<UploadRecord>, RecordStoreError> {
        Err(outage())
    }

    async fn code_exists(&self, _code: &str) -> Result<bool, RecordStoreError> {
        Err(outage())
    }

    async fn find_older_than(
        &self,
        _cutoff: DateTime<Utc>,
        _after: Option<RecordCursor>,
        _limit: i64,
    ) -> Result<Vec<UploadRecord>, RecordStoreError> {
        Err(outage())
    }

    async fn delete_by_id(&self, _id: Uuid) -> Result<bool, RecordStoreError> {
        Err(outage())
    }
}

pub struct Harness {
    pub storage: Arc<FlakyStorage>,
    pub records: Arc<MemoryUploadStore>,
    _dir: TempDir,
}

impl Harness {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let inner = LocalStorage::new(dir.path(), "http://localhost:4000/files".to_string())
            .await
            .unwrap();
        Self {
            storage: Arc::new(FlakyStorage {
                inner,
                fail_put_names: Mutex::new(HashSet::new()),
                fail_delete_keys: Mutex::new(HashSet::new()),
                fail_list: Mutex::new(false),
            }),
            records: Arc::new(MemoryUploadStore::new()),
            _dir: dir,
        }
    }
}
