//! Storage double for integration tests: local storage that can be told to
//! fail writes for chosen file names.

use async_trait::async_trait;
use bytes::Bytes;
use clipshare_core::StorageBackend;
use clipshare_storage::{ByteStream, LocalStorage, Storage, StorageError, StorageResult, StoredObject};
use std::collections::HashSet;
use std::sync::Mutex;

pub const TEST_BASE_URL: &str = "http://localhost/files";

pub struct FailingStorage {
    inner: LocalStorage,
    fail_put_names: Mutex<HashSet<String>>,
}

impl FailingStorage {
    pub async fn new(base_path: &std::path::Path) -> Self {
        let inner = LocalStorage::new(base_path, TEST_BASE_URL.to_string())
            .await
            .expect("Failed to create local storage");
        Self {
            inner,
            fail_put_names: Mutex::new(HashSet::new()),
        }
    }

    pub fn fail_put_for(&self, name: &str) {
        self.fail_put_names.lock().unwrap().insert(name.to_string());
    }

    pub async fn keys(&self) -> Vec<String> {
        self.inner
            .list(None)
            .await
            .expect("Failed to list storage")
            .into_iter()
            .map(|o| o.key)
            .collect()
    }
}

#[async_trait]
impl Storage for FailingStorage {
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
        self.inner.delete(storage_key).await
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        self.inner.exists(storage_key).await
    }

    async fn list(&self, prefix: Option<&str>) -> StorageResult<Vec<StoredObject>> {
        self.inner.list(prefix).await
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
