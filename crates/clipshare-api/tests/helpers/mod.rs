//! Test helpers: build AppState and router for integration tests.
//!
//! Uses the in-memory record store and local storage in a temp dir, so no
//! external services are needed: `cargo test -p clipshare-api`.

#![allow(dead_code)]

pub mod storage;
pub mod workflows;

use axum_test::TestServer;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use clipshare_api::constants;
use clipshare_api::setup::{routes, services};
use clipshare_api::state::AppState;
use clipshare_core::models::{FileEntry, UploadRecord};
use clipshare_core::{BaseConfig, Config, RecordStoreBackend, ShareConfig, StorageBackend};
use clipshare_db::{MemoryUploadStore, UploadStore};
use clipshare_storage::{storage_key, Storage};
use std::sync::Arc;
use tempfile::TempDir;

use storage::{FailingStorage, TEST_BASE_URL};

/// API path prefix for tests (e.g. `/api/v0`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server plus handles on its stores.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub records: Arc<MemoryUploadStore>,
    pub storage: Arc<FailingStorage>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Store a record with the given age directly, bypassing the upload route.
    pub async fn seed_record(&self, code: &str, names: &[&str], created_at: DateTime<Utc>) -> UploadRecord {
        let mut files = Vec::new();
        for name in names {
            let key = storage_key(code, name);
            self.storage
                .put(&key, "text/plain", Bytes::from(format!("content of {}", name)))
                .await
                .expect("Failed to seed blob");
            files.push(FileEntry {
                name: name.to_string(),
                public_url: self.storage.public_url(&key),
                storage_path: key,
                content_type: "text/plain".to_string(),
                size: Some(format!("content of {}", name).len() as i64),
            });
        }
        let record = UploadRecord::new(code.to_string(), files, created_at);
        self.records
            .insert(&record)
            .await
            .expect("Failed to seed record");
        record
    }
}

/// Test configuration: memory records, local storage, small limits.
pub fn create_test_config(storage_path: &str) -> ShareConfig {
    ShareConfig {
        base: BaseConfig {
            server_port: 4000,
            cors_origins: vec!["*".to_string()],
            db_max_connections: 5,
            db_timeout_seconds: 30,
            environment: "test".to_string(),
        },
        record_store: RecordStoreBackend::Memory,
        database_url: None,
        storage_backend: Some(StorageBackend::Local),
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        aws_region: None,
        local_storage_path: Some(storage_path.to_string()),
        local_storage_base_url: Some(TEST_BASE_URL.to_string()),
        public_base_url: Some("http://localhost/receive".to_string()),
        code_length: 8,
        max_code_attempts: 5,
        max_file_size_bytes: 1024 * 1024,
        max_files_per_upload: 5,
        rollback_failed_uploads: true,
        retention_seconds: 300,
        sweep_batch_size: 100,
        sweep_token: None,
        sweep_interval_secs: 0,
        orphan_scan_enabled: true,
    }
}

/// Setup test app with default configuration.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(|_| {}).await
}

/// Setup test app, letting the caller adjust the configuration first.
pub async fn setup_test_app_with(customize: impl FnOnce(&mut ShareConfig)) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let storage = Arc::new(FailingStorage::new(temp_dir.path()).await);
    let records = Arc::new(MemoryUploadStore::new());

    let mut share_config = create_test_config(&temp_dir.path().to_string_lossy());
    customize(&mut share_config);
    let config = Config(Box::new(share_config));

    let state = services::initialize_services(&config, records.clone(), storage.clone())
        .expect("Failed to initialize services");
    let router = routes::setup_routes(&config, state.clone()).expect("Failed to setup routes");
    let server = TestServer::new(router).expect("Failed to start test server");

    TestApp {
        server,
        state,
        records,
        storage,
        _temp_dir: temp_dir,
    }
}
