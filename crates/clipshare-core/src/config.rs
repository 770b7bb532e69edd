//! Configuration module
//!
//! Configuration for the API server and services: database, storage,
//! retention window and sweep behaviour. Loaded from the environment
//! (and an optional `.env` file) and validated at startup.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::storage_types::StorageBackend;

// Common constants
const SERVER_PORT: u16 = 4000;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const RETENTION_SECONDS: u64 = 300;
const CODE_LENGTH: usize = 8;
const MIN_CODE_LENGTH: usize = 6;
const MAX_CODE_ATTEMPTS: u32 = 5;
const MAX_FILE_SIZE_MB: usize = 50;
const MAX_FILES_PER_UPLOAD: usize = 20;
const SWEEP_BATCH_SIZE: i64 = 500;

/// Where upload records are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStoreBackend {
    Postgres,
    /// Process-local map; records vanish on restart. Meant for development and tests.
    Memory,
}

impl FromStr for RecordStoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(RecordStoreBackend::Postgres),
            "memory" => Ok(RecordStoreBackend::Memory),
            _ => Err(anyhow::anyhow!("Invalid record store: {}", s)),
        }
    }
}

/// Server-level configuration
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
}

/// Upload sharing configuration
#[derive(Clone, Debug)]
pub struct ShareConfig {
    pub base: BaseConfig,
    pub record_store: RecordStoreBackend,
    pub database_url: Option<String>,
    // Storage configuration
    pub storage_backend: Option<StorageBackend>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, R2, ...)
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    /// Base URL of the receive page, used to build `?code=` share links
    pub public_base_url: Option<String>,
    // Code generation
    pub code_length: usize,
    pub max_code_attempts: u32,
    // Upload limits
    pub max_file_size_bytes: usize,
    pub max_files_per_upload: usize,
    pub rollback_failed_uploads: bool,
    // Expiration
    pub retention_seconds: u64,
    pub sweep_batch_size: i64,
    pub sweep_token: Option<String>,
    /// Interval of the optional in-process sweep ticker. 0 = disabled (external trigger only).
    pub sweep_interval_secs: u64,
    pub orphan_scan_enabled: bool,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<ShareConfig>);

impl Config {
    fn as_share(&self) -> &ShareConfig {
        &self.0
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = ShareConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_share().validate()
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.as_share().base.environment)
    }

    pub fn server_port(&self) -> u16 {
        self.as_share().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_share().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_share().base.environment
    }

    pub fn db_max_connections(&self) -> u32 {
        self.as_share().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.as_share().base.db_timeout_seconds
    }

    pub fn record_store(&self) -> RecordStoreBackend {
        self.as_share().record_store
    }

    pub fn database_url(&self) -> Option<&str> {
        self.as_share().database_url.as_deref()
    }

    pub fn storage_backend(&self) -> Option<StorageBackend> {
        self.as_share().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.as_share().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.as_share().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.as_share().s3_endpoint.as_deref()
    }

    pub fn aws_region(&self) -> Option<&str> {
        self.as_share().aws_region.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.as_share().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.as_share().local_storage_base_url.as_deref()
    }

    pub fn public_base_url(&self) -> Option<&str> {
        self.as_share().public_base_url.as_deref()
    }

    pub fn code_length(&self) -> usize {
        self.as_share().code_length
    }

    pub fn max_code_attempts(&self) -> u32 {
        self.as_share().max_code_attempts
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.as_share().max_file_size_bytes
    }

    pub fn max_files_per_upload(&self) -> usize {
        self.as_share().max_files_per_upload
    }

    pub fn rollback_failed_uploads(&self) -> bool {
        self.as_share().rollback_failed_uploads
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.as_share().retention_seconds)
    }

    pub fn sweep_batch_size(&self) -> i64 {
        self.as_share().sweep_batch_size
    }

    pub fn sweep_token(&self) -> Option<&str> {
        self.as_share().sweep_token.as_deref()
    }

    pub fn sweep_interval(&self) -> Option<Duration> {
        match self.as_share().sweep_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn orphan_scan_enabled(&self) -> bool {
        self.as_share().orphan_scan_enabled
    }

    /// Largest request body the upload route accepts.
    pub fn max_request_body_bytes(&self) -> usize {
        self.max_file_size_bytes()
            .saturating_mul(self.max_files_per_upload())
            .saturating_add(64 * 1024)
    }
}

fn is_production_env(environment: &str) -> bool {
    let environment = environment.to_lowercase();
    environment == "production" || environment == "prod"
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn env_flag(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().to_lowercase().parse().ok())
        .unwrap_or(default)
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.trim().is_empty())
}

impl ShareConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production_env(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", MAX_CONNECTIONS),
            db_timeout_seconds: env_parse("DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS),
            environment,
        };

        let record_store = match env_non_empty("RECORD_STORE") {
            Some(s) => s.parse()?,
            None => RecordStoreBackend::Postgres,
        };

        let storage_backend = match env_non_empty("STORAGE_BACKEND") {
            Some(s) => Some(s.parse()?),
            None => None,
        };

        let config = ShareConfig {
            base,
            record_store,
            database_url: env_non_empty("DATABASE_URL"),
            storage_backend,
            s3_bucket: env_non_empty("S3_BUCKET"),
            s3_region: env_non_empty("S3_REGION"),
            s3_endpoint: env_non_empty("S3_ENDPOINT"),
            aws_region: env_non_empty("AWS_REGION"),
            local_storage_path: env_non_empty("LOCAL_STORAGE_PATH"),
            local_storage_base_url: env_non_empty("LOCAL_STORAGE_BASE_URL"),
            public_base_url: env_non_empty("PUBLIC_BASE_URL"),
            code_length: env_parse("CODE_LENGTH", CODE_LENGTH),
            max_code_attempts: env_parse("MAX_CODE_ATTEMPTS", MAX_CODE_ATTEMPTS),
            max_file_size_bytes: env_parse("MAX_FILE_SIZE_MB", MAX_FILE_SIZE_MB) * 1024 * 1024,
            max_files_per_upload: env_parse("MAX_FILES_PER_UPLOAD", MAX_FILES_PER_UPLOAD),
            rollback_failed_uploads: env_flag("ROLLBACK_FAILED_UPLOADS", true),
            retention_seconds: env_parse("RETENTION_SECONDS", RETENTION_SECONDS),
            sweep_batch_size: env_parse("SWEEP_BATCH_SIZE", SWEEP_BATCH_SIZE),
            sweep_token: env_non_empty("SWEEP_TOKEN"),
            sweep_interval_secs: env_parse("SWEEP_INTERVAL_SECS", 0),
            orphan_scan_enabled: env_flag("ORPHAN_SCAN_ENABLED", true),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.record_store == RecordStoreBackend::Postgres {
            match self.database_url.as_deref() {
                None => {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL must be set when RECORD_STORE is postgres"
                    ))
                }
                Some(url)
                    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") =>
                {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL must be a valid PostgreSQL connection string"
                    ))
                }
                Some(_) => {}
            }
        }

        if is_production_env(&self.base.environment)
            && self.record_store == RecordStoreBackend::Memory
        {
            return Err(anyhow::anyhow!(
                "RECORD_STORE=memory is not allowed in production"
            ));
        }

        if self.code_length < MIN_CODE_LENGTH {
            return Err(anyhow::anyhow!(
                "CODE_LENGTH must be at least {}",
                MIN_CODE_LENGTH
            ));
        }

        if self.max_code_attempts == 0 {
            return Err(anyhow::anyhow!("MAX_CODE_ATTEMPTS must be at least 1"));
        }

        if self.retention_seconds == 0 {
            return Err(anyhow::anyhow!("RETENTION_SECONDS must be greater than 0"));
        }

        if self.sweep_batch_size <= 0 {
            return Err(anyhow::anyhow!("SWEEP_BATCH_SIZE must be greater than 0"));
        }

        if self.max_files_per_upload == 0 {
            return Err(anyhow::anyhow!("MAX_FILES_PER_UPLOAD must be at least 1"));
        }

        // Validate storage backend configuration
        let backend = self.storage_backend.unwrap_or(StorageBackend::S3);
        match backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }
}
