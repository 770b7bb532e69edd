//! Clipshare Storage Library
//!
//! Blob storage abstraction and its backends (S3 via `object_store`, local filesystem).
//!
//! # Storage key format
//!
//! Every blob belongs to exactly one upload code: `uploads/{code}/{filename}`.
//! Keys must not contain a `..` segment or a leading `/`. Key derivation lives in the
//! `keys` module so all backends and the services agree on it.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use clipshare_core::StorageBackend;
pub use factory::create_storage;
pub use keys::{code_from_key, storage_key, UPLOAD_PREFIX};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{ByteStream, Storage, StorageError, StorageResult, StoredObject};
