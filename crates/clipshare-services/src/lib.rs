//! Clipshare Services Layer
//!
//! The upload lifecycle: code generation, ingestion of a file batch under a
//! fresh code, resolution of a code back to its manifest, and the expiration
//! sweep that purges records and their blobs. Keep thin HTTP handling in
//! clipshare-api; keep coordination between storage and records here.

pub mod code;
pub mod ingest;
pub mod reaper;
pub mod resolve;

#[cfg(test)]
mod testing;

pub use clipshare_db::{MemoryUploadStore, PostgresUploadStore, UploadStore};
pub use clipshare_storage::{create_storage, LocalStorage, S3Storage, Storage, StorageError};
pub use code::{CodeGenerator, RandomCodeGenerator, CODE_ALPHABET_SIZE, MIN_CODE_LENGTH};
pub use ingest::{IngestError, IngestSettings, UploadIngestor};
pub use reaper::{ExpirationReaper, ReaperSettings, SweepError};
pub use resolve::{ResolveError, RetrievalResolver};
