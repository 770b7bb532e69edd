//! Clipshare record store
//!
//! Persistence of upload records: the `UploadStore` seam, its PostgreSQL
//! implementation and a process-local implementation for development and tests.

pub mod db;

pub use db::{
    run_migrations, MemoryUploadStore, PostgresUploadStore, RecordCursor, RecordStoreError,
    UploadStore,
};
