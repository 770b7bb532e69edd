//! Upload record repositories
//
// Store trait, cursor and error type
mod store;
//
// PostgreSQL implementation
mod postgres;
//
// In-memory implementation
mod memory;

pub use memory::MemoryUploadStore;
pub use postgres::{run_migrations, PostgresUploadStore};
pub use store::{RecordCursor, RecordStoreError, UploadStore};
