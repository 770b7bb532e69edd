//! Clipshare API Library
//!
//! This crate provides the HTTP handlers, error rendering and application setup
//! for the upload / receive / sweep surface.

// Module declarations
mod api_doc;
pub mod constants;
mod handlers;
pub mod setup;
mod telemetry;
mod utils;

// Public modules
pub mod error;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use telemetry::init_telemetry;
