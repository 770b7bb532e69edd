//! Data models for the application
//!
//! Upload records and their file manifests, plus the sweep report produced
//! by the expiration reaper.

mod sweep;
mod upload;

pub use sweep::*;
pub use upload::*;
