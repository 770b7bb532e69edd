mod error;
mod service;

pub use error::IngestError;
pub use service::{IngestSettings, UploadIngestor};
