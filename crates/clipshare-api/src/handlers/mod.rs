pub mod file_download;
pub mod manifest;
pub mod sweep;
pub mod upload;
