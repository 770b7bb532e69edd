//! Shared key derivation for storage backends.
//!
//! Key format: `uploads/{code}/{filename}`. Files of different codes can
//! never collide, and nothing outside `uploads/` belongs to clipshare.

use crate::traits::{StorageError, StorageResult};

/// Top-level prefix every clipshare blob lives under.
pub const UPLOAD_PREFIX: &str = "uploads/";

/// Storage key of `name` inside the upload identified by `code`.
pub fn storage_key(code: &str, name: &str) -> String {
    format!("{}{}/{}", UPLOAD_PREFIX, code, name)
}

/// Upload code a key belongs to. `None` for keys outside the upload prefix.
pub fn code_from_key(key: &str) -> Option<&str> {
    key.strip_prefix(UPLOAD_PREFIX)?
        .split_once('/')
        .map(|(code, _)| code)
        .filter(|code| !code.is_empty())
}

/// Reject keys that could escape the code-scoped layout.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.split('/').any(|segment| segment == "..")
    {
        return Err(StorageError::InvalidKey(format!(
            "Storage key contains invalid characters: {}",
            key
        )));
    }
    Ok(())
}

/// Percent-encode each path segment so the key can be appended to a URL.
pub fn encode_key_for_url(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
