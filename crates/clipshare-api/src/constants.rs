//! API constants

/// Versioned prefix of the public API
pub const API_PREFIX: &str = "/api/v0";

/// Prefix the file route is served under; local storage URLs point here.
pub const FILES_PREFIX: &str = "/files";

/// External trigger for one expiration sweep
pub const SWEEP_PATH: &str = "/internal/sweep";

/// Returned for every failed lookup so expired and never-issued codes look alike.
pub const CODE_NOT_FOUND_MESSAGE: &str = "Invalid code or files not found.";
