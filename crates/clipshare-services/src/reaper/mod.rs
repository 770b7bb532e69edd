mod service;

pub use service::{ExpirationReaper, ReaperSettings, SweepError};
