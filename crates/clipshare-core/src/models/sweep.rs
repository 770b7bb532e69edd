use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Counters produced by one sweep of the expiration reaper.
///
/// Used for observability only; per-item failures are counted here and
/// never abort the sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SweepReport {
    pub records_processed: u64,
    pub blobs_deleted: u64,
    pub blobs_failed: u64,
    pub records_deleted: u64,
    pub records_failed: u64,
    #[serde(default)]
    pub orphan_blobs_deleted: u64,
    #[serde(default)]
    pub orphan_blobs_failed: u64,
}

impl SweepReport {
    pub fn has_failures(&self) -> bool {
        self.blobs_failed > 0 || self.records_failed > 0 || self.orphan_blobs_failed > 0
    }
}
