//! Optional in-process sweep ticker.
//!
//! Off unless `SWEEP_INTERVAL_SECS` is set. Deployments that prefer an
//! external scheduler call the sweep endpoint instead; both can run at once.

use crate::state::AppState;
use clipshare_core::Config;
use clipshare_services::{ExpirationReaper, SweepError};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Spawn the ticker when an interval is configured.
pub fn spawn_sweeper(config: &Config, state: Arc<AppState>) -> Option<JoinHandle<()>> {
    let period = config.sweep_interval()?;
    tracing::info!(
        interval_secs = period.as_secs(),
        "In-process sweep ticker enabled"
    );
    Some(spawn_sweep_task(state.reaper.clone(), period))
}

/// Run one sweep every `period`, starting one period from now.
pub fn spawn_sweep_task(reaper: ExpirationReaper, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            match reaper.run_sweep().await {
                Ok(report) if report.has_failures() => {
                    tracing::warn!(?report, "Scheduled sweep finished with failures");
                }
                Ok(report) => {
                    tracing::debug!(?report, "Scheduled sweep finished");
                }
                Err(SweepError::Scan { source, partial }) => {
                    tracing::error!(
                        error = %source,
                        ?partial,
                        "Scheduled sweep could not scan for expired uploads"
                    );
                }
            }
        }
    })
}
