//! Health check handlers and response types.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(5);

/// Run an async check with timeout; returns "healthy", "timeout", or "{prefix}: {error}".
async fn run_check<F, E>(timeout: Duration, f: F, error_prefix: &str) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => format!("{}: {}", error_prefix, e),
        Err(_) => "timeout".to_string(),
    }
}

#[derive(serde::Serialize)]
pub(super) struct HealthCheckResponse {
    pub status: String,
    pub record_store: String,
    pub storage: String,
    pub storage_backend: String,
}

/// Liveness plus a best-effort look at both stores.
pub(super) async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let records = state.records.clone();
    let record_store = run_check(TIMEOUT, async move { records.ping().await }, "unhealthy").await;

    let storage = state.storage.clone();
    let storage_status = run_check(
        TIMEOUT,
        async move {
            storage
                .exists("health-check-non-existent-key")
                .await
                .map(drop)
        },
        "degraded",
    )
    .await;

    let healthy = record_store == "healthy";
    let response = HealthCheckResponse {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        record_store,
        storage: storage_status,
        storage_backend: state.storage.backend_type().to_string(),
    };

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}

/// Readiness probe - the record store answers.
pub(super) async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match tokio::time::timeout(TIMEOUT, state.records.ping()).await {
        Ok(Ok(())) => (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "ready", "record_store": "ready" })),
        ),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Record store readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "status": "not_ready",
                    "record_store": format!("not_ready: {}", e)
                })),
            )
        }
        Err(_) => {
            tracing::error!("Record store readiness check timed out");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "status": "not_ready", "record_store": "timeout" })),
            )
        }
    }
}
