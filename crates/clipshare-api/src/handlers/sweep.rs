//! Trigger for one expiration sweep, called by an external scheduler.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, HeaderMap},
    Json,
};
use clipshare_core::models::SweepReport;
use clipshare_core::AppError;
use std::sync::Arc;
use subtle::ConstantTimeEq;

#[utoipa::path(
    post,
    path = "/internal/sweep",
    tag = "maintenance",
    security(("sweep_token" = [])),
    responses(
        (status = 200, description = "Sweep ran; per-item failures are counted in the report", body = SweepReport),
        (status = 401, description = "Missing or wrong sweep token", body = ErrorResponse),
        (status = 500, description = "Expired uploads could not be listed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, headers), fields(operation = "sweep"))]
pub async fn trigger_sweep(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<SweepReport>, HttpAppError> {
    if let Some(expected) = state.config.sweep_token() {
        authorize(&headers, expected)?;
    }

    let report = state.reaper.run_sweep().await?;
    Ok(Json(report))
}

fn authorize(headers: &HeaderMap, expected: &str) -> Result<(), AppError> {
    let provided = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or_else(|| AppError::Unauthorized("Missing sweep token".to_string()))?;

    if bool::from(provided.as_bytes().ct_eq(expected.as_bytes())) {
        Ok(())
    } else {
        tracing::warn!("Rejected sweep trigger with wrong token");
        Err(AppError::Unauthorized("Invalid sweep token".to_string()))
    }
}
