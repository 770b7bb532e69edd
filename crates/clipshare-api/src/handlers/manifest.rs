use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use clipshare_core::models::ManifestResponse;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ReceiveQuery {
    /// Share code, as embedded in `?code=` links
    #[serde(default)]
    pub code: String,
}

#[utoipa::path(
    get,
    path = "/api/v0/uploads/{code}",
    tag = "uploads",
    params(("code" = String, Path, description = "Share code (case-sensitive)")),
    responses(
        (status = 200, description = "Files shared under the code, in upload order", body = ManifestResponse),
        (status = 404, description = "Invalid code or files not found.", body = ErrorResponse)
    )
)]
pub async fn get_upload(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<ManifestResponse>, HttpAppError> {
    resolve_manifest(&state, &code).await
}

#[utoipa::path(
    get,
    path = "/api/v0/receive",
    tag = "uploads",
    params(ReceiveQuery),
    responses(
        (status = 200, description = "Files shared under the code, in upload order", body = ManifestResponse),
        (status = 404, description = "Invalid code or files not found.", body = ErrorResponse)
    )
)]
pub async fn receive(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReceiveQuery>,
) -> Result<Json<ManifestResponse>, HttpAppError> {
    resolve_manifest(&state, &query.code).await
}

async fn resolve_manifest(
    state: &AppState,
    code: &str,
) -> Result<Json<ManifestResponse>, HttpAppError> {
    let record = state.resolver.resolve(code).await?;
    Ok(Json(ManifestResponse::from_record(
        &record,
        state.retention(),
    )))
}
