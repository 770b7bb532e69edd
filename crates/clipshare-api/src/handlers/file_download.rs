//! File route: streams a shared blob while its upload is still on record.
//! Local storage public URLs point here.

use crate::constants::CODE_NOT_FOUND_MESSAGE;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};
use clipshare_core::AppError;
use clipshare_storage::code_from_key;
use futures::StreamExt;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/files/{key}",
    tag = "files",
    params(("key" = String, Path, description = "Storage key: `uploads/{code}/{name}`")),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 404, description = "Invalid code or files not found.", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "download_file"))]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Response, HttpAppError> {
    let not_found = || HttpAppError(AppError::NotFound(CODE_NOT_FOUND_MESSAGE.to_string()));

    let code = code_from_key(&key).ok_or_else(not_found)?;
    let record = state.resolver.resolve(code).await?;
    let entry = record
        .files
        .iter()
        .find(|f| f.storage_path == key)
        .ok_or_else(not_found)?;

    // A blob deleted by a concurrent sweep surfaces as NotFound here.
    let stream = state.storage.download_stream(&entry.storage_path).await?;

    let body_stream = stream.map(|result| {
        result.map_err(|e| std::io::Error::other(format!("Storage stream error: {}", e)))
    });

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, entry.content_type.as_str())
        .header(
            header::CONTENT_DISPOSITION,
            format!(
                "inline; filename*=UTF-8''{}",
                utf8_percent_encode(&entry.name, NON_ALPHANUMERIC)
            ),
        )
        .header(header::CACHE_CONTROL, "private, max-age=60");
    if let Some(size) = entry.size {
        builder = builder.header(header::CONTENT_LENGTH, size);
    }

    builder.body(Body::from_stream(body_stream)).map_err(|e| {
        tracing::error!(error = %e, "Failed to build response");
        HttpAppError::from(AppError::Internal(e.to_string()))
    })
}
