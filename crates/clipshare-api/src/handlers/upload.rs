use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::extract_multipart_files;
use axum::{extract::Multipart, extract::State, http::StatusCode, Json};
use clipshare_core::models::{SharedFile, UploadResponse};
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/v0/uploads",
    tag = "uploads",
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "One or more fields named `file` (or `files`)"),
    responses(
        (status = 201, description = "Files stored under a new code", body = UploadResponse),
        (status = 400, description = "No files, too many files or an invalid file name", body = ErrorResponse),
        (status = 413, description = "A file is too large", body = ErrorResponse),
        (status = 502, description = "A file could not be stored; the error names it", body = ErrorResponse),
        (status = 500, description = "The upload record could not be saved", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload"))]
pub async fn create_upload(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), HttpAppError> {
    let settings = state.ingestor.settings();
    let files =
        extract_multipart_files(multipart, settings.max_files, settings.max_file_size).await?;

    let record = state.ingestor.ingest(files).await?;

    let response = UploadResponse {
        share_url: state.share_url(&record.code),
        files: record.files.iter().map(SharedFile::from).collect(),
        created_at: record.created_at,
        expires_at: record.expires_at(state.retention()),
        code: record.code,
    };

    Ok((StatusCode::CREATED, Json(response)))
}
