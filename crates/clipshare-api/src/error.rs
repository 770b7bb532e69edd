//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Domain errors
//! (`IngestError`, `ResolveError`, `StorageError`) convert into `AppError`
//! here so every failure renders with the same status, body and log level.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use clipshare_core::{AppError, ErrorMetadata, LogLevel};
use clipshare_services::{IngestError, ResolveError, SweepError};
use clipshare_storage::StorageError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::constants::CODE_NOT_FOUND_MESSAGE;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    /// Suggested action for the client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse
/// (orphan rules: IntoResponse and AppError are both foreign to this crate)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error.detailed_message(), error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        // Details are hidden in production and for sensitive errors.
        let show_details = !is_production_env() && !app_error.is_sensitive();
        let body = ErrorResponse {
            error: app_error.client_message(),
            details: show_details.then(|| app_error.detailed_message()),
            error_type: show_details.then(|| app_error.error_type().to_string()),
            code: app_error.error_code().to_string(),
            recoverable: app_error.is_recoverable(),
            suggested_action: app_error.suggested_action().map(String::from),
        };

        (status, Json(body)).into_response()
    }
}

// Convert domain errors to HttpAppError (avoids orphan rule: we impl for local HttpAppError)

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app = match err {
            StorageError::NotFound(_) => AppError::NotFound(CODE_NOT_FOUND_MESSAGE.to_string()),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::IoError(err) => AppError::Internal(format!("IO error: {}", err)),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
            other => AppError::Storage(other.to_string()),
        };
        HttpAppError(app)
    }
}

impl From<IngestError> for HttpAppError {
    fn from(err: IngestError) -> Self {
        let app = match err {
            IngestError::Validation(msg) => AppError::InvalidInput(msg),
            err @ IngestError::FileTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            IngestError::StorageWrite { file, source } => AppError::UploadFailed {
                file,
                message: source.to_string(),
            },
            IngestError::RecordPersist(source) => AppError::RecordPersist(source.to_string()),
            err @ IngestError::Unavailable(_) => AppError::Unavailable(err.to_string()),
            err @ IngestError::CodeSpaceExhausted { .. } => AppError::Unavailable(err.to_string()),
        };
        HttpAppError(app)
    }
}

impl From<ResolveError> for HttpAppError {
    fn from(err: ResolveError) -> Self {
        let app = match err {
            ResolveError::NotFound => AppError::NotFound(CODE_NOT_FOUND_MESSAGE.to_string()),
            ResolveError::Store(source) => AppError::Unavailable(source.to_string()),
        };
        HttpAppError(app)
    }
}

impl From<SweepError> for HttpAppError {
    fn from(err: SweepError) -> Self {
        HttpAppError(AppError::Internal(err.to_string()))
    }
}
