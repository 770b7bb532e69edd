//! Multipart parsing for the upload route

use axum::extract::Multipart;
use bytes::BytesMut;
use clipshare_core::models::NewFile;
use clipshare_core::AppError;

/// Multipart field names that carry a file.
const FILE_FIELDS: [&str; 2] = ["file", "files"];

const MAX_FILENAME_LENGTH: usize = 255;

/// Collect every file field of the form, in the order received.
///
/// Other fields are ignored. Each file is read chunk by chunk and rejected
/// as soon as it grows past `max_file_size`, so at most one chunk beyond the
/// limit is ever held in memory.
pub async fn extract_multipart_files(
    mut multipart: Multipart,
    max_files: usize,
    max_file_size: usize,
) -> Result<Vec<NewFile>, AppError> {
    let mut files = Vec::new();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default();
        if !FILE_FIELDS.contains(&field_name) {
            continue;
        }

        if files.len() >= max_files {
            return Err(AppError::InvalidInput(format!(
                "Too many files (maximum {})",
                max_files
            )));
        }

        let filename = field
            .file_name()
            .map(sanitize_filename)
            .unwrap_or_else(|| format!("file-{}", files.len() + 1));
        let content_type = field
            .content_type()
            .map(normalize_mime_type)
            .unwrap_or("application/octet-stream")
            .to_string();

        let mut data = BytesMut::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read file data: {}", e)))?
        {
            if !append_within_limit(&mut data, &chunk, max_file_size) {
                tracing::warn!(file = %filename, limit = max_file_size, "Rejected oversized file mid-stream");
                return Err(AppError::PayloadTooLarge(format!(
                    "'{}' exceeds the maximum file size of {} bytes",
                    filename, max_file_size
                )));
            }
        }

        files.push(NewFile::new(filename, content_type, data.freeze()));
    }

    Ok(files)
}

/// Append `chunk` unless that would take `buf` past `limit`.
fn append_within_limit(buf: &mut BytesMut, chunk: &[u8], limit: usize) -> bool {
    if buf.len().saturating_add(chunk.len()) > limit {
        return false;
    }
    buf.extend_from_slice(chunk);
    true
}

/// Keep only the final path segment of a client-supplied name.
///
/// Browsers send bare names, but some clients send full paths. What remains
/// is validated again by the ingestor.
pub fn sanitize_filename(filename: &str) -> String {
    let last = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .trim();

    last.chars()
        .filter(|c| !c.is_control())
        .take(MAX_FILENAME_LENGTH)
        .collect()
}

/// Strip MIME parameters ("text/plain; charset=utf-8" -> "text/plain").
fn normalize_mime_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
}
