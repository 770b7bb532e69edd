//! Workflow helpers for integration tests (upload, resolve, fetch).

use axum_test::multipart::{MultipartForm, Part};
use axum_test::{TestResponse, TestServer};
use clipshare_core::models::{ManifestResponse, UploadResponse};

use super::api_path;
use super::storage::TEST_BASE_URL;

/// Post `files` (name, content) as one multipart upload.
pub async fn upload_files(client: &TestServer, files: &[(&str, &str)]) -> TestResponse {
    let mut form = MultipartForm::new();
    for (name, content) in files {
        let part = Part::bytes(bytes::Bytes::from(content.to_string()))
            .file_name(*name)
            .mime_type("text/plain");
        form = form.add_part("file", part);
    }
    client.post(&api_path("/uploads")).multipart(form).await
}

/// Upload and return the parsed response, asserting success.
pub async fn upload_ok(client: &TestServer, files: &[(&str, &str)]) -> UploadResponse {
    let response = upload_files(client, files).await;
    assert_eq!(response.status_code(), 201, "upload failed: {}", response.text());
    response.json()
}

pub async fn get_manifest(client: &TestServer, code: &str) -> TestResponse {
    client.get(&api_path(&format!("/uploads/{}", code))).await
}

pub async fn manifest_ok(client: &TestServer, code: &str) -> ManifestResponse {
    let response = get_manifest(client, code).await;
    assert_eq!(response.status_code(), 200, "lookup failed: {}", response.text());
    response.json()
}

/// Fetch a file by the public URL handed out in a manifest.
pub async fn fetch_file(client: &TestServer, url: &str) -> TestResponse {
    let path = url
        .strip_prefix(TEST_BASE_URL)
        .map(|rest| format!("{}{}", clipshare_api::constants::FILES_PREFIX, rest))
        .expect("URL should point at the file route");
    client.get(&path).await
}

pub async fn sweep(client: &TestServer) -> TestResponse {
    client.post(clipshare_api::constants::SWEEP_PATH).await
}

/// Flip the case of every letter.
pub fn swap_case(code: &str) -> String {
    code.chars()
        .map(|c| {
            if c.is_ascii_uppercase() {
                c.to_ascii_lowercase()
            } else {
                c.to_ascii_uppercase()
            }
        })
        .collect()
}
