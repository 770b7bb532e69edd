//! Upload and receive integration tests.
//!
//! Run with: `cargo test -p clipshare-api --test uploads_test`

mod helpers;

use axum_test::multipart::MultipartForm;
use clipshare_api::constants::CODE_NOT_FOUND_MESSAGE;
use clipshare_api::ErrorResponse;
use clipshare_core::models::ManifestResponse;
use helpers::workflows::{fetch_file, get_manifest, manifest_ok, swap_case, upload_files, upload_ok};
use helpers::{api_path, setup_test_app, setup_test_app_with};

#[tokio::test]
async fn test_upload_then_receive_files_in_order() {
    let app = setup_test_app().await;
    let client = app.client();

    let upload = upload_ok(client, &[("a.txt", "first"), ("b.txt", "second")]).await;
    assert_eq!(upload.code.len(), 8);
    assert!(upload.code.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_eq!(
        upload.share_url.as_deref(),
        Some(format!("http://localhost/receive?code={}", upload.code).as_str())
    );
    assert_eq!(
        upload.expires_at - upload.created_at,
        chrono::Duration::seconds(300)
    );

    let manifest = manifest_ok(client, &upload.code).await;
    let names: Vec<&str> = manifest.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["a.txt", "b.txt"]);
    assert_eq!(manifest.files, upload.files);

    let first = fetch_file(client, &manifest.files[0].url).await;
    assert_eq!(first.status_code(), 200);
    assert_eq!(first.text(), "first");
    assert_eq!(first.header("content-type"), "text/plain");

    let second = fetch_file(client, &manifest.files[1].url).await;
    assert_eq!(second.text(), "second");
}

#[tokio::test]
async fn test_receive_by_query_trims_whitespace() {
    let app = setup_test_app().await;
    let client = app.client();

    let upload = upload_ok(client, &[("notes.txt", "hello")]).await;

    let response = client
        .get(&api_path("/receive"))
        .add_query_param("code", format!("  {} ", upload.code))
        .await;
    assert_eq!(response.status_code(), 200);
    let manifest: ManifestResponse = response.json();
    assert_eq!(manifest.code, upload.code);
}

#[tokio::test]
async fn test_wrong_case_code_is_not_found() {
    let app = setup_test_app().await;
    let client = app.client();

    let upload = upload_ok(client, &[("a.txt", "first")]).await;
    let swapped = swap_case(&upload.code);
    if swapped == upload.code {
        // All digits; nothing to flip.
        return;
    }

    let response = get_manifest(client, &swapped).await;
    assert_eq!(response.status_code(), 404);
    let body: ErrorResponse = response.json();
    assert_eq!(body.error, CODE_NOT_FOUND_MESSAGE);
}

#[tokio::test]
async fn test_unknown_and_malformed_codes_share_one_message() {
    let app = setup_test_app().await;
    let client = app.client();

    for code in ["Zz9Zz9Zz", "bad-code!", "x"] {
        let response = get_manifest(client, code).await;
        assert_eq!(response.status_code(), 404, "code {}", code);
        let body: ErrorResponse = response.json();
        assert_eq!(body.error, CODE_NOT_FOUND_MESSAGE);
    }

    let response = client.get(&api_path("/receive")).await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_upload_without_files_is_rejected() {
    let app = setup_test_app().await;
    let client = app.client();

    let form = MultipartForm::new().add_text("note", "no files here");
    let response = client.post(&api_path("/uploads")).multipart(form).await;

    assert_eq!(response.status_code(), 400);
    assert!(app.records.is_empty().await);
}

#[tokio::test]
async fn test_upload_with_too_many_files_is_rejected() {
    let app = setup_test_app_with(|c| c.max_files_per_upload = 2).await;
    let client = app.client();

    let response = upload_files(client, &[("a.txt", "1"), ("b.txt", "2"), ("c.txt", "3")]).await;

    assert_eq!(response.status_code(), 400);
    assert!(app.records.is_empty().await);
    assert!(app.storage.keys().await.is_empty());
}

#[tokio::test]
async fn test_duplicate_names_are_rejected() {
    let app = setup_test_app().await;
    let client = app.client();

    let response = upload_files(client, &[("same.txt", "1"), ("same.txt", "2")]).await;

    assert_eq!(response.status_code(), 400);
    assert!(app.records.is_empty().await);
}

#[tokio::test]
async fn test_oversized_file_is_rejected() {
    let app = setup_test_app_with(|c| c.max_file_size_bytes = 4).await;
    let client = app.client();

    let response = upload_files(client, &[("big.txt", "way more than four bytes")]).await;

    assert_eq!(response.status_code(), 413);
    assert!(app.records.is_empty().await);

    let large = "x".repeat(256 * 1024);
    let response = upload_files(client, &[("small.txt", "ok"), ("large.bin", &large)]).await;
    assert_eq!(response.status_code(), 413);
    assert!(app.records.is_empty().await);
    assert!(app.storage.keys().await.is_empty());
}

#[tokio::test]
async fn test_failed_write_names_file_and_records_nothing() {
    let app = setup_test_app().await;
    let client = app.client();
    app.storage.fail_put_for("b.txt");

    let response = upload_files(client, &[("a.txt", "first"), ("b.txt", "second")]).await;

    assert_eq!(response.status_code(), 502);
    let body: ErrorResponse = response.json();
    assert!(body.error.contains("b.txt"), "error was {}", body.error);
    assert!(app.records.is_empty().await);
    // The blob written before the failure was rolled back.
    assert!(app.storage.keys().await.is_empty());
}

#[tokio::test]
async fn test_file_route_rejects_keys_outside_an_upload() {
    let app = setup_test_app().await;
    let client = app.client();

    let upload = upload_ok(client, &[("a.txt", "first")]).await;

    let missing = client.get(&format!("/files/uploads/{}/other.txt", upload.code)).await;
    assert_eq!(missing.status_code(), 404);

    let unprefixed = client.get(&format!("/files/{}/a.txt", upload.code)).await;
    assert_eq!(unprefixed.status_code(), 404);

    let no_code = client.get("/files/a.txt").await;
    assert_eq!(no_code.status_code(), 404);
}

#[tokio::test]
async fn test_health_and_openapi() {
    let app = setup_test_app().await;
    let client = app.client();

    let health = client.get("/health").await;
    assert_eq!(health.status_code(), 200);
    let body: serde_json::Value = health.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage_backend"], "local");

    assert_eq!(client.get("/health/ready").await.status_code(), 200);

    let spec = client.get("/api/openapi.json").await;
    assert_eq!(spec.status_code(), 200);
    let spec: serde_json::Value = spec.json();
    assert!(spec["paths"]["/api/v0/uploads"].is_object());
}
