//! HTTP client for the clipshare API.

use anyhow::{Context, Result};
use bytes::Bytes;
use clipshare_core::models::{ManifestResponse, SweepReport, UploadResponse};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::time::Duration;

const API_PREFIX: &str = "/api/v0";
const SWEEP_PATH: &str = "/internal/sweep";

#[derive(Clone, Debug)]
pub struct ShareClient {
    client: Client,
    base_url: String,
    sweep_token: Option<String>,
}

impl ShareClient {
    pub fn new(base_url: String, sweep_token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            sweep_token,
        })
    }

    /// Create client from environment: CLIPSHARE_API_URL, optional CLIPSHARE_SWEEP_TOKEN.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("CLIPSHARE_API_URL")
            .unwrap_or_else(|_| "http://localhost:4000".to_string());
        let sweep_token = std::env::var("CLIPSHARE_SWEEP_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        Self::new(base_url, sweep_token)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Upload local files as one batch, in the given order.
    pub async fn send(&self, paths: &[PathBuf]) -> Result<UploadResponse> {
        let mut form = reqwest::multipart::Form::new();
        for path in paths {
            let data = tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .with_context(|| format!("{} has no usable file name", path.display()))?
                .to_string();
            let part = reqwest::multipart::Part::bytes(data)
                .file_name(name)
                .mime_str(crate::content_type_for(path))
                .context("Invalid content type")?;
            form = form.part("file", part);
        }

        let response = self
            .client
            .post(self.build_url(&format!("{}/uploads", API_PREFIX)))
            .multipart(form)
            .send()
            .await
            .context("Failed to send request")?;

        parse_json(response).await
    }

    /// Look up the files shared under `code`.
    pub async fn manifest(&self, code: &str) -> Result<ManifestResponse> {
        let response = self
            .client
            .get(self.build_url(&format!("{}/receive", API_PREFIX)))
            .query(&[("code", code)])
            .send()
            .await
            .context("Failed to send request")?;

        parse_json(response).await
    }

    /// Fetch one file by the URL listed in a manifest.
    pub async fn download(&self, url: &str) -> Result<Bytes> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;
        let response = check_status(response).await?;
        response.bytes().await.context("Failed to read file body")
    }

    /// Trigger one expiration sweep.
    pub async fn sweep(&self) -> Result<SweepReport> {
        let mut request = self.client.post(self.build_url(SWEEP_PATH));
        if let Some(token) = &self.sweep_token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.context("Failed to send request")?;

        parse_json(response).await
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    let message = serde_json::from_str::<serde_json::Value>(&error_text)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
        .unwrap_or(error_text);

    Err(anyhow::anyhow!(
        "API request failed with status {}: {}",
        status,
        message
    ))
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let response = check_status(response).await?;
    response
        .json()
        .await
        .context("Failed to parse response as JSON")
}
