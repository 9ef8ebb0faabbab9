//! Profiling API Client
//!
//! reqwestによるプロファイリングサーバーAPIクライアント

use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};
use std::time::Duration;

use super::models::AcquireBatchResponse;
use crate::adapter::config::Config;
use crate::domain::entities::batch::BatchId;
use crate::domain::entities::profiling_request::ProfilingRequest;
use crate::domain::entities::staged_file::StagedFile;
use crate::domain::repositories::batch_service::BatchRecord;

/// Thin wrapper over the four endpoints of the profiling server
#[derive(Clone)]
pub struct ProfilingApiClient {
    http: Client,
    config: Config,
}

impl ProfilingApiClient {
    pub fn new(config: Config) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { http, config })
    }

    /// POST with an empty body; the server answers `{ "id": ... }`
    pub async fn acquire_batch(&self) -> Result<BatchId> {
        let url = self.config.endpoint(&self.config.acquire_path);
        let response = self
            .http
            .post(&url)
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", url))?;

        let body: AcquireBatchResponse = ensure_success(response)
            .await?
            .json()
            .await
            .context("Failed to parse batch creation response")?;
        Ok(body.id)
    }

    /// Multipart POST with the file bytes and a `batch_id` field
    pub async fn upload_file(&self, file: &StagedFile, batch_id: &BatchId) -> Result<()> {
        let bytes = tokio::fs::read(&file.path)
            .await
            .with_context(|| format!("Failed to read {}", file.path.display()))?;

        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file.name.clone()))
            .text("batch_id", batch_id.to_string());

        let url = self.config.endpoint(&self.config.upload_path);
        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("Failed to upload {}", file.name))?;

        ensure_success(response).await?;
        Ok(())
    }

    /// JSON POST of `{ occurrence, database, id }`
    pub async fn submit_profiling(&self, request: &ProfilingRequest) -> Result<()> {
        let url = self.config.endpoint(&self.config.profiling_path);
        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .with_context(|| format!("Failed to submit profiling for batch {}", request.id))?;

        ensure_success(response).await?;
        Ok(())
    }

    /// GET `<lookup_path>/<id>/`
    pub async fn lookup_batch(&self, batch_id: &BatchId) -> Result<BatchRecord> {
        let url = self.lookup_url(batch_id)?;
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", url))?;

        ensure_success(response)
            .await?
            .json()
            .await
            .context("Failed to parse batch lookup response")
    }

    /// ID is pushed as a single path segment, so `/`, `?` and `#` are percent-encoded
    fn lookup_url(&self, batch_id: &BatchId) -> Result<Url> {
        let endpoint = self.config.endpoint(&self.config.lookup_path);
        let mut url =
            Url::parse(&endpoint).with_context(|| format!("Invalid lookup URL {}", endpoint))?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Lookup URL cannot take a path: {}", endpoint))?
            .pop_if_empty()
            .push(batch_id.as_str())
            .push("");
        Ok(url)
    }
}

/// Turn non-2xx responses into errors of the form `"503 Service Unavailable: <body>"`
async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    if body.is_empty() {
        anyhow::bail!("{}", status)
    }
    anyhow::bail!("{}: {}", status, body.trim())
}
