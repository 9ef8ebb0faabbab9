//! HTTP Batch Service Implementation
//!
//! BatchServiceのHTTP実装

use anyhow::Result;
use async_trait::async_trait;

use crate::adapter::http::client::ProfilingApiClient;
use crate::adapter::http::retry::RetryPolicy;
use crate::domain::entities::batch::{Batch, BatchId};
use crate::domain::entities::profiling_request::ProfilingRequest;
use crate::domain::entities::staged_file::StagedFile;
use crate::domain::repositories::batch_service::{BatchRecord, BatchService};

/// HTTPバッチサービス
///
/// バッチ取得と照会はリトライし、アップロードとプロファイリング起動はリトライしない
pub struct HttpBatchService {
    client: ProfilingApiClient,
    retry: RetryPolicy,
}

impl HttpBatchService {
    pub fn new(client: ProfilingApiClient) -> Self {
        Self::with_retry_policy(client, RetryPolicy::default())
    }

    pub fn with_retry_policy(client: ProfilingApiClient, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[async_trait]
impl BatchService for HttpBatchService {
    async fn acquire_batch(&self) -> Result<Batch> {
        let id = self
            .retry
            .run("Batch acquisition", || self.client.acquire_batch())
            .await?;
        Ok(Batch::acquired_now(id))
    }

    async fn upload_file(&self, file: &StagedFile, batch_id: &BatchId) -> Result<()> {
        self.client.upload_file(file, batch_id).await
    }

    async fn submit_profiling(&self, request: &ProfilingRequest) -> Result<()> {
        self.client.submit_profiling(request).await
    }

    async fn lookup_batch(&self, batch_id: &BatchId) -> Result<BatchRecord> {
        self.retry
            .run("Batch lookup", || self.client.lookup_batch(batch_id))
            .await
    }
}
