//! Dry-Run Batch Service
//!
//! ネットワークに接続しないBatchService実装（--dry-run用）

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::info;
use serde_json::json;
use uuid::Uuid;

use crate::domain::entities::batch::{Batch, BatchId};
use crate::domain::entities::profiling_request::ProfilingRequest;
use crate::domain::entities::staged_file::StagedFile;
use crate::domain::repositories::batch_service::{BatchRecord, BatchService};

/// ドライラン用バッチサービス
///
/// UUID v4のバッチIDをローカルで払い出し、アップロードはファイルの読み取り確認のみ行う
pub struct DryRunBatchService;

impl DryRunBatchService {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DryRunBatchService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BatchService for DryRunBatchService {
    async fn acquire_batch(&self) -> Result<Batch> {
        let id = BatchId::new(Uuid::new_v4().to_string());
        info!("[dry-run] Minted batch {}", id);
        Ok(Batch::acquired_now(id))
    }

    async fn upload_file(&self, file: &StagedFile, batch_id: &BatchId) -> Result<()> {
        let metadata = tokio::fs::metadata(&file.path)
            .await
            .with_context(|| format!("Failed to read {}", file.path.display()))?;
        info!(
            "[dry-run] Would upload {} ({} bytes) to batch {}",
            file.name,
            metadata.len(),
            batch_id
        );
        Ok(())
    }

    async fn submit_profiling(&self, request: &ProfilingRequest) -> Result<()> {
        info!(
            "[dry-run] Would submit profiling: {}",
            serde_json::to_string(request)?
        );
        Ok(())
    }

    async fn lookup_batch(&self, batch_id: &BatchId) -> Result<BatchRecord> {
        let mut details = serde_json::Map::new();
        details.insert("dry_run".to_string(), json!(true));
        Ok(BatchRecord {
            id: batch_id.clone(),
            details,
        })
    }
}
