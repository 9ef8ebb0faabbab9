//! # Lookup Batch Use Case
//!
//! 既存バッチの照会ユースケース（アクティブなセッションとは独立）

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::domain::entities::batch::BatchId;
use crate::domain::repositories::batch_service::{BatchRecord, BatchService};

/// 既存バッチの照会ユースケース
pub struct LookupBatchUseCase<S: BatchService> {
    batch_service: Arc<S>,
}

impl<S: BatchService> LookupBatchUseCase<S> {
    pub fn new(batch_service: Arc<S>) -> Self {
        Self { batch_service }
    }

    /// バッチを照会する
    ///
    /// # Errors
    ///
    /// IDが空の場合、または照会に失敗した場合
    pub async fn execute(&self, batch_id: &str) -> Result<BatchRecord> {
        let batch_id = batch_id.trim();
        if batch_id.is_empty() {
            anyhow::bail!("batch id must not be empty");
        }

        let id = BatchId::from(batch_id);
        self.batch_service
            .lookup_batch(&id)
            .await
            .with_context(|| format!("Failed to look up batch {}", id))
    }
}
