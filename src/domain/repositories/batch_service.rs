//! # Batch Service Trait
//!
//! バッチの払い出し、ファイルのアップロード、プロファイリング起動を抽象化

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(test)]
use mockall::automock;

use crate::domain::entities::batch::{Batch, BatchId};
use crate::domain::entities::profiling_request::ProfilingRequest;
use crate::domain::entities::staged_file::StagedFile;

/// 既存バッチの照会結果
///
/// `id` 以外のフィールドはサーバーの応答をそのまま保持する
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRecord {
    pub id: BatchId,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

/// バッチサービス
///
/// サーバー側のバッチAPIを表すリポジトリ
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BatchService: Send + Sync {
    /// 新しいバッチIDを払い出す
    ///
    /// # Errors
    ///
    /// ネットワークまたはサーバーのエラー
    async fn acquire_batch(&self) -> Result<Batch>;

    /// ファイルを1つアップロードする
    ///
    /// # Arguments
    ///
    /// * `file` - アップロードするファイル
    /// * `batch_id` - 付与するバッチID
    async fn upload_file(&self, file: &StagedFile, batch_id: &BatchId) -> Result<()>;

    /// プロファイリングを起動する
    async fn submit_profiling(&self, request: &ProfilingRequest) -> Result<()>;

    /// 既存バッチを照会する
    async fn lookup_batch(&self, batch_id: &BatchId) -> Result<BatchRecord>;
}
