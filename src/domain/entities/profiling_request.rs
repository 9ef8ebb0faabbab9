//! # Profiling Request
//!
//! プロファイリングジョブ起動リクエスト

use serde::{Deserialize, Serialize};

use super::batch::BatchId;

/// 既定の出現率しきい値
pub const DEFAULT_OCCURRENCE: &str = "95";

/// プロファイリング起動リクエスト
///
/// ワイヤ形式は `{ "occurrence": "95", "database": "...", "id": "..." }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilingRequest {
    pub occurrence: String,
    pub database: String,
    pub id: BatchId,
}

impl ProfilingRequest {
    pub fn new(occurrence: impl Into<String>, database: impl Into<String>, id: BatchId) -> Self {
        Self {
            occurrence: occurrence.into(),
            database: database.into(),
            id,
        }
    }
}
