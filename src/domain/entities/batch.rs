//! # Batch Value Object
//!
//! サーバー側で割り当てられるバッチのバリューオブジェクト

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// バッチ識別子
///
/// サーバーが払い出す不透明な識別子。中身の形式（UUIDなど）には依存しない。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(String);

impl BatchId {
    /// 新しいバッチ識別子を作成
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// 文字列としての識別子を返す
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BatchId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for BatchId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// バッチ
///
/// 取得に成功した時点で作成され、以後は不変。リセット時には新しいインスタンスに置き換わる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    id: BatchId,
    created_at: DateTime<Utc>,
}

impl Batch {
    /// 新しいバッチを作成
    ///
    /// # Arguments
    ///
    /// * `id` - サーバーが返したバッチ識別子
    /// * `created_at` - 取得時刻（クライアント側）
    pub fn new(id: BatchId, created_at: DateTime<Utc>) -> Self {
        Self { id, created_at }
    }

    /// 現在時刻でバッチを作成
    pub fn acquired_now(id: BatchId) -> Self {
        Self::new(id, Utc::now())
    }

    pub fn id(&self) -> &BatchId {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_batch_id_display() {
        let id = BatchId::new("5f0c6b1e-0000-4000-8000-000000000001");
        assert_eq!(id.to_string(), "5f0c6b1e-0000-4000-8000-000000000001");
        assert_eq!(id.as_str(), "5f0c6b1e-0000-4000-8000-000000000001");
    }

    #[test]
    fn test_batch_id_serializes_as_plain_string() {
        let id = BatchId::from("batch-001");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"batch-001\"");

        let parsed: BatchId = serde_json::from_str("\"batch-002\"").unwrap();
        assert_eq!(parsed, BatchId::from("batch-002"));
    }

    #[test]
    fn test_batch_new() {
        let created_at = Utc.with_ymd_and_hms(2024, 12, 25, 10, 0, 0).unwrap();
        let batch = Batch::new(BatchId::from("batch-001"), created_at);

        assert_eq!(batch.id().as_str(), "batch-001");
        assert_eq!(batch.created_at(), created_at);
    }

    #[test]
    fn test_batch_acquired_now() {
        let before = Utc::now();
        let batch = Batch::acquired_now(BatchId::from("batch-001"));
        assert!(batch.created_at() >= before);
    }
}
