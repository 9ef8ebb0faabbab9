//! # Readiness Service
//!
//! アップロード可否の検証サービス

use crate::domain::entities::batch::BatchId;
use crate::domain::entities::session::Session;
use crate::domain::errors::SessionError;

/// アップロードに必要な最小ファイル数
pub const MIN_FILES: usize = 5;

/// アップロード可否の検証
pub struct ReadinessService;

impl ReadinessService {
    /// セッションがアップロード可能かを検証し、付与するバッチIDを返す
    ///
    /// 検証順序: ファイル数 → データベース選択 → バッチの有無
    ///
    /// # Arguments
    ///
    /// * `session` - 検証対象のセッション
    /// * `min_files` - 必要な最小ファイル数（この値ちょうどで可）
    ///
    /// # Errors
    ///
    /// `InsufficientFiles`, `NoDatabaseSelected`, `NoActiveBatch`
    pub fn validate(session: &Session, min_files: usize) -> Result<BatchId, SessionError> {
        let staged = session.file_set.len();
        if staged < min_files {
            return Err(SessionError::InsufficientFiles {
                staged,
                required: min_files,
            });
        }

        if !session.selection.is_chosen() {
            return Err(SessionError::NoDatabaseSelected);
        }

        session
            .batch
            .as_ref()
            .map(|batch| batch.id().clone())
            .ok_or(SessionError::NoActiveBatch)
    }
}
