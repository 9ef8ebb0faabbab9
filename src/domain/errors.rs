//! # Session Errors
//!
//! セッション操作で発生するエラー種別
//!
//! どのエラーもプロセスにとって致命的ではなく、ユーザー操作（ファイル追加、
//! データベース選択、バッチ再取得）で回復できる。

use thiserror::Error;

use crate::domain::entities::session::SessionPhase;

/// セッション操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// バッチIDの取得に失敗した（ネットワーク/サーバーエラー）
    #[error("failed to acquire a batch id: {0}")]
    BatchAcquisitionFailed(String),

    /// 有効なバッチが既にある（切り替えは remove_all で行う）
    #[error("batch {0} is already active; remove all files to start a new batch")]
    BatchAlreadyActive(String),

    /// 有効なバッチが存在しない
    #[error("no active batch; acquire a batch before uploading")]
    NoActiveBatch,

    /// ステージされたファイルが最小数に満たない
    #[error("please upload at least {required} files ({staged} staged)")]
    InsufficientFiles { staged: usize, required: usize },

    /// データベースが選択されていない
    #[error("please choose a database")]
    NoDatabaseSelected,

    /// アップロードが確定していない
    #[error("please upload files first")]
    UploadNotConfirmed,

    /// アップロードは既に要求されている
    #[error("upload already requested (phase {0})")]
    UploadAlreadyRequested(SessionPhase),

    /// 受け付けない拡張子のファイル
    #[error("unsupported file type: {0} (expected .fasta, .fa or .fna)")]
    UnsupportedFileType(String),

    /// 同名のファイルが既にステージされている
    #[error("file already staged: {0}")]
    DuplicateFile(String),

    /// 一部のファイルのアップロードに失敗した
    #[error("{failed} of {total} uploads failed")]
    UploadIncomplete { failed: usize, total: usize },
}
