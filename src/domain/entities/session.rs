//! # Session Aggregate
//!
//! BatchSessionControllerだけが変更できる唯一の可変集約

use std::fmt;

use super::batch::Batch;
use super::staged_file::FileSet;

/// セッションのフェーズ
///
/// `Init → AwaitingReadiness → Uploading → Uploaded → Submitted`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SessionPhase {
    Init,
    AwaitingReadiness,
    Uploading,
    Uploaded,
    Submitted,
}

impl SessionPhase {
    /// アップロードが確定済み（Uploaded以降）かどうか
    pub fn is_upload_confirmed(self) -> bool {
        matches!(self, SessionPhase::Uploaded | SessionPhase::Submitted)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::Init => "INIT",
            SessionPhase::AwaitingReadiness => "AWAITING_READINESS",
            SessionPhase::Uploading => "UPLOADING",
            SessionPhase::Uploaded => "UPLOADED",
            SessionPhase::Submitted => "SUBMITTED",
        };
        f.write_str(name)
    }
}

/// データベース選択（空文字列は未選択）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseSelection {
    pub name: String,
}

impl DatabaseSelection {
    pub fn is_chosen(&self) -> bool {
        !self.name.is_empty()
    }
}

/// ファイルごとのアップロード結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub name: String,
    pub succeeded: bool,
}

impl UploadResult {
    pub fn success(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            succeeded: true,
        }
    }

    pub fn failure(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            succeeded: false,
        }
    }
}

/// セッション
#[derive(Debug, Clone)]
pub struct Session {
    pub batch: Option<Batch>,
    pub file_set: FileSet,
    pub selection: DatabaseSelection,
    pub phase: SessionPhase,
    pub upload_results: Vec<UploadResult>,
    /// リセットのたびに増える世代番号。古い世代の結果を破棄するために使う
    pub generation: u64,
}

impl Session {
    pub fn new() -> Self {
        Self {
            batch: None,
            file_set: FileSet::new(),
            selection: DatabaseSelection::default(),
            phase: SessionPhase::Init,
            upload_results: Vec::new(),
            generation: 0,
        }
    }

    /// ファイルと結果を破棄し、新しい世代に進める
    ///
    /// データベース選択はセレクター側の入力なので保持する。
    pub fn reset(&mut self) {
        self.file_set.clear();
        self.upload_results.clear();
        self.batch = None;
        self.phase = SessionPhase::Init;
        self.generation += 1;
    }

    /// 現在の世代に属する結果のみ記録する。記録した場合 `true`
    pub fn record_result(&mut self, generation: u64, result: UploadResult) -> bool {
        if generation != self.generation {
            return false;
        }
        self.upload_results.push(result);
        true
    }

    pub fn failed_uploads(&self) -> usize {
        self.upload_results.iter().filter(|r| !r.succeeded).count()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
