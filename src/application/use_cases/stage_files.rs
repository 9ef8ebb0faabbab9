//! # Stage Files Use Case
//!
//! ステージングエリアの候補ファイルをセッションに反映するユースケース

use std::sync::Arc;

use anyhow::Result;
use log::warn;

use crate::application::use_cases::batch_session::BatchSessionController;
use crate::domain::errors::SessionError;
use crate::domain::repositories::batch_service::BatchService;
use crate::domain::repositories::staging_area::StagingArea;

/// ステージ結果
#[derive(Debug, Clone, Default)]
pub struct StagingReport {
    /// ステージされたファイル名
    pub staged: Vec<String>,
    /// 拒否された入力と理由
    pub rejected: Vec<(String, SessionError)>,
}

/// ファイルステージユースケース
pub struct StageFilesUseCase<A: StagingArea> {
    staging_area: Arc<A>,
}

impl<A: StagingArea> StageFilesUseCase<A> {
    pub fn new(staging_area: Arc<A>) -> Self {
        Self { staging_area }
    }

    /// 入力から候補を集めてステージする
    ///
    /// 拡張子が不正なファイルや重複はステージ時に拒否され、レポートに記録される。
    ///
    /// # Errors
    ///
    /// 候補の収集に失敗した場合
    pub async fn execute<S: BatchService + 'static>(
        &self,
        controller: &BatchSessionController<S>,
        inputs: &[String],
    ) -> Result<StagingReport> {
        let candidates = self.staging_area.collect_candidates(inputs).await?;
        let mut report = StagingReport::default();

        for path in candidates {
            let display = path.display().to_string();
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| display.clone());

            match controller.stage_path(path).await {
                Ok(()) => report.staged.push(name),
                Err(e) => {
                    warn!("Rejected {}: {}", display, e);
                    report.rejected.push((display, e));
                }
            }
        }

        Ok(report)
    }
}
