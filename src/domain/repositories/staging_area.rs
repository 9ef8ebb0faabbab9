//! # Staging Area Trait
//!
//! ステージ候補ファイルの収集を抽象化

use anyhow::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// ステージングエリア
///
/// ユーザーが指定した入力（ファイルやディレクトリ）から候補ファイルを集める。
/// 拡張子の検証はステージ時にコントローラーが行う。
#[async_trait]
pub trait StagingArea: Send + Sync {
    /// 候補ファイルを収集する
    ///
    /// # Arguments
    ///
    /// * `inputs` - ユーザーが指定したパス
    ///
    /// # Returns
    ///
    /// 入力順を保った候補ファイルのパス
    async fn collect_candidates(&self, inputs: &[String]) -> Result<Vec<PathBuf>>;
}
