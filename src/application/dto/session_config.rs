//! # Session Configuration DTO
//!
//! バッチセッションの設定のData Transfer Object

use crate::domain::entities::profiling_request::DEFAULT_OCCURRENCE;
use crate::domain::services::readiness::MIN_FILES;

/// 既定の同時アップロード数の上限
pub const DEFAULT_MAX_CONCURRENT_UPLOADS: usize = 200;

/// セッション設定
///
/// BatchSessionControllerの挙動を決める設定情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// アップロードに必要な最小ファイル数（5以上）
    pub min_files: usize,
    /// 同時アップロード数の上限（1以上）
    pub max_concurrent_uploads: usize,
    /// 既定の出現率しきい値
    pub default_occurrence: String,
    /// 全ファイルの結果が揃い、全て成功した時点でアップロードを確定するかどうか
    ///
    /// `false` の場合はリクエストの送出完了時点で確定する
    pub confirm_on_resolution: bool,
}

impl SessionConfig {
    /// 新しいセッション設定を作成します。
    ///
    /// `max_concurrent_uploads` が0の場合は1に切り上げます。`min_files` は
    /// サーバーが要求する最小数（5）を下回らないように切り上げます。
    ///
    /// # 例
    ///
    /// ```
    /// use contigsync::application::dto::session_config::SessionConfig;
    ///
    /// let config = SessionConfig::new(2, 0, "95".to_string(), false);
    /// assert_eq!(config.max_concurrent_uploads, 1);
    /// assert_eq!(config.min_files, 5);
    /// ```
    pub fn new(
        min_files: usize,
        max_concurrent_uploads: usize,
        default_occurrence: String,
        confirm_on_resolution: bool,
    ) -> Self {
        Self {
            min_files: min_files.max(MIN_FILES),
            max_concurrent_uploads: max_concurrent_uploads.max(1),
            default_occurrence,
            confirm_on_resolution,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(
            MIN_FILES,
            DEFAULT_MAX_CONCURRENT_UPLOADS,
            DEFAULT_OCCURRENCE.to_string(),
            false,
        )
    }
}
