//! # Domain Entities
//!
//! ビジネスエンティティとバリューオブジェクトを定義するモジュール
//!
//! ## エンティティ
//!
//! - **Batch**: サーバー側で割り当てられたバッチ
//! - **StagedFile / FileSet**: アップロード前のファイル
//! - **Session**: コントローラーが所有する唯一の可変集約
//! - **ProfilingRequest**: プロファイリング起動リクエスト

pub mod batch;
pub mod profiling_request;
pub mod session;
pub mod staged_file;
