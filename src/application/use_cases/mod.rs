//! # Use Cases
//!
//! アプリケーションのビジネスフロー（ユースケース）
//!
//! ## ユースケース
//!
//! - **BatchSessionController**: バッチアップロードセッションの制御
//! - **LookupBatchUseCase**: 既存バッチの照会
//! - **StageFilesUseCase**: 候補ファイルのステージ

pub mod batch_session;
pub mod lookup_batch;
pub mod stage_files;
