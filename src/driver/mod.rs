//! # Driver Layer (Presentation)
//!
//! CLIを提供し、依存性注入で全てを組み立てる
//!
//! ## 構成要素
//!
//! - **cli**: CLI引数のパース（ステージングエリア、データベース選択、バッチ照会の入力）
//! - **workflow**: ワークフロー全体のオーケストレーション

pub mod cli;
pub mod workflow;

pub use cli::Args;
pub use workflow::ProfilingWorkflow;
