//! # Domain Repositories
//!
//! 外部コラボレーターのtrait（インターフェース）定義
//!
//! ## 特徴
//!
//! - Domain層では実装を持たない（traitの定義のみ）
//! - Adapter層で具体的な実装を提供（HTTP、ドライラン）

pub mod batch_service;
pub mod staging_area;
