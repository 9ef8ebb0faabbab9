//! # Application Layer
//!
//! バッチアップロードセッションのビジネスフロー（ユースケース）
//!
//! ## 特徴
//!
//! - Domain層のエンティティとサービスを組み合わせてセッションを進める
//! - BatchService traitに依存（HTTP実装には依存しない）
//!
//! ## 構成要素
//!
//! - **dto**: Data Transfer Object
//! - **use_cases**: ユースケース

pub mod dto;
pub mod use_cases;
