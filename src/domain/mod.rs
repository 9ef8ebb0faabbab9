//! # Domain Layer
//!
//! バッチアップロードセッションの核心的なルールとエンティティを定義します。
//!
//! ## 特徴
//!
//! - HTTPやファイルシステムについて何も知らない
//! - セッションの状態遷移と検証ルールのみを持つ
//!
//! ## 構成要素
//!
//! - **entities**: ビジネスエンティティ（Batch, StagedFile, Sessionなど）
//! - **errors**: セッション操作のエラー種別
//! - **repositories**: BatchService trait（インターフェース定義のみ）
//! - **services**: Domain Service（アップロード可否の検証）

pub mod entities;
pub mod errors;
pub mod repositories;
pub mod services;
