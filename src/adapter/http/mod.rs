//! HTTP Adapter Modules
//!
//! プロファイリングサーバーのHTTP APIとの統合

pub mod client;
pub mod models;
pub mod retry;
