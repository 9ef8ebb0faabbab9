//! HTTP Retry Logic and Error Classification
//!
//! リトライロジックとエラー分類（バッチ取得と照会のみで使用）

use anyhow::Result;
use log::warn;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

pub const MAX_RETRIES: u32 = 3;
pub const INITIAL_RETRY_DELAY_MS: u64 = 1000;
pub const MAX_RETRY_DELAY_MS: u64 = 32000;

/// Exponential backoff settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            initial_delay_ms: INITIAL_RETRY_DELAY_MS,
            max_delay_ms: MAX_RETRY_DELAY_MS,
        }
    }
}

impl RetryPolicy {
    /// Never retry
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before the `retry_count`-th retry (1-based)
    pub fn delay_for(&self, retry_count: u32) -> u64 {
        let shift = retry_count.saturating_sub(1).min(20);
        std::cmp::min(self.initial_delay_ms.saturating_mul(1 << shift), self.max_delay_ms)
    }

    /// Run `operation`, retrying retryable failures with backoff
    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut retry_count = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    let error_msg = error_chain_to_string(&e);
                    if !is_retryable_error(&error_msg) || retry_count >= self.max_retries {
                        return Err(e);
                    }
                    retry_count += 1;
                    let delay = self.delay_for(retry_count);
                    warn!(
                        "{} failed (attempt {}), retrying in {}ms: {}",
                        label, retry_count, delay, error_msg
                    );
                    sleep(Duration::from_millis(delay)).await;
                }
            }
        }
    }
}

/// Convert error chain to string including all causes
pub fn error_chain_to_string(e: &anyhow::Error) -> String {
    e.chain()
        .map(|cause| cause.to_string())
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Check if an error comes from the connection itself
pub fn is_connection_error(error_msg: &str) -> bool {
    let lower = error_msg.to_lowercase();
    lower.contains("broken pipe")
        || lower.contains("connection reset")
        || lower.contains("connection refused")
        || lower.contains("connection closed")
        || lower.contains("error sending request")
        || lower.contains("unexpected end of file")
}

/// Check if an error is transient on the server side
pub fn is_transient_error(error_msg: &str) -> bool {
    let lower = error_msg.to_lowercase();
    lower.contains("500 ")
        || lower.contains("502 ")
        || lower.contains("503 ")
        || lower.contains("504 ")
        || lower.contains("429 ")
        || lower.contains("timed out")
        || lower.contains("timeout")
}

/// Check if an error message indicates a retryable error
pub fn is_retryable_error(error_msg: &str) -> bool {
    is_connection_error(error_msg) || is_transient_error(error_msg)
}
