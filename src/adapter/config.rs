//! Configuration
//!
//! JSON設定ファイルの読み込み

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::application::dto::session_config::{SessionConfig, DEFAULT_MAX_CONCURRENT_UPLOADS};
use crate::domain::entities::profiling_request::DEFAULT_OCCURRENCE;
use crate::domain::services::readiness::MIN_FILES;

pub const DEFAULT_CONFIG_PATH: &str = "./.contigsync/config.json";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    // Server endpoints
    pub base_url: String,
    pub acquire_path: String,
    pub upload_path: String,
    pub profiling_path: String,
    /// Collection path; the batch id is appended as one escaped segment
    pub lookup_path: String,

    // Session behaviour
    pub max_concurrent_uploads: usize,
    pub min_files: usize,
    pub default_occurrence: String,
    pub confirm_on_resolution: bool,

    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            acquire_path: "api/profiling/upload/".to_string(),
            upload_path: "api/profiling/sequence/".to_string(),
            profiling_path: "api/profiling/profiling-tree/".to_string(),
            lookup_path: "api/profiling/upload/".to_string(),
            max_concurrent_uploads: DEFAULT_MAX_CONCURRENT_UPLOADS,
            min_files: MIN_FILES,
            default_occurrence: DEFAULT_OCCURRENCE.to_string(),
            confirm_on_resolution: false,
            request_timeout_secs: 300,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file; a missing file yields the defaults.
    pub fn load(path: &str) -> Result<Self> {
        let expanded = shellexpand::tilde(path);
        let path = Path::new(expanded.as_ref());

        if !path.exists() {
            info!("No config found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config =
            serde_json::from_str(&content).context("Failed to parse config JSON")?;
        Ok(config)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new(
            self.min_files,
            self.max_concurrent_uploads,
            self.default_occurrence.clone(),
            self.confirm_on_resolution,
        )
    }

    /// Join an endpoint path onto `base_url`.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
