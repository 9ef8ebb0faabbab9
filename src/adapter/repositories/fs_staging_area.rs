//! Filesystem Staging Area Implementation
//!
//! StagingAreaのファイルシステム実装

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info, warn};
use std::path::PathBuf;
use walkdir::WalkDir;

use crate::domain::entities::staged_file::has_accepted_extension;
use crate::domain::repositories::staging_area::StagingArea;

/// ファイルシステムベースのステージングエリア
///
/// ファイルはそのまま候補にし、ディレクトリは再帰的に走査してアセンブリファイルのみを拾う
pub struct FsStagingArea;

impl FsStagingArea {
    pub fn new() -> Self {
        Self
    }

    fn collect_internal(inputs: &[String]) -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        for input in inputs {
            let expanded = shellexpand::tilde(input);
            let path = PathBuf::from(expanded.as_ref());

            if path.is_file() {
                candidates.push(path);
                continue;
            }

            if !path.is_dir() {
                warn!("Input does not exist: {}", path.display());
                continue;
            }

            let mut found: Vec<PathBuf> = WalkDir::new(&path)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .filter(|p| {
                    let accepted = has_accepted_extension(p);
                    if !accepted {
                        debug!("Skipping {}", p.display());
                    }
                    accepted
                })
                .collect();
            found.sort();

            info!("Found {} assembly files in {}", found.len(), path.display());
            candidates.extend(found);
        }

        candidates
    }
}

impl Default for FsStagingArea {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StagingArea for FsStagingArea {
    async fn collect_candidates(&self, inputs: &[String]) -> Result<Vec<PathBuf>> {
        let inputs = inputs.to_vec();
        let candidates =
            tokio::task::spawn_blocking(move || Self::collect_internal(&inputs)).await?;
        Ok(candidates)
    }
}
