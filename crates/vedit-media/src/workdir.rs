//! Per-job working directories.
//!
//! Each job owns its directory exclusively; no two jobs share mutable state.
//! Cleanup is best-effort on both success and failure paths.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{MediaError, MediaResult};

/// An exclusively-owned temporary working directory for one job.
#[derive(Debug)]
pub struct JobWorkspace {
    root: PathBuf,
}

impl JobWorkspace {
    /// Allocate the workspace under `base_dir`, keyed by job id.
    pub async fn create(base_dir: &Path, job_id: &str) -> MediaResult<Self> {
        let root = base_dir.join(job_id);
        tokio::fs::create_dir_all(&root).await.map_err(|e| {
            MediaError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to allocate workspace {}: {}", root.display(), e),
            ))
        })?;
        Ok(Self { root })
    }

    /// Root of this workspace.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path for a named intermediate file.
    pub fn file(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Remove the workspace. Failure is logged, not escalated.
    pub async fn cleanup(self) {
        if let Err(e) = tokio::fs::remove_dir_all(&self.root).await {
            warn!(
                workspace = %self.root.display(),
                "Failed to clean up workspace: {}", e
            );
        }
    }
}
