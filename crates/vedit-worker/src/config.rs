//! Worker configuration.

use std::time::Duration;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Maximum concurrent job pipelines
    pub max_concurrent_jobs: usize,
    /// Work directory for per-job temporary files
    pub work_dir: String,
    /// Base URI finished artifacts are uploaded under
    pub output_base_uri: String,
    /// Deadline for each asset download / artifact upload
    pub transfer_timeout: Duration,
    /// Deadline for each FFmpeg invocation
    pub tool_timeout: Duration,
    /// Overall deadline for one job
    pub job_timeout: Duration,
    /// Half-width of the excised window around each jump cut
    pub cut_margin_secs: f64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 2,
            work_dir: "/tmp/vedit".to_string(),
            output_base_uri: "file:///tmp/vedit/outputs".to_string(),
            transfer_timeout: Duration::from_secs(120),
            tool_timeout: Duration::from_secs(600),
            job_timeout: Duration::from_secs(3600),
            cut_margin_secs: 0.25,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_concurrent_jobs: std::env::var("WORKER_MAX_JOBS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_concurrent_jobs),
            work_dir: std::env::var("WORKER_WORK_DIR").unwrap_or(defaults.work_dir),
            output_base_uri: std::env::var("OUTPUT_BASE_URI").unwrap_or(defaults.output_base_uri),
            transfer_timeout: Duration::from_secs(
                std::env::var("WORKER_TRANSFER_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.transfer_timeout.as_secs()),
            ),
            tool_timeout: Duration::from_secs(
                std::env::var("WORKER_TOOL_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.tool_timeout.as_secs()),
            ),
            job_timeout: Duration::from_secs(
                std::env::var("WORKER_JOB_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.job_timeout.as_secs()),
            ),
            cut_margin_secs: std::env::var("WORKER_CUT_MARGIN_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.cut_margin_secs),
        }
    }
}
