//! Edit job record and state machine.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::operation::EditOperation;
use crate::settings::EditSettings;

/// Unique identifier for an edit job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of an edit job.
///
/// `Queued` is set synchronously on submission; everything after happens on
/// the worker. `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Accepted, waiting for a worker slot
    #[default]
    Queued,
    /// Pipeline is running
    Processing,
    /// Output uploaded
    Completed,
    /// Pipeline failed
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// Check if no further transition is permitted from this state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// A video edit job: source, ordered operations, settings and outcome.
///
/// Mutated only by the orchestrator through the consuming transition methods;
/// the operations list is fixed once processing starts.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EditJob {
    /// Unique job ID
    pub id: JobId,

    /// Current lifecycle state
    #[serde(default)]
    pub status: JobStatus,

    /// URI of the source video
    pub source_uri: String,

    /// URI of the finished artifact (set on Completed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_uri: Option<String>,

    /// Ordered edit operations
    pub operations: Vec<EditOperation>,

    /// Job settings
    pub settings: EditSettings,

    /// Coarse progress (0-100)
    #[serde(default)]
    pub progress_percent: u8,

    /// Redacted failure message (set on Failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// When processing started
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// When a terminal state was reached
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl EditJob {
    /// Create a new queued job.
    pub fn new(
        source_uri: impl Into<String>,
        operations: Vec<EditOperation>,
        settings: EditSettings,
    ) -> Self {
        Self {
            id: JobId::new(),
            status: JobStatus::Queued,
            source_uri: source_uri.into(),
            output_uri: None,
            operations,
            settings,
            progress_percent: 0,
            error_message: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    /// Start processing the job.
    pub fn start(mut self) -> Self {
        self.status = JobStatus::Processing;
        self.started_at = Some(Utc::now());
        self
    }

    /// Mark the job as completed with its output artifact.
    pub fn complete(mut self, output_uri: impl Into<String>) -> Self {
        self.status = JobStatus::Completed;
        self.output_uri = Some(output_uri.into());
        self.progress_percent = 100;
        self.completed_at = Some(Utc::now());
        self
    }

    /// Mark the job as failed with a redacted message.
    pub fn fail(mut self, error: impl Into<String>) -> Self {
        self.status = JobStatus::Failed;
        self.error_message = Some(error.into());
        self.completed_at = Some(Utc::now());
        self
    }

    /// Update coarse progress, clamped to 100.
    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress_percent = progress.min(100);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_job() -> EditJob {
        EditJob::new(
            "https://assets.example.com/raw/talk.mp4",
            vec![EditOperation::JumpCut {
                timestamp_seconds: 5.0,
            }],
            EditSettings::default(),
        )
    }

    #[test]
    fn test_job_creation() {
        let job = sample_job();
        assert_eq!(job.status, JobStatus::Queued);
        assert_eq!(job.progress_percent, 0);
        assert!(job.output_uri.is_none());
        assert!(!job.status.is_terminal());
    }

    #[test]
    fn test_job_state_transitions() {
        let job = sample_job();

        let started = job.start();
        assert_eq!(started.status, JobStatus::Processing);
        assert!(started.started_at.is_some());

        let completed = started.complete("file:///var/lib/vedit/out/a.mp4");
        assert_eq!(completed.status, JobStatus::Completed);
        assert_eq!(completed.progress_percent, 100);
        assert!(completed.output_uri.is_some());
        assert!(completed.status.is_terminal());
    }

    #[test]
    fn test_job_failure() {
        let failed = sample_job().start().fail("video processing failed");
        assert_eq!(failed.status, JobStatus::Failed);
        assert_eq!(
            failed.error_message.as_deref(),
            Some("video processing failed")
        );
        assert!(failed.completed_at.is_some());
        assert!(failed.status.is_terminal());
    }

    #[test]
    fn test_progress_clamped() {
        let job = sample_job().with_progress(150);
        assert_eq!(job.progress_percent, 100);
    }
}
