//! Progress records and the stream event wire schema.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Status carried by a progress record.
///
/// Narrower than [`crate::JobStatus`]: a record only exists once the pipeline
/// has produced a checkpoint, so there is no queued variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    Processing,
    Completed,
    Failed,
}

impl ProgressStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStatus::Processing => "processing",
            ProgressStatus::Completed => "completed",
            ProgressStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ProgressStatus::Completed | ProgressStatus::Failed)
    }
}

/// Ephemeral progress snapshot for one job.
///
/// A low-latency read-path cache for streaming; the persisted job record
/// remains authoritative for status.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProgressRecord {
    /// Percent complete (0-100)
    pub percent: u8,
    /// Current status
    pub status: ProgressStatus,
    /// Checkpoint description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Rough remaining time, when a step can estimate it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eta_seconds: Option<f64>,
    /// Last write time
    pub updated_at: DateTime<Utc>,
}

impl ProgressRecord {
    /// Create a non-terminal record.
    pub fn processing(percent: u8, message: impl Into<Option<String>>) -> Self {
        Self {
            percent: percent.min(100),
            status: ProgressStatus::Processing,
            message: message.into(),
            eta_seconds: None,
            updated_at: Utc::now(),
        }
    }

    /// Create the completed terminal record.
    pub fn completed(message: impl Into<Option<String>>) -> Self {
        Self {
            percent: 100,
            status: ProgressStatus::Completed,
            message: message.into(),
            eta_seconds: None,
            updated_at: Utc::now(),
        }
    }

    /// Create the failed terminal record.
    pub fn failed(percent: u8, message: impl Into<Option<String>>) -> Self {
        Self {
            percent: percent.min(100),
            status: ProgressStatus::Failed,
            message: message.into(),
            eta_seconds: None,
            updated_at: Utc::now(),
        }
    }

    /// Convert to the wire event pushed to stream clients.
    pub fn to_event(&self) -> StreamEvent {
        StreamEvent {
            progress: self.percent,
            status: self.status,
            message: self.message.clone(),
        }
    }
}

/// JSON record pushed over the progress stream, one per checkpoint or tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StreamEvent {
    /// Percent complete (0-100)
    pub progress: u8,
    /// processing | completed | failed
    pub status: ProgressStatus,
    /// Checkpoint description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StreamEvent {
    /// Placeholder emitted while a queued job has produced no record yet.
    pub fn waiting() -> Self {
        Self {
            progress: 0,
            status: ProgressStatus::Processing,
            message: Some("waiting for pipeline".to_string()),
        }
    }
}
