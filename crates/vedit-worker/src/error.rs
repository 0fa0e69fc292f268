//! Pipeline error taxonomy.
//!
//! Full detail stays in logs; only `public_message()` reaches the persisted
//! job record and stream clients.

use thiserror::Error;

use vedit_media::MediaError;
use vedit_store::StoreError;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Source fetch failed: {0}")]
    SourceFetch(MediaError),

    #[error("Output upload failed: {0}")]
    Upload(MediaError),

    #[error("Media processing failed: {0}")]
    Processing(MediaError),

    #[error("Working storage failed: {0}")]
    Resource(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Step '{step}' timed out after {secs} seconds")]
    StepTimeout { step: &'static str, secs: u64 },

    #[error("Job cancelled")]
    Cancelled,
}

impl PipelineError {
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Redacted message recorded on the failed job and shown to clients.
    pub fn public_message(&self) -> &'static str {
        match self {
            PipelineError::SourceFetch(_) => "source download failed",
            PipelineError::Upload(_) => "output upload failed",
            PipelineError::Processing(_) => "video processing failed",
            PipelineError::Resource(_) => "working storage unavailable",
            PipelineError::Store(_) => "internal error",
            PipelineError::StepTimeout { .. } => "processing timed out",
            PipelineError::Cancelled => "job cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_messages_are_redacted() {
        let err = PipelineError::SourceFetch(MediaError::fetch_failed(
            "https://internal-host:9000/bucket/secret.mp4",
            "connection refused",
        ));
        // The URI must not leak into the public message
        assert_eq!(err.public_message(), "source download failed");
        assert!(!err.public_message().contains("internal-host"));
    }

    #[test]
    fn test_timeout_public_message() {
        let err = PipelineError::StepTimeout {
            step: "mix",
            secs: 600,
        };
        assert_eq!(err.public_message(), "processing timed out");
    }
}
