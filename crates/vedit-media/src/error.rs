//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur during media processing and asset transfer.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("FFprobe command failed: {message}")]
    FfprobeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("Fetch failed for {uri}: {message}")]
    FetchFailed { uri: String, message: String },

    #[error("Upload failed for {uri}: {message}")]
    UploadFailed { uri: String, message: String },

    #[error("Unsupported URI scheme: {0}")]
    UnsupportedScheme(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Invalid video file: {0}")]
    InvalidVideo(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl MediaError {
    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create a fetch failure error.
    pub fn fetch_failed(uri: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FetchFailed {
            uri: uri.into(),
            message: message.into(),
        }
    }

    /// Create an upload failure error.
    pub fn upload_failed(uri: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UploadFailed {
            uri: uri.into(),
            message: message.into(),
        }
    }

    /// Whether this error came from the transfer layer rather than the tool.
    pub fn is_transfer(&self) -> bool {
        matches!(
            self,
            MediaError::FetchFailed { .. }
                | MediaError::UploadFailed { .. }
                | MediaError::UnsupportedScheme(_)
        )
    }
}
