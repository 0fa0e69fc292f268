//! Shared data models for the vedit backend.
//!
//! This crate provides Serde-serializable types for:
//! - Edit jobs and their state machine
//! - Timestamped edit operations (cuts, voice-overs, sound effects)
//! - Job settings and presets
//! - Progress records and stream event schemas

pub mod job;
pub mod operation;
pub mod progress;
pub mod settings;

// Re-export common types
pub use job::{EditJob, JobId, JobStatus};
pub use operation::{AudioKind, EditOperation};
pub use progress::{ProgressRecord, ProgressStatus, StreamEvent};
pub use settings::{EditSettings, Preset};
