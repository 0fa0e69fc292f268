//! In-process job queue and progress tracking.
//!
//! This crate provides:
//! - A bounded submission queue with backpressure
//! - The ephemeral progress store read by streaming clients

pub mod error;
pub mod progress;
pub mod queue;

pub use error::{QueueError, QueueResult};
pub use progress::{ProgressTracker, GRACE_PERIOD};
pub use queue::{JobQueue, JobReceiver, QueueConfig};
