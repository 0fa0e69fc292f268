//! Edit pipeline worker.
//!
//! This crate provides:
//! - Operation scheduling (timestamp ordering, cut/audio partition)
//! - The pipeline orchestrator: schedule → cut → mix → upload
//! - A supervised bounded worker pool with shutdown and cancellation
//! - Checkpoint progress emission

pub mod config;
pub mod error;
pub mod executor;
pub mod processor;
pub mod schedule;

pub use config::WorkerConfig;
pub use error::{PipelineError, PipelineResult};
pub use executor::{ExecutorHandle, JobExecutor};
pub use processor::{run_pipeline, PipelineContext};
pub use schedule::{schedule, AudioOperation, ScheduledOperations};
