//! Bounded in-process job queue.
//!
//! Submissions `try_send` into a bounded channel: once the backlog is full,
//! new submissions are rejected rather than silently piled up. The worker
//! executor owns the receiving half.

use tokio::sync::mpsc;
use tracing::{debug, info};

use vedit_models::EditJob;

use crate::error::{QueueError, QueueResult};

/// Queue configuration.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Maximum queued (not yet running) jobs before submissions are rejected
    pub capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self { capacity: 64 }
    }
}

impl QueueConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            capacity: std::env::var("QUEUE_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(64),
        }
    }
}

/// Submission half of the job queue.
#[derive(Clone)]
pub struct JobQueue {
    tx: mpsc::Sender<EditJob>,
}

/// Consumption half of the job queue, owned by the executor.
pub struct JobReceiver {
    rx: mpsc::Receiver<EditJob>,
}

impl JobQueue {
    /// Create a queue, returning the submission and consumption halves.
    pub fn new(config: QueueConfig) -> (Self, JobReceiver) {
        let (tx, rx) = mpsc::channel(config.capacity);
        info!(capacity = config.capacity, "Job queue created");
        (Self { tx }, JobReceiver { rx })
    }

    /// Enqueue a job snapshot for background processing.
    ///
    /// Returns [`QueueError::Saturated`] once the backlog is full.
    pub fn enqueue(&self, job: EditJob) -> QueueResult<()> {
        let job_id = job.id.clone();
        match self.tx.try_send(job) {
            Ok(()) => {
                debug!(job_id = %job_id, "Enqueued job");
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(_)) => Err(QueueError::Saturated),
            Err(mpsc::error::TrySendError::Closed(_)) => Err(QueueError::Closed),
        }
    }
}

impl JobReceiver {
    /// Receive the next queued job; `None` once all senders are dropped.
    pub async fn recv(&mut self) -> Option<EditJob> {
        self.rx.recv().await
    }
}
