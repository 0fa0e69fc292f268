//! Ephemeral progress store.
//!
//! Written by the pipeline for a given job id, read by any number of stream
//! handlers. Percent is monotonically non-decreasing while a record is
//! non-terminal; a terminal record is written exactly once and expires after
//! a grace period so late readers fall back to the persisted job record.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use vedit_models::{JobId, ProgressRecord};

/// How long a terminal record stays readable.
pub const GRACE_PERIOD: Duration = Duration::from_secs(30);

#[derive(Debug)]
struct Tracked {
    record: ProgressRecord,
    /// Bumped on every write; guards the expiry task against id reuse.
    epoch: u64,
}

/// Process-local progress store.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    inner: Arc<RwLock<HashMap<JobId, Tracked>>>,
    grace_period: Duration,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            grace_period: GRACE_PERIOD,
        }
    }

    #[cfg(test)]
    fn with_grace_period(grace_period: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            grace_period,
        }
    }

    /// Set or overwrite a non-terminal record.
    ///
    /// Percent never decreases while the record is non-terminal; a lower
    /// value keeps the previous percent but still refreshes the message.
    pub async fn update(&self, job_id: &JobId, percent: u8, message: impl Into<String>) {
        let mut inner = self.inner.write().await;

        match inner.get_mut(job_id) {
            Some(tracked) if tracked.record.status.is_terminal() => {
                warn!(job_id = %job_id, "Ignoring progress update after terminal record");
            }
            Some(tracked) => {
                let percent = percent.min(100).max(tracked.record.percent);
                tracked.record = ProgressRecord::processing(percent, Some(message.into()));
                tracked.epoch += 1;
            }
            None => {
                inner.insert(
                    job_id.clone(),
                    Tracked {
                        record: ProgressRecord::processing(percent, Some(message.into())),
                        epoch: 0,
                    },
                );
            }
        }
    }

    /// Write the completed terminal record and schedule its expiry.
    pub async fn complete(&self, job_id: &JobId, message: impl Into<String>) {
        self.finish(job_id, |_| ProgressRecord::completed(Some(message.into())))
            .await;
    }

    /// Write the failed terminal record and schedule its expiry.
    pub async fn fail(&self, job_id: &JobId, message: impl Into<String>) {
        self.finish(job_id, |prior| {
            ProgressRecord::failed(prior, Some(message.into()))
        })
        .await;
    }

    async fn finish<F>(&self, job_id: &JobId, build: F)
    where
        F: FnOnce(u8) -> ProgressRecord,
    {
        let epoch = {
            let mut inner = self.inner.write().await;
            let prior_percent = inner.get(job_id).map(|t| t.record.percent).unwrap_or(0);

            match inner.get_mut(job_id) {
                Some(tracked) if tracked.record.status.is_terminal() => {
                    warn!(job_id = %job_id, "Ignoring second terminal record");
                    return;
                }
                Some(tracked) => {
                    tracked.record = build(prior_percent);
                    tracked.epoch += 1;
                    tracked.epoch
                }
                None => {
                    inner.insert(
                        job_id.clone(),
                        Tracked {
                            record: build(prior_percent),
                            epoch: 0,
                        },
                    );
                    0
                }
            }
        };

        // Expire the terminal record after the grace period
        let store = Arc::clone(&self.inner);
        let job_id = job_id.clone();
        let grace = self.grace_period;
        tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            let mut inner = store.write().await;
            if let Some(tracked) = inner.get(&job_id) {
                if tracked.epoch == epoch && tracked.record.status.is_terminal() {
                    inner.remove(&job_id);
                    debug!(job_id = %job_id, "Expired terminal progress record");
                }
            }
        });
    }

    /// Current record for a job, or `None` if unknown.
    pub async fn read(&self, job_id: &JobId) -> Option<ProgressRecord> {
        let inner = self.inner.read().await;
        inner.get(job_id).map(|t| t.record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vedit_models::ProgressStatus;

    fn job_id() -> JobId {
        JobId::new()
    }

    #[tokio::test]
    async fn test_update_and_read() {
        let tracker = ProgressTracker::new();
        let id = job_id();

        tracker.update(&id, 10, "downloading source").await;
        let record = tracker.read(&id).await.unwrap();
        assert_eq!(record.percent, 10);
        assert_eq!(record.status, ProgressStatus::Processing);
        assert_eq!(record.message.as_deref(), Some("downloading source"));
    }

    #[tokio::test]
    async fn test_unknown_job() {
        let tracker = ProgressTracker::new();
        assert!(tracker.read(&job_id()).await.is_none());
    }

    #[tokio::test]
    async fn test_percent_monotonic_while_processing() {
        let tracker = ProgressTracker::new();
        let id = job_id();

        tracker.update(&id, 40, "cutting").await;
        tracker.update(&id, 25, "stale write").await;

        let record = tracker.read(&id).await.unwrap();
        assert_eq!(record.percent, 40);
        // Message still refreshes
        assert_eq!(record.message.as_deref(), Some("stale write"));
    }

    #[tokio::test]
    async fn test_terminal_always_accepted() {
        let tracker = ProgressTracker::new();
        let id = job_id();

        tracker.update(&id, 90, "uploading").await;
        tracker.fail(&id, "upload failed").await;

        let record = tracker.read(&id).await.unwrap();
        assert_eq!(record.status, ProgressStatus::Failed);
        // Failure keeps the percent it reached
        assert_eq!(record.percent, 90);
    }

    #[tokio::test]
    async fn test_exactly_one_terminal_record() {
        let tracker = ProgressTracker::new();
        let id = job_id();

        tracker.complete(&id, "done").await;
        tracker.fail(&id, "late failure").await;
        tracker.update(&id, 10, "late update").await;

        let record = tracker.read(&id).await.unwrap();
        assert_eq!(record.status, ProgressStatus::Completed);
        assert_eq!(record.percent, 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_record_expires_after_grace() {
        let tracker = ProgressTracker::new();
        let id = job_id();

        tracker.update(&id, 50, "halfway").await;
        tracker.complete(&id, "done").await;

        // Retrievable within the grace period
        tokio::time::sleep(GRACE_PERIOD - Duration::from_secs(1)).await;
        assert!(tracker.read(&id).await.is_some());

        // Absent after it elapses
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(tracker.read(&id).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_terminal_records_do_not_expire() {
        let tracker = ProgressTracker::with_grace_period(Duration::from_millis(50));
        let id = job_id();

        tracker.update(&id, 10, "working").await;
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(tracker.read(&id).await.is_some());
    }

    #[tokio::test]
    async fn test_concurrent_job_isolation() {
        let tracker = ProgressTracker::new();
        let a = job_id();
        let b = job_id();

        tracker.update(&a, 30, "job a cutting").await;
        tracker.update(&b, 70, "job b mixing").await;
        tracker.complete(&a, "job a done").await;

        let ra = tracker.read(&a).await.unwrap();
        let rb = tracker.read(&b).await.unwrap();
        assert_eq!(ra.status, ProgressStatus::Completed);
        assert_eq!(rb.status, ProgressStatus::Processing);
        assert_eq!(rb.percent, 70);
    }
}
