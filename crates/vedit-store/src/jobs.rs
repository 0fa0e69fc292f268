//! Durable job record storage.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use vedit_models::{EditJob, JobId};

use crate::error::{StoreError, StoreResult};

/// Persistence for the authoritative job record.
///
/// Written at every state transition so status and output survive a process
/// restart even though live progress granularity does not.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a new job. Fails if the id already exists.
    async fn insert(&self, job: &EditJob) -> StoreResult<()>;

    /// Replace the stored record. Transitions out of a terminal state are
    /// rejected.
    async fn update(&self, job: &EditJob) -> StoreResult<()>;

    /// Fetch a job by id.
    async fn get(&self, id: &JobId) -> StoreResult<Option<EditJob>>;

    /// Remove a job record (used to roll back a rejected submission).
    async fn remove(&self, id: &JobId) -> StoreResult<()>;
}

/// In-process job store for single-node deployments.
#[derive(Debug, Clone, Default)]
pub struct MemoryJobStore {
    jobs: Arc<RwLock<HashMap<JobId, EditJob>>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn insert(&self, job: &EditJob) -> StoreResult<()> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&job.id) {
            return Err(StoreError::AlreadyExists(job.id.to_string()));
        }
        jobs.insert(job.id.clone(), job.clone());
        debug!(job_id = %job.id, "Inserted job record");
        Ok(())
    }

    async fn update(&self, job: &EditJob) -> StoreResult<()> {
        let mut jobs = self.jobs.write().await;
        let existing = jobs
            .get(&job.id)
            .ok_or_else(|| StoreError::NotFound(job.id.to_string()))?;

        if existing.status.is_terminal() {
            return Err(StoreError::TerminalState(job.id.to_string()));
        }

        jobs.insert(job.id.clone(), job.clone());
        Ok(())
    }

    async fn get(&self, id: &JobId) -> StoreResult<Option<EditJob>> {
        let jobs = self.jobs.read().await;
        Ok(jobs.get(id).cloned())
    }

    async fn remove(&self, id: &JobId) -> StoreResult<()> {
        let mut jobs = self.jobs.write().await;
        jobs.remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}
