//! Supervised worker pool.
//!
//! Consumes the bounded job queue and runs each pipeline as a supervised
//! task. A semaphore caps concurrent pipelines; a watch channel propagates
//! shutdown, which doubles as the cancel signal threaded through every
//! pipeline suspension point.

use std::sync::Arc;

use tokio::sync::{watch, Semaphore};
use tracing::info;

use vedit_queue::{JobReceiver, ProgressTracker};
use vedit_store::JobStore;

use crate::config::WorkerConfig;
use crate::processor::{run_pipeline, PipelineContext};

/// Handle for signalling executor shutdown from outside.
#[derive(Clone)]
pub struct ExecutorHandle {
    shutdown_tx: Arc<watch::Sender<bool>>,
}

impl ExecutorHandle {
    /// Stop accepting jobs and cancel running pipelines.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

/// Job executor: owns the queue's receiving half and the worker pool.
pub struct JobExecutor {
    ctx: Arc<PipelineContext>,
    receiver: JobReceiver,
    semaphore: Arc<Semaphore>,
    shutdown_rx: watch::Receiver<bool>,
}

impl JobExecutor {
    /// Create an executor and its shutdown handle.
    pub fn new(
        config: WorkerConfig,
        receiver: JobReceiver,
        store: Arc<dyn JobStore>,
        tracker: ProgressTracker,
    ) -> (Self, ExecutorHandle) {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent_jobs));
        let ctx = Arc::new(PipelineContext {
            config,
            store,
            tracker,
            cancel_rx: shutdown_rx.clone(),
        });

        (
            Self {
                ctx,
                receiver,
                semaphore,
                shutdown_rx,
            },
            ExecutorHandle {
                shutdown_tx: Arc::new(shutdown_tx),
            },
        )
    }

    /// Run until shutdown is signalled or the queue closes.
    pub async fn run(mut self) {
        info!(
            max_concurrent_jobs = self.ctx.config.max_concurrent_jobs,
            "Starting job executor"
        );

        loop {
            tokio::select! {
                changed = self.shutdown_rx.changed() => {
                    if changed.is_err() || *self.shutdown_rx.borrow() {
                        info!("Shutdown signal received, stopping executor");
                        break;
                    }
                }
                job = self.receiver.recv() => {
                    let Some(job) = job else {
                        info!("Job queue closed, stopping executor");
                        break;
                    };

                    let permit = Arc::clone(&self.semaphore)
                        .acquire_owned()
                        .await
                        .expect("job semaphore closed");
                    let ctx = Arc::clone(&self.ctx);

                    tokio::spawn(async move {
                        run_pipeline(&ctx, job).await;
                        drop(permit);
                    });
                }
            }
        }

        info!("Job executor stopped");
    }
}
