//! WebSocket progress streaming.
//!
//! A request-scoped feed polls the progress tracker at a fixed interval and
//! pushes one JSON event per tick to a single client until a terminal status
//! is observed or the stream lifetime cap is hit. Client disconnect tears
//! down the stream only; the underlying job keeps running.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tokio::time::{Instant, Interval};
use tracing::{debug, info};

use vedit_models::{EditJob, JobId, JobStatus, ProgressStatus, StreamEvent};
use vedit_queue::ProgressTracker;
use vedit_store::JobStore;

use crate::state::AppState;

/// Poll cadence for tracker reads.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Hard cap on one stream's lifetime, bounding resource usage.
pub const MAX_STREAM_LIFETIME: Duration = Duration::from_secs(300);

/// Request-scoped progress feed for one job.
///
/// Separated from the socket so the polling contract is testable without a
/// network connection.
pub struct ProgressFeed {
    tracker: ProgressTracker,
    store: Arc<dyn JobStore>,
    job_id: JobId,
    interval: Interval,
    deadline: Instant,
    finished: bool,
}

impl ProgressFeed {
    pub fn new(tracker: ProgressTracker, store: Arc<dyn JobStore>, job_id: JobId) -> Self {
        Self::with_limits(tracker, store, job_id, POLL_INTERVAL, MAX_STREAM_LIFETIME)
    }

    pub fn with_limits(
        tracker: ProgressTracker,
        store: Arc<dyn JobStore>,
        job_id: JobId,
        poll_interval: Duration,
        max_lifetime: Duration,
    ) -> Self {
        Self {
            tracker,
            store,
            job_id,
            interval: tokio::time::interval(poll_interval),
            deadline: Instant::now() + max_lifetime,
            finished: false,
        }
    }

    /// Next event to push, or `None` once the stream should end.
    ///
    /// Exactly one terminal event is ever produced; the call after it
    /// returns `None`.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        if self.finished {
            return None;
        }

        tokio::select! {
            _ = tokio::time::sleep_until(self.deadline) => {
                debug!(job_id = %self.job_id, "Stream lifetime cap reached");
                self.finished = true;
                return None;
            }
            _ = self.interval.tick() => {}
        }

        if let Some(record) = self.tracker.read(&self.job_id).await {
            if record.status.is_terminal() {
                self.finished = true;
            }
            return Some(record.to_event());
        }

        // Tracker unknown: the record may have expired, or the pipeline has
        // not started yet. The persisted job is authoritative.
        match self.store.get(&self.job_id).await {
            Ok(Some(job)) if job.status.is_terminal() => {
                self.finished = true;
                Some(terminal_event(&job))
            }
            Ok(Some(_)) => Some(StreamEvent::waiting()),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                debug!(job_id = %self.job_id, "Store read failed during stream: {}", e);
                Some(StreamEvent::waiting())
            }
        }
    }
}

/// Terminal event derived from the persisted record.
fn terminal_event(job: &EditJob) -> StreamEvent {
    match job.status {
        JobStatus::Failed => StreamEvent {
            progress: job.progress_percent,
            status: ProgressStatus::Failed,
            message: job.error_message.clone(),
        },
        _ => StreamEvent {
            progress: 100,
            status: ProgressStatus::Completed,
            message: None,
        },
    }
}

/// GET /api/jobs/:job_id/progress (WebSocket upgrade)
pub async fn job_progress_ws(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_progress_socket(state, JobId::from_string(job_id), socket))
}

async fn handle_progress_socket(state: AppState, job_id: JobId, socket: WebSocket) {
    info!(job_id = %job_id, "Progress stream opened");

    let (mut sender, mut receiver) = socket.split();
    let mut feed = ProgressFeed::new(state.tracker.clone(), Arc::clone(&state.store), job_id.clone());

    loop {
        tokio::select! {
            event = feed.next_event() => {
                let Some(event) = event else { break };

                let json = match serde_json::to_string(&event) {
                    Ok(json) => json,
                    Err(_) => break,
                };
                if sender.send(Message::Text(json)).await.is_err() {
                    debug!(job_id = %job_id, "Client disconnected, closing stream");
                    break;
                }
            }
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => {
                        debug!(job_id = %job_id, "Client closed progress stream");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    let _ = sender.close().await;
    info!(job_id = %job_id, "Progress stream ended");
}
