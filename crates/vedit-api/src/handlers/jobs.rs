//! Job submission and query handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use vedit_models::{EditJob, EditOperation, EditSettings, JobId};
use vedit_queue::QueueError;
use vedit_store::{JobStore, PresetStore, RecommendationEngine};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::validate::validate_submission;

/// Job submission request.
#[derive(Debug, Deserialize)]
pub struct SubmitJobRequest {
    /// URI of the source video
    pub source_uri: String,
    /// Named preset supplying default settings
    #[serde(default)]
    pub preset_id: Option<String>,
    /// Ordered edit operations
    #[serde(default)]
    pub operations: Vec<EditOperation>,
    /// Explicit settings, overriding the preset
    #[serde(default)]
    pub settings: Option<EditSettings>,
    /// Client-known source duration, enabling synchronous range validation
    #[serde(default)]
    pub source_duration_hint_secs: Option<f64>,
}

/// Job submission response.
#[derive(Debug, Serialize)]
pub struct SubmitJobResponse {
    pub job_id: String,
    pub status: &'static str,
}

/// Persisted job view returned by the query endpoint.
#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub job_id: String,
    pub status: String,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

impl JobResponse {
    fn from_job(job: EditJob) -> Self {
        Self {
            job_id: job.id.to_string(),
            status: job.status.as_str().to_string(),
            progress: job.progress_percent,
            output_uri: job.output_uri,
            error_message: job.error_message,
            created_at: job.created_at.to_rfc3339(),
            completed_at: job.completed_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// POST /api/jobs
///
/// Validates synchronously, persists the queued record, and hands the job to
/// the worker pool. Returns immediately; all later outcomes are observed via
/// the progress stream or the query endpoint.
pub async fn submit_job(
    State(state): State<AppState>,
    Json(request): Json<SubmitJobRequest>,
) -> ApiResult<(StatusCode, Json<SubmitJobResponse>)> {
    validate_submission(&request)?;

    let settings = resolve_settings(&state, &request);
    let job = EditJob::new(request.source_uri.clone(), request.operations, settings);
    let job_id = job.id.clone();

    state.store.insert(&job).await?;

    if let Err(e) = state.queue.enqueue(job) {
        // Roll back the record so a rejected submission leaves nothing behind
        if let Err(re) = state.store.remove(&job_id).await {
            warn!(job_id = %job_id, "Failed to roll back rejected submission: {}", re);
        }
        return Err(match e {
            QueueError::Saturated => ApiError::unavailable("queue saturated, try again later"),
            QueueError::Closed => ApiError::internal("worker pool not running"),
        });
    }

    info!(job_id = %job_id, "Job submitted");

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitJobResponse {
            job_id: job_id.to_string(),
            status: "processing",
        }),
    ))
}

/// GET /api/jobs/:job_id
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<JobResponse>> {
    let job = state
        .store
        .get(&JobId::from_string(job_id))
        .await?
        .ok_or_else(|| ApiError::not_found("job not found"))?;

    Ok(Json(JobResponse::from_job(job)))
}

/// Resolve effective settings: explicit settings win, then the named preset,
/// then the recommender's suggestion, then the built-in defaults.
fn resolve_settings(state: &AppState, request: &SubmitJobRequest) -> EditSettings {
    if let Some(settings) = &request.settings {
        return settings.clone();
    }

    let preset_id = request
        .preset_id
        .clone()
        .or_else(|| state.recommender.suggest(&request.source_uri));

    preset_id
        .and_then(|id| state.presets.preset(&id))
        .map(|preset| preset.settings)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use vedit_queue::{JobQueue, ProgressTracker, QueueConfig};
    use vedit_store::{KeywordRecommender, MemoryJobStore, StaticPresetStore};

    use crate::config::ApiConfig;

    fn test_state(capacity: usize) -> (AppState, vedit_queue::JobReceiver) {
        let presets = Arc::new(StaticPresetStore::new());
        let recommender = Arc::new(KeywordRecommender::new(presets.as_ref()));
        let (queue, receiver) = JobQueue::new(QueueConfig { capacity });
        (
            AppState::new(
                ApiConfig::default(),
                Arc::new(MemoryJobStore::new()),
                presets,
                recommender,
                ProgressTracker::new(),
                queue,
            ),
            receiver,
        )
    }

    fn request(source_uri: &str) -> SubmitJobRequest {
        SubmitJobRequest {
            source_uri: source_uri.to_string(),
            preset_id: None,
            operations: vec![EditOperation::JumpCut {
                timestamp_seconds: 3.0,
            }],
            settings: None,
            source_duration_hint_secs: None,
        }
    }

    #[tokio::test]
    async fn test_submit_creates_record_and_enqueues() {
        let (state, mut receiver) = test_state(8);

        let (status, Json(response)) =
            submit_job(State(state.clone()), Json(request("file:///tmp/a.mp4")))
                .await
                .unwrap();

        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(response.status, "processing");

        // Record persisted as queued
        let stored = state
            .store
            .get(&JobId::from_string(response.job_id.clone()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, vedit_models::JobStatus::Queued);

        // And handed to the worker pool
        let queued = receiver.recv().await.unwrap();
        assert_eq!(queued.id.to_string(), response.job_id);
    }

    #[tokio::test]
    async fn test_validation_rejects_without_creating_job() {
        let (state, mut receiver) = test_state(8);

        let mut bad = request("file:///tmp/a.mp4");
        bad.operations = vec![EditOperation::JumpCut {
            timestamp_seconds: -2.0,
        }];

        let err = submit_job(State(state.clone()), Json(bad)).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        // Nothing queued
        drop(state);
        assert!(receiver.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_saturation_rolls_back_record() {
        let (state, _receiver) = test_state(1);

        submit_job(State(state.clone()), Json(request("file:///tmp/a.mp4")))
            .await
            .unwrap();

        let err = submit_job(State(state.clone()), Json(request("file:///tmp/b.mp4")))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_get_job_not_found() {
        let (state, _receiver) = test_state(8);
        let err = get_job(State(state), Path("missing-job".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_settings_resolution_prefers_explicit() {
        let (state, _receiver) = test_state(8);

        let mut req = request("file:///tmp/a.mp4");
        req.settings = Some(EditSettings {
            jump_cut_frequency: 1.0,
            music_volume: 5,
        });
        req.preset_id = Some("talking_head".to_string());

        let settings = resolve_settings(&state, &req);
        assert_eq!(settings.music_volume, 5);
    }

    #[tokio::test]
    async fn test_settings_resolution_uses_preset_then_recommender() {
        let (state, _receiver) = test_state(8);

        let mut req = request("file:///tmp/a.mp4");
        req.preset_id = Some("podcast".to_string());
        assert_eq!(resolve_settings(&state, &req).music_volume, 40);

        // No preset named: the recommender keys off the URI
        let req = request("file:///uploads/podcast-42.mp4");
        assert_eq!(resolve_settings(&state, &req).music_volume, 40);

        // Nothing matches: built-in defaults
        let req = request("file:///tmp/raw.mp4");
        assert_eq!(
            resolve_settings(&state, &req),
            EditSettings::default()
        );
    }
}
