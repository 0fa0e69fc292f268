//! Edit pipeline execution.
//!
//! One call to [`run_pipeline`] owns a job's whole lifecycle: the transition
//! to `Processing`, the sequential steps (schedule, fetch, cut, mix, upload),
//! checkpoint progress writes, and the terminal commit. Every suspension
//! point honors the cancel signal and carries a deadline.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info, warn};

use vedit_media::{
    apply_cut_plan, apply_mix_plan, plan_cuts, probe_video, transfer, CutConfig, FfmpegRunner,
    JobWorkspace, MediaError, MixPlan, ScheduledOverlay,
};
use vedit_models::{EditJob, JobId};
use vedit_queue::ProgressTracker;
use vedit_store::JobStore;

use crate::config::WorkerConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::schedule::{schedule, AudioOperation};

/// Shared context for pipeline execution.
pub struct PipelineContext {
    pub config: WorkerConfig,
    pub store: Arc<dyn JobStore>,
    pub tracker: ProgressTracker,
    pub cancel_rx: watch::Receiver<bool>,
}

/// Run one job to a terminal state.
///
/// Errors never escape: every failure is committed as the job's `Failed`
/// state with a redacted message and mirrored into the progress tracker.
pub async fn run_pipeline(ctx: &PipelineContext, job: EditJob) {
    let job = job.start();
    let job_id = job.id.clone();
    info!(job_id = %job_id, source = %job.source_uri, "Job processing started");

    if let Err(e) = ctx.store.update(&job).await {
        error!(job_id = %job_id, "Failed to persist processing transition: {}", e);
        ctx.tracker.fail(&job_id, "internal error").await;
        return;
    }
    ctx.tracker.update(&job_id, 2, "starting edit pipeline").await;

    match execute(ctx, &job).await {
        Ok(output_uri) => {
            let completed = job.complete(&output_uri);
            if let Err(e) = ctx.store.update(&completed).await {
                error!(job_id = %job_id, "Failed to persist completion: {}", e);
            }
            ctx.tracker.complete(&job_id, "edit complete").await;
            info!(job_id = %job_id, output = %output_uri, "Job completed");
        }
        Err(e) => {
            error!(job_id = %job_id, error = %e, "Job failed");
            let message = e.public_message();
            let failed = job.fail(message);
            if let Err(se) = ctx.store.update(&failed).await {
                error!(job_id = %job_id, "Failed to persist failure: {}", se);
            }
            ctx.tracker.fail(&job_id, message).await;
        }
    }
}

/// Allocate the workspace, run the steps under the job deadline, clean up.
async fn execute(ctx: &PipelineContext, job: &EditJob) -> PipelineResult<String> {
    let workspace = JobWorkspace::create(Path::new(&ctx.config.work_dir), job.id.as_str())
        .await
        .map_err(|e| PipelineError::resource(e.to_string()))?;

    let result = bounded(
        &ctx.cancel_rx,
        "job",
        ctx.config.job_timeout,
        run_steps(ctx, job, &workspace),
    )
    .await;

    workspace.cleanup().await;
    result
}

async fn run_steps(
    ctx: &PipelineContext,
    job: &EditJob,
    workspace: &JobWorkspace,
) -> PipelineResult<String> {
    let config = &ctx.config;
    let tracker = &ctx.tracker;
    let job_id = &job.id;

    // Fetch source
    tracker.update(job_id, 5, "downloading source video").await;
    let source = workspace.file("source.mp4");
    bounded(&ctx.cancel_rx, "source fetch", config.transfer_timeout, async {
        transfer::fetch(&job.source_uri, &source)
            .await
            .map_err(PipelineError::SourceFetch)
    })
    .await?;
    tracker.update(job_id, 15, "source downloaded").await;

    // Probe
    let info = probe_video(&source)
        .await
        .map_err(PipelineError::Processing)?;

    // Schedule
    let plan = schedule(&job.operations);
    tracker
        .update(
            job_id,
            20,
            format!(
                "planned {} cuts, {} audio overlays",
                plan.cut_timestamps.len(),
                plan.audio.len()
            ),
        )
        .await;

    // Cut
    let cut_config = CutConfig {
        margin_secs: config.cut_margin_secs,
        ..CutConfig::default()
    };
    let cut_plan = plan_cuts(&plan.cut_timestamps, info.duration, &cut_config);
    let cut_path = workspace.file("cut.mp4");

    tracker.update(job_id, 25, "applying cuts").await;
    {
        let cancel = ctx.cancel_rx.clone();
        let tool_timeout = config.tool_timeout.as_secs();
        let seg_tracker = tracker.clone();
        let seg_job_id = job_id.clone();

        apply_cut_plan(
            &source,
            &cut_path,
            &cut_plan,
            move || {
                FfmpegRunner::new()
                    .with_cancel(cancel.clone())
                    .with_timeout(tool_timeout)
            },
            move |done, total| {
                let percent = (25 + 30 * done / total.max(1)) as u8;
                let tracker = seg_tracker.clone();
                let job_id = seg_job_id.clone();
                tokio::spawn(async move {
                    tracker
                        .update(&job_id, percent, format!("extracted segment {}/{}", done, total))
                        .await;
                });
            },
        )
        .await
        .map_err(map_tool_error)?;
    }
    tracker.update(job_id, 55, "cuts applied").await;

    // Mix
    let overlays = resolve_overlays(ctx, workspace, &plan.audio).await?;
    tracker
        .update(job_id, 60, format!("mixing {} audio tracks", overlays.len()))
        .await;

    let mix_plan = MixPlan::new(overlays, job.settings.music_gain(), info.has_audio);
    let mixed_path = workspace.file("mixed.mp4");
    apply_mix_plan(
        &cut_path,
        &mixed_path,
        &mix_plan,
        FfmpegRunner::new()
            .with_cancel(ctx.cancel_rx.clone())
            .with_timeout(config.tool_timeout.as_secs()),
    )
    .await
    .map_err(map_tool_error)?;
    tracker.update(job_id, 85, "audio mix complete").await;

    // Upload
    let output_uri = artifact_uri(&config.output_base_uri, job_id);
    tracker.update(job_id, 90, "uploading output").await;
    bounded(&ctx.cancel_rx, "upload", config.transfer_timeout, async {
        transfer::upload(&mixed_path, &output_uri)
            .await
            .map_err(PipelineError::Upload)
    })
    .await?;
    tracker.update(job_id, 95, "upload complete").await;

    Ok(output_uri)
}

/// Fetch each overlay asset, degrading unreachable ones to silence.
///
/// A missing one-off overlay must not invalidate an otherwise-successful
/// edit; only cancellation aborts here.
async fn resolve_overlays(
    ctx: &PipelineContext,
    workspace: &JobWorkspace,
    operations: &[AudioOperation],
) -> PipelineResult<Vec<ScheduledOverlay>> {
    let mut overlays = Vec::with_capacity(operations.len());

    for (i, op) in operations.iter().enumerate() {
        let dest = workspace.file(&format!(
            "overlay_{:02}.{}",
            i,
            asset_extension(&op.asset_uri)
        ));

        let fetched = bounded(
            &ctx.cancel_rx,
            "overlay fetch",
            ctx.config.transfer_timeout,
            async {
                transfer::fetch(&op.asset_uri, &dest)
                    .await
                    .map_err(PipelineError::SourceFetch)
            },
        )
        .await;

        match fetched {
            Ok(()) => {
                overlays.push(ScheduledOverlay::from_file(
                    op.start_seconds,
                    op.kind.gain(),
                    dest,
                ));
            }
            Err(PipelineError::Cancelled) => return Err(PipelineError::Cancelled),
            Err(e) => {
                warn!(
                    asset_uri = %op.asset_uri,
                    error = %e,
                    "Audio asset unreachable, degrading overlay to silence"
                );
                overlays.push(ScheduledOverlay::silence(
                    op.start_seconds,
                    op.kind.gain(),
                    op.declared_duration,
                ));
            }
        }
    }

    Ok(overlays)
}

/// Run a step future against the cancel signal and a deadline.
async fn bounded<T, F>(
    cancel_rx: &watch::Receiver<bool>,
    step: &'static str,
    limit: Duration,
    fut: F,
) -> PipelineResult<T>
where
    F: Future<Output = PipelineResult<T>>,
{
    let mut cancel = cancel_rx.clone();

    tokio::select! {
        result = fut => result,
        _ = tokio::time::sleep(limit) => Err(PipelineError::StepTimeout {
            step,
            secs: limit.as_secs(),
        }),
        _ = cancelled(&mut cancel) => Err(PipelineError::Cancelled),
    }
}

async fn cancelled(rx: &mut watch::Receiver<bool>) {
    while !*rx.borrow() {
        if rx.changed().await.is_err() {
            // Sender gone; cancellation can never arrive
            std::future::pending::<()>().await;
        }
    }
}

fn map_tool_error(e: MediaError) -> PipelineError {
    match e {
        MediaError::Cancelled => PipelineError::Cancelled,
        MediaError::Timeout(secs) => PipelineError::StepTimeout {
            step: "ffmpeg",
            secs,
        },
        other => PipelineError::Processing(other),
    }
}

/// Destination URI for a job's finished artifact.
fn artifact_uri(base: &str, job_id: &JobId) -> String {
    format!("{}/{}.mp4", base.trim_end_matches('/'), job_id)
}

/// File extension for a fetched overlay, from the asset URI when sensible.
fn asset_extension(uri: &str) -> &str {
    uri.rsplit('/')
        .next()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.len() <= 4 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or("mp3")
}
