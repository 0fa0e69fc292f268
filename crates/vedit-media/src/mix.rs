//! Multi-track audio mixing.
//!
//! Each overlay is scheduled onto the timeline with `adelay`, scaled by its
//! per-kind gain, then summed with the base audio track via `amix` with
//! `duration=longest`. The job's music-volume setting scales the mixed
//! result. The video stream is never re-encoded.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::command::{FfmpegCommand, FfmpegRunner, InputSpec};
use crate::error::MediaResult;

/// Silence fallback length when an overlay declares no duration.
pub const DEFAULT_SILENCE_SECS: f64 = 2.0;

/// Where an overlay's samples come from.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlaySource {
    /// A fetched audio asset on disk.
    File(PathBuf),
    /// Silence standing in for an unreachable asset.
    Silence { duration_seconds: f64 },
}

/// One scheduled audio overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledOverlay {
    /// Start position on the output timeline, seconds.
    pub start_seconds: f64,
    /// Per-kind gain applied before mixing.
    pub gain: f64,
    /// Sample source.
    pub source: OverlaySource,
}

impl ScheduledOverlay {
    /// An overlay backed by a fetched asset file.
    pub fn from_file(start_seconds: f64, gain: f64, path: impl Into<PathBuf>) -> Self {
        Self {
            start_seconds,
            gain,
            source: OverlaySource::File(path.into()),
        }
    }

    /// The degraded form: silence of the declared duration.
    pub fn silence(start_seconds: f64, gain: f64, declared_duration: Option<f64>) -> Self {
        Self {
            start_seconds,
            gain,
            source: OverlaySource::Silence {
                duration_seconds: declared_duration.unwrap_or(DEFAULT_SILENCE_SECS),
            },
        }
    }

    fn delay_ms(&self) -> u64 {
        (self.start_seconds * 1000.0).round().max(0.0) as u64
    }
}

/// The complete mix for one job.
#[derive(Debug, Clone)]
pub struct MixPlan {
    /// Overlays in timestamp order.
    pub overlays: Vec<ScheduledOverlay>,
    /// Overall gain from the job's music-volume setting (0.0-1.0).
    pub music_gain: f64,
    /// Whether the base video carries an audio stream.
    pub base_has_audio: bool,
}

impl MixPlan {
    pub fn new(overlays: Vec<ScheduledOverlay>, music_gain: f64, base_has_audio: bool) -> Self {
        Self {
            overlays,
            music_gain,
            base_has_audio,
        }
    }

    /// With no overlays the video passes through untouched.
    pub fn is_passthrough(&self) -> bool {
        self.overlays.is_empty()
    }

    /// Extra FFmpeg inputs after the primary video, in graph order.
    fn extra_inputs(&self) -> Vec<InputSpec> {
        let mut inputs: Vec<InputSpec> = self
            .overlays
            .iter()
            .map(|o| match &o.source {
                OverlaySource::File(path) => InputSpec::file(path),
                OverlaySource::Silence { duration_seconds } => InputSpec::lavfi(
                    "anullsrc=channel_layout=stereo:sample_rate=44100",
                    *duration_seconds,
                ),
            })
            .collect();

        if !self.base_has_audio {
            // Synthetic base so amix always has an original-audio input
            inputs.push(InputSpec::lavfi(
                "anullsrc=channel_layout=stereo:sample_rate=44100",
                0.1,
            ));
        }

        inputs
    }

    /// Build the `-filter_complex` graph for this plan.
    pub fn filter_graph(&self) -> String {
        let mut filters = Vec::with_capacity(self.overlays.len() + 2);

        for (i, overlay) in self.overlays.iter().enumerate() {
            let input_idx = i + 1;
            let delay_ms = overlay.delay_ms();
            filters.push(format!(
                "[{input_idx}:a]volume={gain:.2},adelay={delay_ms}|{delay_ms}[ovl{i}]",
                gain = overlay.gain,
            ));
        }

        let base_label = if self.base_has_audio {
            "[0:a]".to_string()
        } else {
            format!("[{}:a]", self.overlays.len() + 1)
        };

        let mut amix_inputs = base_label;
        for i in 0..self.overlays.len() {
            amix_inputs.push_str(&format!("[ovl{i}]"));
        }
        let total_inputs = self.overlays.len() + 1;
        filters.push(format!(
            "{amix_inputs}amix=inputs={total_inputs}:duration=longest:dropout_transition=0[mixed]"
        ));

        filters.push(format!(
            "[mixed]volume={:.2}[outa]",
            self.music_gain
        ));

        filters.join(";")
    }

    /// Build the full FFmpeg command for this plan.
    pub fn build_command(&self, input: &Path, output: &Path) -> FfmpegCommand {
        let mut cmd = FfmpegCommand::new(input, output);
        for spec in self.extra_inputs() {
            cmd = cmd.add_input(spec);
        }
        cmd.filter_complex(self.filter_graph())
            .map("0:v")
            .map("[outa]")
            .video_codec("copy")
            .audio_codec("aac")
            .audio_bitrate("192k")
            .output_args(["-movflags", "+faststart"])
    }
}

/// Apply a mix plan, remuxing the mixed track onto the unmodified video.
///
/// A passthrough plan copies the input as-is, original audio untouched.
pub async fn apply_mix_plan(
    input: &Path,
    output: &Path,
    plan: &MixPlan,
    runner: FfmpegRunner,
) -> MediaResult<()> {
    if plan.is_passthrough() {
        debug!(input = %input.display(), "No audio overlays, copying source through");
        tokio::fs::copy(input, output).await?;
        return Ok(());
    }

    info!(
        overlays = plan.overlays.len(),
        music_gain = format!("{:.2}", plan.music_gain),
        "Mixing audio overlays"
    );

    let cmd = plan.build_command(input, output);
    runner.run(&cmd).await
}
