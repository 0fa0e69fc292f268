//! Jump-cut planning and lossless application.
//!
//! A cut timestamp removes a fixed-margin window around it. Overlapping or
//! touching windows are merged into maximal disjoint windows; the complement
//! within `[0, D]` is the ordered list of keep-segments. Keep-segments are
//! extracted with stream copy and joined with the concat demuxer, so the
//! output preserves the original codec data.
//!
//! Stream copy requires keyframe-aligned seeks; FFmpeg snaps to the nearest
//! keyframe before the requested start, so segment boundaries can land a few
//! frames early. Quality and codec are preserved without generation loss.

use std::path::Path;

use tracing::{debug, info};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Cut planning parameters.
#[derive(Debug, Clone)]
pub struct CutConfig {
    /// Half-width of the excised window around each cut timestamp.
    pub margin_secs: f64,
    /// Keep-segments shorter than this are dropped (sub-frame guard).
    pub min_segment_secs: f64,
}

impl Default for CutConfig {
    fn default() -> Self {
        Self {
            margin_secs: 0.25,
            min_segment_secs: 0.05,
        }
    }
}

/// A half-open time span in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub start: f64,
    pub end: f64,
}

impl Span {
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// The full plan for one cut pass.
#[derive(Debug, Clone)]
pub struct CutPlan {
    /// Merged, disjoint cut windows sorted ascending
    pub windows: Vec<Span>,
    /// Ordered keep-segments (the complement of the windows)
    pub keeps: Vec<Span>,
    /// Source duration the plan was computed against
    pub source_duration: f64,
}

impl CutPlan {
    /// Whether the plan changes the video at all.
    pub fn is_passthrough(&self) -> bool {
        self.windows.is_empty()
    }

    /// Total duration of the kept material.
    pub fn kept_duration(&self) -> f64 {
        self.keeps.iter().map(Span::duration).sum()
    }

    /// Total duration removed by the merged windows.
    pub fn removed_duration(&self) -> f64 {
        self.windows.iter().map(Span::duration).sum()
    }
}

/// Compute merged cut windows and keep-segments for the given timestamps.
///
/// Timestamps outside `[0, duration]` clamp their windows to the valid range;
/// a window clamped to zero length disappears. The cut list does not need to
/// be sorted.
pub fn plan_cuts(cut_timestamps: &[f64], duration: f64, config: &CutConfig) -> CutPlan {
    let windows = merge_windows(cut_timestamps, duration, config.margin_secs);
    let keeps = complement(&windows, duration, config.min_segment_secs);

    CutPlan {
        windows,
        keeps,
        source_duration: duration,
    }
}

/// Clamp per-cut windows to `[0, duration]` and merge overlapping or touching
/// ones into maximal disjoint windows (sort by start, sweep, merge while the
/// next start does not exceed the current end).
fn merge_windows(cut_timestamps: &[f64], duration: f64, margin: f64) -> Vec<Span> {
    let mut windows: Vec<Span> = cut_timestamps
        .iter()
        .map(|&t| Span {
            start: (t - margin).max(0.0),
            end: (t + margin).min(duration),
        })
        .filter(|w| w.end > w.start)
        .collect();

    windows.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut merged: Vec<Span> = Vec::with_capacity(windows.len());
    for window in windows {
        match merged.last_mut() {
            Some(current) if window.start <= current.end => {
                current.end = current.end.max(window.end);
            }
            _ => merged.push(window),
        }
    }

    merged
}

/// The ordered complement of disjoint windows within `[0, duration]`,
/// omitting slivers shorter than `min_segment`.
fn complement(windows: &[Span], duration: f64, min_segment: f64) -> Vec<Span> {
    let mut keeps = Vec::with_capacity(windows.len() + 1);
    let mut cursor = 0.0;

    for window in windows {
        if window.start - cursor >= min_segment {
            keeps.push(Span {
                start: cursor,
                end: window.start,
            });
        }
        cursor = window.end;
    }

    if duration - cursor >= min_segment {
        keeps.push(Span {
            start: cursor,
            end: duration,
        });
    }

    keeps
}

/// Apply a cut plan: extract each keep-segment with stream copy and
/// concatenate them in order.
///
/// An empty plan copies the input byte-for-byte. Progress is reported as the
/// fraction of segments extracted.
pub async fn apply_cut_plan<F>(
    input: &Path,
    output: &Path,
    plan: &CutPlan,
    runner: impl Fn() -> FfmpegRunner,
    mut on_segment: F,
) -> MediaResult<()>
where
    F: FnMut(usize, usize),
{
    if plan.is_passthrough() {
        debug!(input = %input.display(), "No cut windows, copying source through");
        tokio::fs::copy(input, output).await?;
        return Ok(());
    }

    if plan.keeps.is_empty() {
        return Err(MediaError::InvalidVideo(
            "Cut windows cover the entire source".to_string(),
        ));
    }

    info!(
        segments = plan.keeps.len(),
        removed_secs = format!("{:.2}", plan.removed_duration()),
        "Extracting keep-segments with stream copy"
    );

    let temp_dir = tempfile::tempdir()?;
    let mut segment_paths = Vec::with_capacity(plan.keeps.len());
    let total = plan.keeps.len();

    for (i, keep) in plan.keeps.iter().enumerate() {
        let seg_path = temp_dir.path().join(format!("seg_{:04}.mp4", i));

        let cmd = FfmpegCommand::new(input, &seg_path)
            .seek(keep.start)
            .duration(keep.duration())
            .codec_copy()
            .output_args(["-avoid_negative_ts", "make_zero"]);

        runner().run(&cmd).await.map_err(|e| match e {
            MediaError::FfmpegFailed {
                message,
                stderr,
                exit_code,
            } => MediaError::FfmpegFailed {
                message: format!("segment {} extraction failed: {}", i, message),
                stderr,
                exit_code,
            },
            other => other,
        })?;

        segment_paths.push(seg_path);
        on_segment(i + 1, total);
    }

    // Concat demuxer list
    let concat_list = temp_dir.path().join("concat.txt");
    let list_content: String = segment_paths
        .iter()
        .map(|p| format!("file '{}'\n", p.display()))
        .collect();
    tokio::fs::write(&concat_list, &list_content).await?;

    let cmd = FfmpegCommand::new(&concat_list, output)
        .input_args(["-f", "concat", "-safe", "0"])
        .codec_copy()
        .output_args(["-movflags", "+faststart"]);

    runner().run(&cmd).await?;

    info!(segments = total, "Cut concat completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_reference_merge_case() {
        // Cuts at 5.0, 15.0 and 15.1 on a 30s video with a 0.25s margin: the
        // two late windows overlap and merge into one.
        let plan = plan_cuts(&[5.0, 15.0, 15.1], 30.0, &CutConfig::default());

        assert_eq!(plan.windows.len(), 2);
        assert!(close(plan.windows[0].start, 4.75));
        assert!(close(plan.windows[0].end, 5.25));
        assert!(close(plan.windows[1].start, 14.75));
        assert!(close(plan.windows[1].end, 15.35));

        assert_eq!(plan.keeps.len(), 3);
        assert!(close(plan.keeps[0].start, 0.0));
        assert!(close(plan.keeps[0].end, 4.75));
        assert!(close(plan.keeps[1].start, 5.25));
        assert!(close(plan.keeps[1].end, 14.75));
        assert!(close(plan.keeps[2].start, 15.35));
        assert!(close(plan.keeps[2].end, 30.0));
    }

    #[test]
    fn test_unsorted_input() {
        let sorted = plan_cuts(&[5.0, 15.0, 15.1], 30.0, &CutConfig::default());
        let shuffled = plan_cuts(&[15.1, 5.0, 15.0], 30.0, &CutConfig::default());
        assert_eq!(sorted.windows, shuffled.windows);
        assert_eq!(sorted.keeps, shuffled.keeps);
    }

    #[test]
    fn test_lossless_length() {
        let cases: &[&[f64]] = &[
            &[],
            &[0.0],
            &[5.0, 15.0, 15.1],
            &[1.0, 1.1, 1.2, 1.3],
            &[29.9],
            &[0.1, 29.95, 10.0],
        ];

        for cuts in cases {
            let plan = plan_cuts(cuts, 30.0, &CutConfig::default());
            let expected = 30.0 - plan.removed_duration();
            // Sub-frame slivers may be dropped from the keeps, never added
            assert!(plan.kept_duration() <= expected + 1e-9);
            assert!(expected - plan.kept_duration() < 2.0 * 0.05 * (cuts.len() as f64 + 1.0));
        }
    }

    #[test]
    fn test_empty_cut_list_is_passthrough() {
        let plan = plan_cuts(&[], 30.0, &CutConfig::default());
        assert!(plan.is_passthrough());
        assert_eq!(plan.keeps.len(), 1);
        assert!(close(plan.keeps[0].duration(), 30.0));
    }

    #[test]
    fn test_window_touching_edges() {
        // A cut at t=0.1 clamps its window to [0, 0.35]; the leading
        // keep-segment disappears.
        let plan = plan_cuts(&[0.1], 30.0, &CutConfig::default());
        assert_eq!(plan.windows.len(), 1);
        assert!(close(plan.windows[0].start, 0.0));
        assert_eq!(plan.keeps.len(), 1);
        assert!(close(plan.keeps[0].start, 0.35));

        // Same at the tail.
        let plan = plan_cuts(&[29.95], 30.0, &CutConfig::default());
        assert_eq!(plan.keeps.len(), 1);
        assert!(close(plan.keeps[0].end, 29.7));
    }

    #[test]
    fn test_sub_frame_sliver_dropped() {
        // Two windows 0.52s apart leave a 0.02s keep-segment between them,
        // shorter than one frame; it must be omitted, not extracted.
        let plan = plan_cuts(&[1.0, 1.52], 30.0, &CutConfig::default());
        assert_eq!(plan.windows.len(), 2);
        assert_eq!(plan.keeps.len(), 2);
        assert!(close(plan.keeps[0].end, 0.75));
        assert!(close(plan.keeps[1].start, 1.77));
    }

    #[test]
    fn test_windows_covering_everything() {
        let plan = plan_cuts(&[0.2], 0.5, &CutConfig::default());
        assert!(plan.keeps.is_empty());
    }

    #[test]
    fn test_duplicate_timestamps_merge() {
        let plan = plan_cuts(&[10.0, 10.0, 10.0], 30.0, &CutConfig::default());
        assert_eq!(plan.windows.len(), 1);
        assert!(close(plan.windows[0].start, 9.75));
        assert!(close(plan.windows[0].end, 10.25));
    }
}
