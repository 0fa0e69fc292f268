//! FFmpeg CLI wrapper and asset transfer for the vedit pipeline.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with multi-input support
//! - A runner with cancellation, timeout and `-progress pipe:2` parsing
//! - Jump-cut planning (interval merge) and lossless application
//! - Multi-track audio mixing (adelay/volume/amix filter graphs)
//! - URI-addressed asset fetch and artifact upload
//! - Per-job working directories

pub mod command;
pub mod cuts;
pub mod error;
pub mod mix;
pub mod probe;
pub mod progress;
pub mod transfer;
pub mod workdir;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner, InputSpec};
pub use cuts::{apply_cut_plan, plan_cuts, CutConfig, CutPlan, Span};
pub use error::{MediaError, MediaResult};
pub use mix::{apply_mix_plan, MixPlan, OverlaySource, ScheduledOverlay, DEFAULT_SILENCE_SECS};
pub use probe::{get_duration, probe_video, VideoInfo};
pub use progress::ToolProgress;
pub use transfer::{fetch, move_file, upload};
pub use workdir::JobWorkspace;
