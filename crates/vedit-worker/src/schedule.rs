//! Operation scheduling.
//!
//! Normalizes the raw operation list into the two ordered sequences the
//! pipeline consumes: cut timestamps for the segment cutter and audio
//! overlays for the mixer. Sorting is by timestamp ascending with ties
//! preserving submission order; nothing is dropped or deduplicated.

use vedit_models::{AudioKind, EditOperation};

/// An audio overlay as scheduled for the mixer.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioOperation {
    /// Start position on the output timeline, seconds.
    pub start_seconds: f64,
    /// URI of the audio asset.
    pub asset_uri: String,
    /// Overlay kind, selecting the mixing gain.
    pub kind: AudioKind,
    /// Declared asset length, used for the silence fallback.
    pub declared_duration: Option<f64>,
}

/// The ordered partition of a job's operations.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScheduledOperations {
    /// Cut timestamps ascending (jump cuts and transitions).
    pub cut_timestamps: Vec<f64>,
    /// Audio overlays ascending by start time.
    pub audio: Vec<AudioOperation>,
}

/// Partition and order a raw operation list.
///
/// Pure: the input is left untouched and scheduling twice yields the same
/// partition.
pub fn schedule(operations: &[EditOperation]) -> ScheduledOperations {
    let mut ordered: Vec<&EditOperation> = operations.iter().collect();
    // Stable sort keeps submission order for equal timestamps
    ordered.sort_by(|a, b| a.timestamp_seconds().total_cmp(&b.timestamp_seconds()));

    let mut scheduled = ScheduledOperations::default();

    for op in ordered {
        if op.is_cut() {
            scheduled.cut_timestamps.push(op.timestamp_seconds());
        } else if let (Some(kind), Some(asset_uri)) = (op.audio_kind(), op.asset_uri()) {
            scheduled.audio.push(AudioOperation {
                start_seconds: op.timestamp_seconds(),
                asset_uri: asset_uri.to_string(),
                kind,
                declared_duration: op.duration_seconds(),
            });
        }
    }

    scheduled
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ops() -> Vec<EditOperation> {
        vec![
            EditOperation::VoiceOver {
                timestamp_seconds: 12.0,
                asset_uri: "file:///assets/intro.wav".to_string(),
                duration_seconds: Some(4.0),
            },
            EditOperation::JumpCut {
                timestamp_seconds: 5.0,
            },
            EditOperation::SoundEffect {
                timestamp_seconds: 5.0,
                asset_uri: "file:///assets/whoosh.mp3".to_string(),
                duration_seconds: None,
            },
            EditOperation::Transition {
                timestamp_seconds: 20.0,
                duration_seconds: Some(0.5),
            },
            EditOperation::JumpCut {
                timestamp_seconds: 2.0,
            },
        ]
    }

    #[test]
    fn test_partition_and_order() {
        let scheduled = schedule(&ops());

        assert_eq!(scheduled.cut_timestamps, vec![2.0, 5.0, 20.0]);
        assert_eq!(scheduled.audio.len(), 2);
        assert_eq!(scheduled.audio[0].start_seconds, 5.0);
        assert_eq!(scheduled.audio[0].kind, AudioKind::SoundEffect);
        assert_eq!(scheduled.audio[1].start_seconds, 12.0);
        assert_eq!(scheduled.audio[1].kind, AudioKind::VoiceOver);
    }

    #[test]
    fn test_scheduling_is_idempotent() {
        let input = ops();
        let first = schedule(&input);
        let second = schedule(&input);
        assert_eq!(first, second);

        // The input list is untouched
        assert_eq!(input, ops());
    }

    #[test]
    fn test_ties_preserve_submission_order() {
        let input = vec![
            EditOperation::VoiceOver {
                timestamp_seconds: 3.0,
                asset_uri: "file:///a/first.wav".to_string(),
                duration_seconds: None,
            },
            EditOperation::VoiceOver {
                timestamp_seconds: 3.0,
                asset_uri: "file:///a/second.wav".to_string(),
                duration_seconds: None,
            },
        ];

        let scheduled = schedule(&input);
        assert_eq!(scheduled.audio[0].asset_uri, "file:///a/first.wav");
        assert_eq!(scheduled.audio[1].asset_uri, "file:///a/second.wav");
    }

    #[test]
    fn test_nothing_dropped() {
        let input = ops();
        let scheduled = schedule(&input);
        assert_eq!(
            scheduled.cut_timestamps.len() + scheduled.audio.len(),
            input.len()
        );
    }

    #[test]
    fn test_empty_input() {
        let scheduled = schedule(&[]);
        assert!(scheduled.cut_timestamps.is_empty());
        assert!(scheduled.audio.is_empty());
    }
}
