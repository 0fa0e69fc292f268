//! Timestamped edit operations.
//!
//! Each operation kind carries only its relevant fields and is validated at
//! submission time. Operations are ordered by timestamp ascending with ties
//! preserving submission order; they are immutable once a job starts
//! processing.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single timestamped edit applied to the source video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EditOperation {
    /// Excise a short time window around the timestamp to tighten pacing.
    JumpCut {
        /// Cut point in seconds from the start of the video.
        timestamp_seconds: f64,
    },

    /// Overlay a recorded voice track starting at the timestamp.
    VoiceOver {
        timestamp_seconds: f64,
        /// URI of the audio asset to overlay.
        asset_uri: String,
        /// Declared length of the asset, used for the silence fallback.
        #[serde(skip_serializing_if = "Option::is_none")]
        duration_seconds: Option<f64>,
    },

    /// Overlay a one-off sound effect starting at the timestamp.
    SoundEffect {
        timestamp_seconds: f64,
        asset_uri: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        duration_seconds: Option<f64>,
    },

    /// A pacing transition anchored at a cut point.
    Transition {
        timestamp_seconds: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        duration_seconds: Option<f64>,
    },
}

/// Audio overlay kinds, used to select the per-kind mixing gain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AudioKind {
    VoiceOver,
    SoundEffect,
}

impl AudioKind {
    /// Mixing gain applied to this kind before summing tracks.
    ///
    /// Voice-overs mix at full gain; sound effects are attenuated so they
    /// sit under speech.
    pub fn gain(&self) -> f64 {
        match self {
            AudioKind::VoiceOver => 1.0,
            AudioKind::SoundEffect => 0.7,
        }
    }
}

impl EditOperation {
    /// Timestamp of this operation in seconds.
    pub fn timestamp_seconds(&self) -> f64 {
        match self {
            EditOperation::JumpCut { timestamp_seconds }
            | EditOperation::VoiceOver {
                timestamp_seconds, ..
            }
            | EditOperation::SoundEffect {
                timestamp_seconds, ..
            }
            | EditOperation::Transition {
                timestamp_seconds, ..
            } => *timestamp_seconds,
        }
    }

    /// Declared duration, if the operation carries one.
    pub fn duration_seconds(&self) -> Option<f64> {
        match self {
            EditOperation::JumpCut { .. } => None,
            EditOperation::VoiceOver {
                duration_seconds, ..
            }
            | EditOperation::SoundEffect {
                duration_seconds, ..
            }
            | EditOperation::Transition {
                duration_seconds, ..
            } => *duration_seconds,
        }
    }

    /// Whether this operation contributes a cut timestamp.
    pub fn is_cut(&self) -> bool {
        matches!(
            self,
            EditOperation::JumpCut { .. } | EditOperation::Transition { .. }
        )
    }

    /// The audio kind for overlay operations, `None` for temporal ones.
    pub fn audio_kind(&self) -> Option<AudioKind> {
        match self {
            EditOperation::VoiceOver { .. } => Some(AudioKind::VoiceOver),
            EditOperation::SoundEffect { .. } => Some(AudioKind::SoundEffect),
            _ => None,
        }
    }

    /// Asset URI for overlay operations.
    pub fn asset_uri(&self) -> Option<&str> {
        match self {
            EditOperation::VoiceOver { asset_uri, .. }
            | EditOperation::SoundEffect { asset_uri, .. } => Some(asset_uri),
            _ => None,
        }
    }

    /// Short kind name for logs and error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            EditOperation::JumpCut { .. } => "jump_cut",
            EditOperation::VoiceOver { .. } => "voice_over",
            EditOperation::SoundEffect { .. } => "sound_effect",
            EditOperation::Transition { .. } => "transition",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_tagged_serialization() {
        let op = EditOperation::JumpCut {
            timestamp_seconds: 12.5,
        };
        let json = serde_json::to_string(&op).unwrap();
        assert!(json.contains("\"kind\":\"jump_cut\""));
        assert!(json.contains("12.5"));
    }

    #[test]
    fn test_overlay_round_trip() {
        let op = EditOperation::SoundEffect {
            timestamp_seconds: 3.0,
            asset_uri: "https://assets.example.com/whoosh.mp3".to_string(),
            duration_seconds: Some(1.5),
        };
        let json = serde_json::to_string(&op).unwrap();
        let back: EditOperation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, op);
        assert_eq!(back.audio_kind(), Some(AudioKind::SoundEffect));
    }

    #[test]
    fn test_partition_helpers() {
        let cut = EditOperation::JumpCut {
            timestamp_seconds: 1.0,
        };
        let transition = EditOperation::Transition {
            timestamp_seconds: 2.0,
            duration_seconds: None,
        };
        let vo = EditOperation::VoiceOver {
            timestamp_seconds: 3.0,
            asset_uri: "file:///tmp/vo.wav".to_string(),
            duration_seconds: None,
        };

        assert!(cut.is_cut());
        assert!(transition.is_cut());
        assert!(!vo.is_cut());
        assert_eq!(vo.audio_kind(), Some(AudioKind::VoiceOver));
        assert!(cut.audio_kind().is_none());
    }

    #[test]
    fn test_kind_gains() {
        assert!((AudioKind::VoiceOver.gain() - 1.0).abs() < f64::EPSILON);
        assert!((AudioKind::SoundEffect.gain() - 0.7).abs() < f64::EPSILON);
    }
}
