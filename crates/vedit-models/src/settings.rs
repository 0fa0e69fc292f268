//! Job settings and named presets.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::operation::EditOperation;

/// Per-job edit settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Validate)]
pub struct EditSettings {
    /// Target jump cuts per minute, carried through to content generation.
    #[validate(range(min = 0.0, max = 60.0))]
    #[serde(default = "default_jump_cut_frequency")]
    pub jump_cut_frequency: f32,

    /// Overall volume applied to the mixed audio track (0-100).
    #[validate(range(max = 100))]
    #[serde(default = "default_music_volume")]
    pub music_volume: u8,
}

fn default_jump_cut_frequency() -> f32 {
    4.0
}

fn default_music_volume() -> u8 {
    80
}

impl Default for EditSettings {
    fn default() -> Self {
        Self {
            jump_cut_frequency: default_jump_cut_frequency(),
            music_volume: default_music_volume(),
        }
    }
}

impl EditSettings {
    /// Linear gain for the final mix stage.
    pub fn music_gain(&self) -> f64 {
        f64::from(self.music_volume) / 100.0
    }
}

/// A named editing style: default settings plus a skeleton operation list.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Preset {
    /// Preset identifier (e.g. "talking_head")
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Default settings for jobs using this preset
    pub settings: EditSettings,
    /// Skeleton operations prefilled into the editor
    #[serde(default)]
    pub operations: Vec<EditOperation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = EditSettings::default();
        assert_eq!(settings.music_volume, 80);
        assert!((settings.music_gain() - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_settings_validation() {
        let ok = EditSettings {
            jump_cut_frequency: 6.0,
            music_volume: 100,
        };
        assert!(ok.validate().is_ok());

        let bad = EditSettings {
            jump_cut_frequency: -1.0,
            music_volume: 50,
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_settings_defaults_from_json() {
        let settings: EditSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, EditSettings::default());
    }
}
