//! Editing presets and the preset recommendation collaborator.

use vedit_models::{EditSettings, Preset};

/// Supplies default settings and a skeleton operation list for a named style.
pub trait PresetStore: Send + Sync {
    /// Look up a preset by id.
    fn preset(&self, id: &str) -> Option<Preset>;

    /// Ids of all known presets.
    fn preset_ids(&self) -> Vec<String>;
}

/// Optionally suggests which preset to prefill for a submission.
///
/// The pipeline treats the suggestion purely as input configuration; scoring
/// lives behind this interface.
pub trait RecommendationEngine: Send + Sync {
    fn suggest(&self, source_uri: &str) -> Option<String>;
}

/// Built-in preset catalog.
pub struct StaticPresetStore {
    presets: Vec<Preset>,
}

impl StaticPresetStore {
    pub fn new() -> Self {
        Self {
            presets: vec![
                Preset {
                    id: "talking_head".to_string(),
                    name: "Talking head".to_string(),
                    settings: EditSettings {
                        jump_cut_frequency: 8.0,
                        music_volume: 60,
                    },
                    operations: Vec::new(),
                },
                Preset {
                    id: "podcast".to_string(),
                    name: "Podcast".to_string(),
                    settings: EditSettings {
                        jump_cut_frequency: 2.0,
                        music_volume: 40,
                    },
                    operations: Vec::new(),
                },
                Preset {
                    id: "tutorial".to_string(),
                    name: "Tutorial".to_string(),
                    settings: EditSettings {
                        jump_cut_frequency: 4.0,
                        music_volume: 70,
                    },
                    operations: Vec::new(),
                },
            ],
        }
    }
}

impl Default for StaticPresetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PresetStore for StaticPresetStore {
    fn preset(&self, id: &str) -> Option<Preset> {
        self.presets.iter().find(|p| p.id == id).cloned()
    }

    fn preset_ids(&self) -> Vec<String> {
        self.presets.iter().map(|p| p.id.clone()).collect()
    }
}

/// Default recommender: matches preset ids against the source URI.
///
/// Stands in for the hosted scoring service in single-node deployments.
pub struct KeywordRecommender {
    known_ids: Vec<String>,
}

impl KeywordRecommender {
    pub fn new(store: &dyn PresetStore) -> Self {
        Self {
            known_ids: store.preset_ids(),
        }
    }
}

impl RecommendationEngine for KeywordRecommender {
    fn suggest(&self, source_uri: &str) -> Option<String> {
        let lowered = source_uri.to_lowercase();
        self.known_ids
            .iter()
            .find(|id| lowered.contains(id.as_str()))
            .cloned()
    }
}
