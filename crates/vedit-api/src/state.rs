//! Application state.

use std::sync::Arc;

use vedit_queue::{JobQueue, ProgressTracker};
use vedit_store::{JobStore, PresetStore, RecommendationEngine};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Arc<dyn JobStore>,
    pub presets: Arc<dyn PresetStore>,
    pub recommender: Arc<dyn RecommendationEngine>,
    pub tracker: ProgressTracker,
    pub queue: JobQueue,
}

impl AppState {
    pub fn new(
        config: ApiConfig,
        store: Arc<dyn JobStore>,
        presets: Arc<dyn PresetStore>,
        recommender: Arc<dyn RecommendationEngine>,
        tracker: ProgressTracker,
        queue: JobQueue,
    ) -> Self {
        Self {
            config,
            store,
            presets,
            recommender,
            tracker,
            queue,
        }
    }
}
