//! Preset catalog handlers.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use vedit_models::Preset;
use vedit_store::PresetStore;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Serialize)]
pub struct PresetsResponse {
    pub presets: Vec<Preset>,
}

/// GET /api/presets
///
/// The catalog clients prefill the editor from; skeleton operations are
/// applied client-side before submission.
pub async fn list_presets(State(state): State<AppState>) -> ApiResult<Json<PresetsResponse>> {
    let presets = state
        .presets
        .preset_ids()
        .iter()
        .filter_map(|id| state.presets.preset(id))
        .collect();

    Ok(Json(PresetsResponse { presets }))
}
