//! API routes.

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::healthz;
use crate::handlers::jobs::{get_job, submit_job};
use crate::handlers::presets::list_presets;
use crate::state::AppState;
use crate::ws::job_progress_ws;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Submission and query
        .route("/jobs", post(submit_job))
        .route("/jobs/:job_id", get(get_job))
        // Live progress stream
        .route("/jobs/:job_id/progress", get(job_progress_ws))
        // Preset catalog
        .route("/presets", get(list_presets));

    Router::new()
        .route("/healthz", get(healthz))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config))
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .with_state(state)
}

fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.cors_origins.iter().any(|o| o == "*") {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        layer.allow_origin(origins)
    }
}
