//! vedit server binary.
//!
//! Single process: the HTTP API and the worker pool share the in-process
//! queue, job store and progress tracker.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vedit_api::{create_router, ApiConfig, AppState};
use vedit_queue::{JobQueue, ProgressTracker, QueueConfig};
use vedit_store::{JobStore, KeywordRecommender, MemoryJobStore, StaticPresetStore};
use vedit_worker::{JobExecutor, WorkerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if use_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer())
            .init();
    }

    let api_config = ApiConfig::from_env();
    let worker_config = WorkerConfig::from_env();

    let store: Arc<dyn JobStore> = Arc::new(MemoryJobStore::new());
    let presets = Arc::new(StaticPresetStore::new());
    let recommender = Arc::new(KeywordRecommender::new(presets.as_ref()));
    let tracker = ProgressTracker::new();
    let (queue, receiver) = JobQueue::new(QueueConfig::from_env());

    let (executor, executor_handle) = JobExecutor::new(
        worker_config,
        receiver,
        Arc::clone(&store),
        tracker.clone(),
    );
    let executor_task = tokio::spawn(executor.run());

    let state = AppState::new(
        api_config.clone(),
        store,
        presets,
        recommender,
        tracker,
        queue,
    );
    let app = create_router(state);

    let addr = format!("{}:{}", api_config.host, api_config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("vedit server listening on {}", addr);

    let shutdown_handle = executor_handle.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
            shutdown_handle.shutdown();
        })
        .await?;

    executor_handle.shutdown();
    let _ = executor_task.await;

    info!("vedit server stopped");
    Ok(())
}
