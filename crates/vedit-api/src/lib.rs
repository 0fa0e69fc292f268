//! HTTP API for the vedit editing pipeline.
//!
//! This crate provides:
//! - Job submission with synchronous validation
//! - Job status queries against the persisted record
//! - WebSocket progress streaming backed by the progress tracker
//! - The preset catalog endpoint

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod validate;
pub mod ws;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
