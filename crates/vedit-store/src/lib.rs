//! Durable job storage and configuration collaborators.
//!
//! This crate provides:
//! - The `JobStore` trait for the persisted job record, with an in-process
//!   default for single-node deployments
//! - The `PresetStore` and `RecommendationEngine` collaborator traits with
//!   built-in defaults

pub mod error;
pub mod jobs;
pub mod presets;

pub use error::{StoreError, StoreResult};
pub use jobs::{JobStore, MemoryJobStore};
pub use presets::{KeywordRecommender, PresetStore, RecommendationEngine, StaticPresetStore};
