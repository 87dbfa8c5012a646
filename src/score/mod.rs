// src/score/mod.rs
//! Scoring core: rule bands, learned model, and the selection policy.
//!
//! Three pieces, composed by [`selector::ScoreSelector`]:
//! 1. a caller-supplied score wins outright;
//! 2. otherwise the learned regressor ([`model::LearnedScorer`]) predicts;
//! 3. otherwise the deterministic bands ([`rules`]) answer.
//!
//! Nothing in here throws past its boundary — every failure mode is a value
//! the next tier matches on.

pub mod dataset;
pub mod gbdt;
pub mod model;
pub mod reference;
pub mod rules;
pub mod selector;

use thiserror::Error;

// Re-export the types callers actually touch.
pub use model::{LearnedScorer, TrainingReport, DEFAULT_MODEL_PATH, FEATURES};
pub use selector::ScoreSelector;

/// Why the learned tier could not produce a score.
///
/// Persistence has its own channels: `save` returns `anyhow::Result` (an
/// explicit user action may fail loudly), `load` returns `bool` so callers
/// can cheaply probe availability.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// No persisted artifact was loaded and nothing was trained in-process.
    #[error("no trained cleanliness model is available")]
    ModelUnavailable,
    /// The fitted model produced an unusable value at inference time.
    #[error("model inference failed: {0}")]
    Prediction(String),
}
