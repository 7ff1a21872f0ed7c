//! RUL Inference Engine
//!
//! Adapts single historyless readings into the training feature space, runs
//! them through a regressor, bands the clamped RUL into a health status and
//! feeds every served request into the drift monitor.

mod adapter;
mod batcher;
mod evaluation;
mod health;
mod predictor;
mod regressor;

pub use adapter::InferenceAdapter;
pub use batcher::{BatcherHandle, InferenceBatcher};
pub use evaluation::{evaluate, Evaluation};
pub use health::{clamp_rul, Confidence, HealthStatus, CRITICAL_BELOW, WARNING_BELOW};
pub use predictor::{Predictor, RulPrediction};
pub use regressor::{ConstantRegressor, LinearRegressor, Regressor};

use drift_monitor::DriftError;
use feature_engine::FeatureError;
use frame_loader::LoadError;
use thiserror::Error;

/// Errors during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Missing or malformed request field
    #[error(transparent)]
    Input(#[from] LoadError),

    /// Feature schema, statistics or assembly failure
    #[error(transparent)]
    Feature(#[from] FeatureError),

    /// Drift baseline failure
    #[error(transparent)]
    Drift(#[from] DriftError),

    /// Regressor failed or returned a non-finite value
    #[error("Regressor failed: {0}")]
    Regressor(String),

    /// Feature vector length differs from what the regressor expects
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: usize, actual: usize },

    /// Batcher task stopped before replying
    #[error("Inference batcher closed")]
    BatcherClosed,
}

impl InferenceError {
    /// Whether the request itself was at fault
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            InferenceError::Input(_) | InferenceError::Feature(FeatureError::Input(_))
        )
    }
}
