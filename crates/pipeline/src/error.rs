//! Pipeline Error Types

use drift_monitor::DriftError;
use feature_engine::FeatureError;
use frame_loader::LoadError;
use inference_engine::InferenceError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while configuring or running the pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error(transparent)]
    Drift(#[from] DriftError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("Failed to prepare {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Training corpus leaves one side of the split empty
    #[error("Unit cutoff {cutoff} leaves no {side} units")]
    EmptySplit { cutoff: u32, side: &'static str },
}
