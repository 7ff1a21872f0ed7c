//! Turbofan RUL Pipeline
//!
//! Configuration, logging and the training run that produces the artifacts
//! consumed at inference time: the ordered feature list, fitted
//! normalization statistics and drift baselines.

mod artifacts;
mod error;
mod logging;
mod settings;
mod training;

pub use artifacts::TrainingArtifacts;
pub use error::PipelineError;
pub use logging::init_logging;
pub use settings::{LogConfig, PipelineConfig, CONFIG_ENV, DEFAULT_CONFIG_FILE};
pub use training::{run_training, train, TrainingSummary};
