//! Logging Setup

use crate::error::PipelineError;
use crate::settings::LogConfig;
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Initialize the global tracing subscriber
///
/// Unrecognized levels fall back to INFO.
pub fn init_logging(config: &LogConfig) -> Result<(), PipelineError> {
    let level = Level::from_str(&config.level).unwrap_or(Level::INFO);

    let result = if config.json {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(true)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    };

    result.map_err(|e| PipelineError::Logging(e.to_string()))
}
