//! Drift Monitoring
//!
//! Keeps the most recent inference inputs in a bounded window and compares
//! their per-feature means with training-set baselines.

mod baseline;
mod monitor;
mod report;

pub use baseline::BaselineStats;
pub use monitor::{DriftConfig, DriftEntry, DriftMonitor, DriftWindow, DEFAULT_DRIFT_THRESHOLD};
pub use report::{DriftReport, DriftedFeature, FeatureStatistics};

use std::path::PathBuf;
use thiserror::Error;

/// Errors loading or persisting drift baselines
#[derive(Debug, Error)]
pub enum DriftError {
    /// Baseline file missing or corrupt
    #[error("Configuration error in {}: {reason}", path.display())]
    Configuration { path: PathBuf, reason: String },

    /// Baseline file could not be written
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
