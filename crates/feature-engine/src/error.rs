//! Feature Engineering Error Types

use frame_loader::LoadError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors during feature engineering or artifact loading
#[derive(Debug, Error)]
pub enum FeatureError {
    /// Persisted feature list or statistics missing or corrupt
    #[error("Configuration error in {}: {reason}", path.display())]
    Configuration { path: PathBuf, reason: String },

    /// Feature name that cannot be derived from the key sensor set
    #[error("Unknown or non-derivable feature: {0}")]
    UnknownFeature(String),

    /// Feature name listed more than once
    #[error("Duplicate feature: {0}")]
    DuplicateFeature(String),

    /// Feature list without any entries
    #[error("Feature schema is empty")]
    EmptySchema,

    /// Unit history not in strictly increasing cycle order
    #[error("Unit {unit_id} cycle {cycle} is out of order")]
    CycleOrder { unit_id: u32, cycle: u32 },

    /// Raw input problem (missing request field)
    #[error(transparent)]
    Input(#[from] LoadError),

    /// Artifact could not be written
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FeatureError {
    pub(crate) fn configuration(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        FeatureError::Configuration {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
