//! Load Error Types

use std::path::PathBuf;
use thiserror::Error;

/// Errors while loading or reading raw sensor data
#[derive(Debug, Error)]
pub enum LoadError {
    /// Malformed line in a raw sensor log
    #[error("Data format error at line {line}: {reason}")]
    DataFormat { line: usize, reason: String },

    /// Raw sensor log could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Required field absent from an inference request
    #[error("Missing required field: {0}")]
    MissingField(String),
}

impl LoadError {
    pub(crate) fn format(line: usize, reason: impl Into<String>) -> Self {
        LoadError::DataFormat {
            line,
            reason: reason.into(),
        }
    }
}
