//! Pipeline Configuration
//!
//! Layered: built-in defaults, then an optional TOML file, then `RUL_`
//! environment variables (`__` separates nested keys, e.g.
//! `RUL_DRIFT__THRESHOLD=0.25`).

use crate::error::PipelineError;
use ::config::{Config, Environment, File, Map};
use drift_monitor::DriftConfig;
use feature_engine::{EngineConfig, DEFAULT_ROLLING_WINDOW};
use rul_labeler::{DEFAULT_TRAIN_CUTOFF, RUL_CAP};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "RUL_CONFIG";

/// Configuration file used when `RUL_CONFIG` is unset
pub const DEFAULT_CONFIG_FILE: &str = "rul_pipeline.toml";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// trace, debug, info, warn or error
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Whitespace-separated FD001 training log
    pub data_path: PathBuf,
    /// Directory receiving the training artifacts
    pub artifacts_dir: PathBuf,
    /// Feature list file name inside `artifacts_dir`
    pub feature_list_file: String,
    /// Normalization statistics file name inside `artifacts_dir`
    pub normalization_file: String,
    /// Drift baseline file name inside `artifacts_dir`
    pub baseline_file: String,
    /// Optional linear model coefficients used for replay
    pub model_file: Option<PathBuf>,
    pub rul_cap: u32,
    pub rolling_window: usize,
    /// Units up to and including this id train, the rest test
    pub train_unit_cutoff: u32,
    pub drift: DriftConfig,
    pub log: LogConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/train_FD001.txt"),
            artifacts_dir: PathBuf::from("artifacts"),
            feature_list_file: "feature_columns.txt".to_string(),
            normalization_file: "normalization_stats.json".to_string(),
            baseline_file: "baseline_stats.json".to_string(),
            model_file: None,
            rul_cap: RUL_CAP,
            rolling_window: DEFAULT_ROLLING_WINDOW,
            train_unit_cutoff: DEFAULT_TRAIN_CUTOFF,
            drift: DriftConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load from `RUL_CONFIG` (or `rul_pipeline.toml`) and the process environment
    pub fn load() -> Result<Self, PipelineError> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(Some(Path::new(&path)), None)
    }

    /// Load from an optional file and an explicit environment
    ///
    /// `env` replaces the process environment when given. A missing file is
    /// not an error; a malformed one is.
    pub fn load_from(
        file: Option<&Path>,
        env: Option<Map<String, String>>,
    ) -> Result<Self, PipelineError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);
        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(false));
        }
        builder = builder.add_source(
            Environment::with_prefix("RUL")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Feature engineer settings
    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            rolling_window: self.rolling_window,
            ..EngineConfig::default()
        }
    }

    pub fn feature_list_path(&self) -> PathBuf {
        self.artifacts_dir.join(&self.feature_list_file)
    }

    pub fn normalization_path(&self) -> PathBuf {
        self.artifacts_dir.join(&self.normalization_file)
    }

    pub fn baseline_path(&self) -> PathBuf {
        self.artifacts_dir.join(&self.baseline_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Map<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::load_from(None, Some(Map::new())).unwrap();
        assert_eq!(config.rul_cap, 125);
        assert_eq!(config.rolling_window, 5);
        assert_eq!(config.train_unit_cutoff, 80);
        assert_eq!(config.drift.window_capacity, 100);
        assert_eq!(config.drift.threshold, 0.20);
        assert_eq!(config.log, LogConfig::default());
        assert_eq!(
            config.feature_list_path(),
            PathBuf::from("artifacts/feature_columns.txt")
        );
    }

    #[test]
    fn test_file_then_env_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rul_pipeline.toml");
        std::fs::write(
            &path,
            "rolling_window = 7\ntrain_unit_cutoff = 60\n\n[drift]\nthreshold = 0.3\n\n[log]\njson = true\n",
        )
        .unwrap();

        let config = PipelineConfig::load_from(
            Some(&path),
            Some(env(&[("RUL_TRAIN_UNIT_CUTOFF", "70"), ("RUL_DRIFT__WINDOW_CAPACITY", "50")])),
        )
        .unwrap();

        assert_eq!(config.rolling_window, 7);
        assert_eq!(config.train_unit_cutoff, 70);
        assert_eq!(config.drift.threshold, 0.3);
        assert_eq!(config.drift.window_capacity, 50);
        assert!(config.log.json);
        assert_eq!(config.engine().rolling_window, 7);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            PipelineConfig::load_from(Some(&dir.path().join("absent.toml")), Some(Map::new()))
                .unwrap();
        assert_eq!(config.rul_cap, 125);
    }

    #[test]
    fn test_malformed_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rul_pipeline.toml");
        std::fs::write(&path, "rolling_window = [").unwrap();
        assert!(matches!(
            PipelineConfig::load_from(Some(&path), Some(Map::new())),
            Err(PipelineError::Config(_))
        ));
    }
}
