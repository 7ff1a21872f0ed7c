//! Training-Set Baselines

use crate::DriftError;
use frame_loader::FeatureSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// FD001 training-set means for the 18 raw drift features
const FD001_MEANS: [(&str, f64); 18] = [
    ("setting_1", -0.0001),
    ("setting_2", 0.0002),
    ("setting_3", 100.0),
    ("s_2", 642.6),
    ("s_3", 1591.4),
    ("s_4", 1407.1),
    ("s_6", 21.6),
    ("s_7", 554.9),
    ("s_8", 2388.1),
    ("s_9", 9059.3),
    ("s_11", 47.5),
    ("s_12", 522.3),
    ("s_13", 2388.1),
    ("s_14", 8140.5),
    ("s_15", 8.44),
    ("s_17", 391.0),
    ("s_20", 39.1),
    ("s_21", 23.42),
];

/// Immutable per-feature reference means for drift comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BaselineStats {
    means: BTreeMap<String, f64>,
}

impl BaselineStats {
    /// Build from explicit `(feature, mean)` pairs
    pub fn new<I, S>(means: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            means: means.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Built-in FD001 training-set constants
    pub fn fd001() -> Self {
        Self::new(FD001_MEANS)
    }

    /// Mean of every feature over training-time raw snapshots
    pub fn from_snapshots<'a>(snapshots: impl IntoIterator<Item = &'a FeatureSnapshot>) -> Self {
        let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
        for snapshot in snapshots {
            for (name, value) in snapshot {
                let entry = sums.entry(name.clone()).or_insert((0.0, 0));
                entry.0 += value;
                entry.1 += 1;
            }
        }
        Self {
            means: sums
                .into_iter()
                .map(|(name, (sum, n))| (name, sum / n as f64))
                .collect(),
        }
    }

    /// Baseline mean for a feature
    pub fn get(&self, feature: &str) -> Option<f64> {
        self.means.get(feature).copied()
    }

    /// `(feature, mean)` pairs in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.means.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of baselined features
    pub fn len(&self) -> usize {
        self.means.len()
    }

    /// Whether no features are baselined
    pub fn is_empty(&self) -> bool {
        self.means.is_empty()
    }

    /// Load persisted baselines; failures are configuration errors
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DriftError> {
        let path = path.as_ref();
        let configuration = |reason: String| DriftError::Configuration {
            path: path.to_path_buf(),
            reason,
        };

        let text = std::fs::read_to_string(path).map_err(|e| configuration(e.to_string()))?;
        let stats: Self = serde_json::from_str(&text).map_err(|e| configuration(e.to_string()))?;
        if stats.is_empty() {
            return Err(configuration("no baseline features defined".to_string()));
        }
        if let Some((name, _)) = stats.iter().find(|(_, v)| !v.is_finite()) {
            return Err(configuration(format!("non-finite baseline for {name}")));
        }

        info!("Loaded {} drift baselines from {}", stats.len(), path.display());
        Ok(stats)
    }

    /// Persist as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DriftError> {
        let path = path.as_ref();
        let io = |source: std::io::Error| DriftError::Io {
            path: path.to_path_buf(),
            source,
        };
        let json = serde_json::to_string_pretty(self).map_err(|e| io(e.into()))?;
        std::fs::write(path, json).map_err(io)
    }
}

impl Default for BaselineStats {
    fn default() -> Self {
        Self::fd001()
    }
}
