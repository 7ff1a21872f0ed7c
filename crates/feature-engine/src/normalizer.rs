//! Z-Score Normalization Statistics
//!
//! Fitted once over the full training corpus and frozen afterwards. The same
//! rows used for fitting are normalized with the result (in-sample fit).

use crate::error::FeatureError;
use frame_loader::{sensors, SensorReading};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Synthesized std for historyless inference: 5% of the baseline mean magnitude
pub const SYNTHETIC_STD_RATIO: f64 = 0.05;

/// Fitted `(mean, std)` for one sensor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorNormalization {
    pub mean: f64,
    pub std: f64,
}

impl SensorNormalization {
    /// Build with the std floor applied: zero, negative or non-finite std becomes 1.0
    pub fn new(mean: f64, std: f64) -> Self {
        let std = if std.is_finite() && std > 0.0 { std } else { 1.0 };
        Self { mean, std }
    }

    /// `(x - mean) / std`
    pub fn normalize(&self, value: f64) -> f64 {
        (value - self.mean) / self.std
    }

    /// `z * std + mean`
    pub fn denormalize(&self, z: f64) -> f64 {
        z * self.std + self.mean
    }
}

/// Frozen per-sensor normalization parameters keyed by sensor column name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizationStats {
    sensors: BTreeMap<String, SensorNormalization>,
}

impl NormalizationStats {
    /// Fit mean and sample std (n-1) per sensor over every reading
    ///
    /// A sensor with fewer than two observations or zero spread gets std 1.0.
    pub fn fit(readings: &[SensorReading], sensor_indices: &[usize]) -> Self {
        let mut stats = BTreeMap::new();
        for &index in sensor_indices {
            if sensors::is_constant(index) {
                continue;
            }
            let values: Vec<f64> = readings.iter().filter_map(|r| r.sensor(index)).collect();
            let n = values.len() as f64;
            let (mean, std) = if values.is_empty() {
                (0.0, 1.0)
            } else {
                let mean = values.iter().sum::<f64>() / n;
                let std = if values.len() >= 2 {
                    let m2: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
                    (m2 / (n - 1.0)).sqrt()
                } else {
                    0.0
                };
                (mean, std)
            };
            let fitted = SensorNormalization::new(mean, std);
            debug!(
                "Fitted s_{}: mean={:.4} std={:.4}",
                index, fitted.mean, fitted.std
            );
            stats.insert(sensors::sensor_name(index), fitted);
        }

        info!(
            "Fitted normalization for {} sensors over {} readings",
            stats.len(),
            readings.len()
        );
        Self { sensors: stats }
    }

    /// Synthesize stats from baseline means: std = 5% of |mean|, or 1.0 for a zero mean
    ///
    /// Used where true historical variance is unavailable (single requests).
    pub fn from_baseline_means<'a>(means: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        let sensors = means
            .into_iter()
            .filter(|(name, _)| sensors::parse_sensor_name(name).is_some())
            .map(|(name, mean)| {
                let std = if mean != 0.0 {
                    mean.abs() * SYNTHETIC_STD_RATIO
                } else {
                    1.0
                };
                (name.to_string(), SensorNormalization::new(mean, std))
            })
            .collect();
        Self { sensors }
    }

    /// Parameters for a sensor, if fitted
    pub fn get(&self, index: usize) -> Option<SensorNormalization> {
        self.sensors.get(&sensors::sensor_name(index)).copied()
    }

    /// Insert or replace a sensor's parameters
    pub fn insert(&mut self, index: usize, stats: SensorNormalization) {
        self.sensors.insert(sensors::sensor_name(index), stats);
    }

    /// Normalize a value; `None` if the sensor has no parameters
    pub fn normalize(&self, index: usize, value: f64) -> Option<f64> {
        self.get(index).map(|s| s.normalize(value))
    }

    /// Number of sensors with parameters
    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    /// Whether no sensor has parameters
    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    /// Iterate `(sensor name, parameters)` in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SensorNormalization)> {
        self.sensors.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Load persisted stats; any failure is a configuration error
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FeatureError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| FeatureError::configuration(path, e))?;
        let raw: BTreeMap<String, SensorNormalization> =
            serde_json::from_str(&text).map_err(|e| FeatureError::configuration(path, e))?;

        let mut stats = Self::default();
        for (name, entry) in raw {
            if sensors::parse_sensor_name(&name).is_none() {
                return Err(FeatureError::configuration(
                    path,
                    format!("unknown sensor {name:?}"),
                ));
            }
            if !entry.mean.is_finite() {
                return Err(FeatureError::configuration(
                    path,
                    format!("non-finite mean for {name}"),
                ));
            }
            stats
                .sensors
                .insert(name, SensorNormalization::new(entry.mean, entry.std));
        }
        if stats.is_empty() {
            return Err(FeatureError::configuration(path, "no sensors defined"));
        }

        info!("Loaded normalization for {} sensors from {}", stats.len(), path.display());
        Ok(stats)
    }

    /// Persist as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), FeatureError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).map_err(|e| FeatureError::Io {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        std::fs::write(path, json).map_err(|source| FeatureError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
