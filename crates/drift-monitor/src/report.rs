//! Drift Report Types

use serde::Serialize;
use std::collections::BTreeMap;

/// A feature whose recent mean left the tolerance band
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriftedFeature {
    pub feature: String,
    pub deviation_pct: f64,
}

/// Baseline vs recent comparison for one feature
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureStatistics {
    pub baseline: f64,
    pub recent: f64,
    pub deviation_pct: f64,
}

/// Point-in-time drift assessment over the monitoring window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriftReport {
    pub drift_detected: bool,
    pub status: String,
    pub max_deviation_pct: f64,
    pub threshold_pct: f64,
    pub drifted_features: Vec<DriftedFeature>,
    pub feature_statistics: BTreeMap<String, FeatureStatistics>,
    pub recent_requests: usize,
}

impl DriftReport {
    /// Report for an empty window
    pub(crate) fn no_data(threshold_pct: f64) -> Self {
        Self {
            drift_detected: false,
            status: "No data available for monitoring".to_string(),
            max_deviation_pct: 0.0,
            threshold_pct,
            drifted_features: Vec::new(),
            feature_statistics: BTreeMap::new(),
            recent_requests: 0,
        }
    }

    /// Status line for a populated window
    pub(crate) fn status_for(drifted: usize) -> String {
        if drifted == 0 {
            "No significant drift detected".to_string()
        } else {
            format!("Data Drift Warning - {drifted} feature(s) exceed threshold")
        }
    }

    /// Whether a specific feature is flagged
    pub fn is_drifted(&self, feature: &str) -> bool {
        self.drifted_features.iter().any(|d| d.feature == feature)
    }
}

/// Round half away from zero to `places` decimals
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
