//! Sliding-Window Drift Monitor
//!
//! Every successful prediction records its raw input snapshot. A report
//! compares the mean of each baselined feature across the window with its
//! training-set mean and flags relative deviations above the threshold.

use crate::baseline::BaselineStats;
use crate::report::{round_to, DriftReport, DriftedFeature, FeatureStatistics};
use chrono::{DateTime, Utc};
use frame_loader::FeatureSnapshot;
use ring_buffer::{RingBuffer, DEFAULT_CAPACITY};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Relative deviation above which a feature counts as drifted
pub const DEFAULT_DRIFT_THRESHOLD: f64 = 0.20;

/// One monitored inference request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftEntry {
    pub timestamp: DateTime<Utc>,
    pub features: FeatureSnapshot,
    pub predicted_rul: f64,
}

/// Bounded FIFO of monitored requests
pub type DriftWindow = RingBuffer<DriftEntry>;

/// Drift monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    /// Number of most recent requests kept
    pub window_capacity: usize,
    /// Relative deviation threshold (0.20 = 20%)
    pub threshold: f64,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            window_capacity: DEFAULT_CAPACITY,
            threshold: DEFAULT_DRIFT_THRESHOLD,
        }
    }
}

/// Shared drift monitor
///
/// `record` and `report` take `&self`; wrap in an `Arc` to share between
/// request handlers.
pub struct DriftMonitor {
    window: DriftWindow,
    baseline: BaselineStats,
    threshold: f64,
}

impl DriftMonitor {
    /// Create a monitor over the given baselines
    pub fn new(baseline: BaselineStats, config: DriftConfig) -> Self {
        let threshold = if config.threshold.is_finite() && config.threshold > 0.0 {
            config.threshold
        } else {
            warn!(
                "Invalid drift threshold {}, using {}",
                config.threshold, DEFAULT_DRIFT_THRESHOLD
            );
            DEFAULT_DRIFT_THRESHOLD
        };
        info!(
            "Drift monitor tracking {} features, window {}, threshold {:.0}%",
            baseline.len(),
            config.window_capacity,
            threshold * 100.0
        );
        Self {
            window: DriftWindow::new(config.window_capacity),
            baseline,
            threshold,
        }
    }

    /// FD001 baselines with default window and threshold
    pub fn fd001() -> Self {
        Self::new(BaselineStats::fd001(), DriftConfig::default())
    }

    /// Baselines in use
    pub fn baseline(&self) -> &BaselineStats {
        &self.baseline
    }

    /// Drift threshold as a fraction
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Window capacity
    pub fn capacity(&self) -> usize {
        self.window.capacity()
    }

    /// Entries currently in the window
    pub fn len(&self) -> usize {
        self.window.len()
    }

    /// Whether the window is empty
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Record a successful prediction's input, evicting the oldest when full
    pub fn record(&self, features: FeatureSnapshot, predicted_rul: f64) {
        self.push(DriftEntry {
            timestamp: Utc::now(),
            features,
            predicted_rul,
        });
    }

    /// Record a pre-built entry
    pub fn push(&self, entry: DriftEntry) {
        if self.window.push(entry).is_some() {
            debug!("Drift window full, evicted oldest entry");
        }
        metrics::gauge!("drift_window_entries").set(self.window.len() as f64);
    }

    /// Window contents, oldest first
    pub fn entries(&self) -> Vec<DriftEntry> {
        self.window.snapshot()
    }

    /// Empty the window
    pub fn reset(&self) {
        self.window.clear();
        metrics::gauge!("drift_window_entries").set(0.0);
        info!("Drift window reset");
    }

    /// Compare the current window against the baselines
    pub fn report(&self) -> DriftReport {
        let threshold_pct = round_to(self.threshold * 100.0, 2);

        // Sum under one lock so the report reflects a single window state
        let (count, sums) = self.window.with_entries(|entries| {
            let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
            for entry in entries {
                for (name, _) in self.baseline.iter() {
                    if let Some(value) = entry.features.get(name) {
                        let slot = sums.entry(name).or_insert((0.0, 0));
                        slot.0 += value;
                        slot.1 += 1;
                    }
                }
            }
            (entries.len(), sums)
        });

        if count == 0 {
            return DriftReport::no_data(threshold_pct);
        }

        let mut max_deviation = 0.0_f64;
        let mut drifted_features = Vec::new();
        let mut feature_statistics = BTreeMap::new();

        for (name, (sum, n)) in sums {
            let Some(baseline) = self.baseline.get(name) else {
                continue;
            };
            let recent = sum / n as f64;
            let deviation = relative_deviation(recent, baseline);

            max_deviation = max_deviation.max(deviation);
            if deviation > self.threshold {
                drifted_features.push(DriftedFeature {
                    feature: name.to_string(),
                    deviation_pct: round_to(deviation * 100.0, 2),
                });
            }
            feature_statistics.insert(
                name.to_string(),
                FeatureStatistics {
                    baseline: round_to(baseline, 4),
                    recent: round_to(recent, 4),
                    deviation_pct: round_to(deviation * 100.0, 2),
                },
            );
        }

        let drift_detected = max_deviation > self.threshold;
        let max_deviation_pct = round_to(max_deviation * 100.0, 2);
        metrics::gauge!("drift_max_deviation_pct").set(max_deviation_pct);

        if drift_detected {
            warn!(
                "Drift detected: {} feature(s) above {}%, max {}%",
                drifted_features.len(),
                threshold_pct,
                max_deviation_pct
            );
        }

        DriftReport {
            drift_detected,
            status: DriftReport::status_for(drifted_features.len()),
            max_deviation_pct,
            threshold_pct,
            drifted_features,
            feature_statistics,
            recent_requests: count,
        }
    }
}

impl std::fmt::Debug for DriftMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriftMonitor")
            .field("entries", &self.window.len())
            .field("capacity", &self.window.capacity())
            .field("features", &self.baseline.len())
            .field("threshold", &self.threshold)
            .finish()
    }
}

/// `|recent - baseline| / |baseline|`, or the absolute difference for a zero baseline
fn relative_deviation(recent: f64, baseline: f64) -> f64 {
    let diff = (recent - baseline).abs();
    if baseline == 0.0 {
        diff
    } else {
        diff / baseline.abs()
    }
}
