//! Trailing Window Statistics

use serde::{Deserialize, Serialize};

/// Rolling window length in cycles (inclusive of the current cycle)
pub const DEFAULT_ROLLING_WINDOW: usize = 5;

/// Trailing mean and standard deviation at one cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RollingStats {
    /// Mean of the window
    pub mean: f64,
    /// Sample standard deviation of the window (n-1); 0.0 for a single sample
    pub std: f64,
}

impl RollingStats {
    /// Compute statistics over a window of values
    pub fn compute(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;

        let std = if values.len() >= 2 {
            let m2: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
            (m2 / (n - 1.0)).sqrt()
        } else {
            0.0
        };

        Self { mean, std }
    }

    /// Degenerate single-sample window: the value itself, no spread
    pub fn single(value: f64) -> Self {
        Self {
            mean: value,
            std: 0.0,
        }
    }
}

/// Causal rolling statistics over one unit's cycle-ordered series
///
/// Entry `i` covers `values[i + 1 - window ..= i]`, shrinking to whatever
/// history exists at the start of the series. Never looks ahead.
pub fn rolling_stats(values: &[f64], window: usize) -> Vec<RollingStats> {
    let window = window.max(1);
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            RollingStats::compute(&values[start..=i])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_mean_computation() {
        let stats = RollingStats::compute(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!((stats.mean - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_sample_std() {
        // Sample std of [2, 4, 4, 4, 5, 5, 7, 9] is sqrt(32 / 7)
        let stats = RollingStats::compute(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((stats.std - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_single_sample_has_zero_std() {
        let stats = RollingStats::compute(&[641.82]);
        assert_eq!(stats, RollingStats::single(641.82));
    }

    #[test]
    fn test_empty_values() {
        assert_eq!(RollingStats::compute(&[]), RollingStats::default());
    }

    #[test]
    fn test_window_grows_then_slides() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let stats = rolling_stats(&values, 5);

        assert_eq!(stats.len(), 7);
        assert_eq!(stats[0].mean, 1.0);
        assert_eq!(stats[0].std, 0.0);
        assert!((stats[1].mean - 1.5).abs() < 1e-12);
        assert!((stats[4].mean - 3.0).abs() < 1e-12);
        // [3..7]
        assert!((stats[6].mean - 5.0).abs() < 1e-12);
        assert!((stats[6].std - 2.5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_zero_window_treated_as_one() {
        let stats = rolling_stats(&[1.0, 9.0], 0);
        assert_eq!(stats[1], RollingStats::single(9.0));
    }

    proptest! {
        #[test]
        fn no_look_ahead(
            values in proptest::collection::vec(-1000.0f64..1000.0, 2..60),
            replacement in -1000.0f64..1000.0,
            window in 1usize..8,
            cut in 0usize..59,
        ) {
            let cut = cut % (values.len() - 1);
            let before = rolling_stats(&values, window);

            let mut modified = values.clone();
            for v in modified.iter_mut().skip(cut + 1) {
                *v = replacement;
            }
            let after = rolling_stats(&modified, window);

            for c in 0..=cut {
                prop_assert_eq!(before[c], after[c]);
            }
        }

        #[test]
        fn std_is_non_negative(values in proptest::collection::vec(-1e6f64..1e6, 1..40)) {
            for s in rolling_stats(&values, DEFAULT_ROLLING_WINDOW) {
                prop_assert!(s.std >= 0.0);
            }
        }
    }
}
