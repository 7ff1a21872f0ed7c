//! Prediction Service

use crate::adapter::InferenceAdapter;
use crate::health::{clamp_rul, Confidence, HealthStatus};
use crate::regressor::Regressor;
use crate::InferenceError;
use chrono::{DateTime, Utc};
use drift_monitor::{BaselineStats, DriftConfig, DriftMonitor, DriftReport};
use feature_engine::FeatureSchema;
use frame_loader::RawReading;
use rul_labeler::RUL_CAP;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Served prediction for one reading
#[derive(Debug, Clone, Serialize)]
pub struct RulPrediction {
    /// RUL after clamping to `[0, rul_cap]`
    pub predicted_rul: f64,
    /// Regressor output before clamping
    pub raw_output: f64,
    pub health_status: HealthStatus,
    pub confidence: Confidence,
    pub timestamp: DateTime<Utc>,
}

/// Adapter, regressor and drift monitor wired together
///
/// Successful predictions record their raw inputs in the drift window; any
/// failure leaves the window untouched.
pub struct Predictor {
    adapter: InferenceAdapter,
    regressor: Arc<dyn Regressor>,
    drift: Arc<DriftMonitor>,
    rul_cap: u32,
}

impl Predictor {
    /// Wire a predictor, checking the regressor against the feature layout
    pub fn new(
        adapter: InferenceAdapter,
        regressor: Arc<dyn Regressor>,
        drift: Arc<DriftMonitor>,
    ) -> Result<Self, InferenceError> {
        if let Some(expected) = regressor.expected_features() {
            let actual = adapter.schema().len();
            if expected != actual {
                return Err(InferenceError::InvalidInputShape { expected, actual });
            }
        }
        Ok(Self {
            adapter,
            regressor,
            drift,
            rul_cap: RUL_CAP,
        })
    }

    /// Clamp predictions to `[0, cap]` instead of `[0, RUL_CAP]`
    ///
    /// Should match the cap the training targets were clipped at.
    pub fn with_rul_cap(mut self, cap: u32) -> Self {
        self.rul_cap = cap;
        self
    }

    pub fn rul_cap(&self) -> u32 {
        self.rul_cap
    }

    /// Load the persisted feature list and baselines
    ///
    /// Normalization is synthesized from the baselines, and the drift
    /// monitor compares against the same baselines.
    pub fn from_artifacts(
        feature_list: impl AsRef<Path>,
        baseline: impl AsRef<Path>,
        drift_config: DriftConfig,
        regressor: Arc<dyn Regressor>,
    ) -> Result<Self, InferenceError> {
        let schema = FeatureSchema::load(feature_list)?;
        let baseline = BaselineStats::load(baseline)?;
        let adapter = InferenceAdapter::from_baseline(schema, &baseline);
        let drift = Arc::new(DriftMonitor::new(baseline, drift_config));
        info!("Predictor ready with {} features", adapter.schema().len());
        Self::new(adapter, regressor, drift)
    }

    /// Shared drift monitor
    pub fn drift(&self) -> &Arc<DriftMonitor> {
        &self.drift
    }

    pub fn adapter(&self) -> &InferenceAdapter {
        &self.adapter
    }

    /// Current drift report
    pub fn drift_report(&self) -> DriftReport {
        self.drift.report()
    }

    /// Predict RUL for one historyless reading
    pub fn predict(&self, reading: &RawReading) -> Result<RulPrediction, InferenceError> {
        match self.try_predict(reading) {
            Ok(prediction) => {
                metrics::counter!("rul_predictions_total").increment(1);
                Ok(prediction)
            }
            Err(e) => {
                metrics::counter!("rul_prediction_failures_total").increment(1);
                warn!("Prediction failed: {}", e);
                Err(e)
            }
        }
    }

    /// Predict a sequence of readings independently
    pub fn predict_batch(&self, readings: &[RawReading]) -> Vec<Result<RulPrediction, InferenceError>> {
        readings.iter().map(|r| self.predict(r)).collect()
    }

    fn try_predict(&self, reading: &RawReading) -> Result<RulPrediction, InferenceError> {
        let snapshot = reading.snapshot()?;
        let features = self.adapter.adapt(reading)?;

        let raw_output = self.regressor.predict(features.values())?;
        if !raw_output.is_finite() {
            return Err(InferenceError::Regressor(format!(
                "non-finite output {raw_output}"
            )));
        }

        let predicted_rul = clamp_rul(raw_output, self.rul_cap);
        let health_status = HealthStatus::from_rul(predicted_rul);
        debug!(
            "Predicted RUL {:.1} (raw {:.3}), {}",
            predicted_rul, raw_output, health_status
        );

        self.drift.record(snapshot, predicted_rul);

        Ok(RulPrediction {
            predicted_rul,
            raw_output,
            health_status,
            confidence: health_status.confidence(),
            timestamp: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regressor::{ConstantRegressor, LinearRegressor};

    fn baseline_reading() -> RawReading {
        BaselineStats::fd001()
            .iter()
            .fold(RawReading::new(), |r, (name, mean)| r.with(name, mean))
    }

    fn predictor(regressor: Arc<dyn Regressor>) -> Predictor {
        let adapter =
            InferenceAdapter::from_baseline(FeatureSchema::fd001(), &BaselineStats::fd001());
        Predictor::new(adapter, regressor, Arc::new(DriftMonitor::fd001())).unwrap()
    }

    struct NanRegressor;

    impl Regressor for NanRegressor {
        fn predict(&self, _features: &[f64]) -> Result<f64, InferenceError> {
            Ok(f64::NAN)
        }
    }

    #[test]
    fn test_prediction_is_clamped_and_banded() {
        let predictor = predictor(Arc::new(ConstantRegressor(180.0)));
        let prediction = predictor.predict(&baseline_reading()).unwrap();

        assert_eq!(prediction.predicted_rul, 125.0);
        assert_eq!(prediction.raw_output, 180.0);
        assert_eq!(prediction.health_status, HealthStatus::Healthy);
        assert_eq!(prediction.confidence, Confidence::High);
        assert_eq!(predictor.drift().len(), 1);

        let predictor = self::predictor(Arc::new(ConstantRegressor(-4.0)));
        let prediction = predictor.predict(&baseline_reading()).unwrap();
        assert_eq!(prediction.predicted_rul, 0.0);
        assert_eq!(prediction.health_status, HealthStatus::Critical);
    }

    #[test]
    fn test_configured_cap_clamps() {
        let predictor = predictor(Arc::new(ConstantRegressor(180.0))).with_rul_cap(100);
        let prediction = predictor.predict(&baseline_reading()).unwrap();

        assert_eq!(predictor.rul_cap(), 100);
        assert_eq!(prediction.predicted_rul, 100.0);
        assert_eq!(prediction.raw_output, 180.0);
        assert_eq!(prediction.health_status, HealthStatus::Healthy);
    }

    #[test]
    fn test_missing_field_leaves_window_untouched() {
        let predictor = predictor(Arc::new(ConstantRegressor(50.0)));
        let mut reading = baseline_reading();
        reading.remove("s_6");

        let err = predictor.predict(&reading).unwrap_err();
        assert!(err.is_client_error());
        assert!(predictor.drift().is_empty());
    }

    #[test]
    fn test_regressor_failure_leaves_window_untouched() {
        let predictor = predictor(Arc::new(NanRegressor));
        assert!(matches!(
            predictor.predict(&baseline_reading()),
            Err(InferenceError::Regressor(_))
        ));
        assert!(predictor.drift().is_empty());
    }

    #[test]
    fn test_regressor_shape_checked_at_startup() {
        let adapter =
            InferenceAdapter::from_baseline(FeatureSchema::fd001(), &BaselineStats::fd001());
        let result = Predictor::new(
            adapter,
            Arc::new(LinearRegressor::new(0.0, vec![1.0; 44])),
            Arc::new(DriftMonitor::fd001()),
        );
        assert!(matches!(
            result,
            Err(InferenceError::InvalidInputShape { expected: 44, actual: 45 })
        ));
    }

    #[test]
    fn test_batch_results_are_independent() {
        let predictor = predictor(Arc::new(ConstantRegressor(60.0)));
        let mut bad = baseline_reading();
        bad.remove("setting_2");

        let results = predictor.predict_batch(&[baseline_reading(), bad, baseline_reading()]);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert_eq!(
            results[2].as_ref().unwrap().health_status,
            HealthStatus::Warning
        );
        assert_eq!(predictor.drift().len(), 2);
    }
}
