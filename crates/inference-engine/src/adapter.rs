//! Inference Adapter
//!
//! Maps one raw reading, with no unit history, onto the persisted feature
//! layout. Rolling mean collapses to the raw value and rolling std to 0.0.
//! Normalization uses frozen statistics, typically synthesized from the
//! drift baselines as mean with a 5%-of-magnitude std.

use crate::InferenceError;
use drift_monitor::BaselineStats;
use feature_engine::{EngineConfig, FeatureEngineer, FeatureSchema, FeatureVector, NormalizationStats};
use frame_loader::RawReading;
use std::path::Path;
use tracing::info;

/// Single-reading feature adapter with frozen schema and statistics
#[derive(Debug, Clone)]
pub struct InferenceAdapter {
    engineer: FeatureEngineer,
    schema: FeatureSchema,
    normalization: NormalizationStats,
}

impl InferenceAdapter {
    /// Adapter over an explicit schema and normalization table
    pub fn new(schema: FeatureSchema, normalization: NormalizationStats) -> Self {
        Self {
            engineer: FeatureEngineer::new(EngineConfig::default()),
            schema,
            normalization,
        }
    }

    /// Normalize with statistics synthesized from drift baselines
    pub fn from_baseline(schema: FeatureSchema, baseline: &BaselineStats) -> Self {
        Self::new(schema, NormalizationStats::from_baseline_means(baseline.iter()))
    }

    /// Load the persisted feature list and normalization statistics
    pub fn load(
        feature_list: impl AsRef<Path>,
        normalization: impl AsRef<Path>,
    ) -> Result<Self, InferenceError> {
        let schema = FeatureSchema::load(feature_list)?;
        let normalization = NormalizationStats::load(normalization)?;
        info!(
            "Inference adapter ready: {} features, {} normalized sensors",
            schema.len(),
            normalization.len()
        );
        Ok(Self::new(schema, normalization))
    }

    /// Feature layout produced by `adapt`
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Frozen normalization statistics
    pub fn normalization(&self) -> &NormalizationStats {
        &self.normalization
    }

    /// Build the feature vector for one reading in the adapter's layout
    pub fn adapt(&self, reading: &RawReading) -> Result<FeatureVector, InferenceError> {
        self.adapt_with(reading, &self.schema)
    }

    /// Build the feature vector for one reading in an explicit layout
    pub fn adapt_with(
        &self,
        reading: &RawReading,
        schema: &FeatureSchema,
    ) -> Result<FeatureVector, InferenceError> {
        Ok(self
            .engineer
            .single_reading(reading, &self.normalization, schema)?)
    }
}
