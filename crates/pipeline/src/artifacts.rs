//! Training-Time Artifacts

use crate::error::PipelineError;
use crate::settings::PipelineConfig;
use drift_monitor::BaselineStats;
use feature_engine::{FeatureEngineer, FeatureSchema, NormalizationStats};
use frame_loader::{FeatureSnapshot, SensorReading};
use tracing::info;

/// Everything inference needs from a training run
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingArtifacts {
    /// Ordered feature-name contract
    pub schema: FeatureSchema,
    /// Normalization fitted over the training corpus
    pub normalization: NormalizationStats,
    /// Per-feature training means for drift monitoring
    pub baseline: BaselineStats,
}

impl TrainingArtifacts {
    /// Fit all artifacts over the entire corpus, not a unit split of it
    pub fn fit(engineer: &FeatureEngineer, corpus: &[SensorReading]) -> Result<Self, PipelineError> {
        let schema = FeatureSchema::for_key_sensors(engineer.key_sensors())?;
        let normalization = engineer.fit_normalization(corpus);
        let snapshots: Vec<FeatureSnapshot> = corpus.iter().map(SensorReading::snapshot).collect();
        let baseline = BaselineStats::from_snapshots(&snapshots);

        Ok(Self {
            schema,
            normalization,
            baseline,
        })
    }

    /// Write the feature list, normalization and baseline files
    pub fn save(&self, config: &PipelineConfig) -> Result<(), PipelineError> {
        std::fs::create_dir_all(&config.artifacts_dir).map_err(|source| PipelineError::Io {
            path: config.artifacts_dir.clone(),
            source,
        })?;

        self.schema.save(config.feature_list_path())?;
        self.normalization.save(config.normalization_path())?;
        self.baseline.save(config.baseline_path())?;

        info!(
            "Wrote {} feature names, {} normalization entries and {} baselines to {}",
            self.schema.len(),
            self.normalization.len(),
            self.baseline.len(),
            config.artifacts_dir.display()
        );
        Ok(())
    }

    /// Read artifacts written by `save`
    pub fn load(config: &PipelineConfig) -> Result<Self, PipelineError> {
        Ok(Self {
            schema: FeatureSchema::load(config.feature_list_path())?,
            normalization: NormalizationStats::load(config.normalization_path())?,
            baseline: BaselineStats::load(config.baseline_path())?,
        })
    }
}
