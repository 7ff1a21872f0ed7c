//! Training Run
//!
//! Load the corpus, label it, fit normalization and drift baselines over the
//! whole corpus, then split by unit to score a mean-RUL baseline on the
//! held-out units. The split only decides targets and evaluation rows.

use crate::artifacts::TrainingArtifacts;
use crate::error::PipelineError;
use crate::settings::PipelineConfig;
use feature_engine::FeatureEngineer;
use frame_loader::{FrameLoader, SensorReading};
use inference_engine::{evaluate, ConstantRegressor, Evaluation, Regressor};
use rul_labeler::{RulLabeler, UnitSplit};
use serde::Serialize;
use std::collections::HashSet;
use tracing::info;

/// Outcome of a training run
#[derive(Debug, Clone, Serialize)]
pub struct TrainingSummary {
    pub rows: usize,
    pub units: usize,
    pub train_units: usize,
    pub test_units: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub features: usize,
    pub max_rul: u32,
    /// Mean-RUL predictor scored on the held-out units
    pub baseline_evaluation: Evaluation,
}

/// Load, train and persist artifacts as configured
pub fn run_training(
    config: &PipelineConfig,
) -> Result<(TrainingArtifacts, TrainingSummary), PipelineError> {
    let readings = FrameLoader::new().load_path(&config.data_path)?;
    let (artifacts, summary) = train(config, &readings)?;
    artifacts.save(config)?;
    Ok((artifacts, summary))
}

/// Train over already loaded readings without touching the filesystem
pub fn train(
    config: &PipelineConfig,
    readings: &[SensorReading],
) -> Result<(TrainingArtifacts, TrainingSummary), PipelineError> {
    let labels = RulLabeler::new(config.rul_cap).label(readings);
    let split = UnitSplit::new(config.train_unit_cutoff);

    let (train, test) = split.split(readings, |r| r.unit_id);
    let (train_labels, test_labels) = split.split(&labels, |l| l.unit_id);
    if train.is_empty() {
        return Err(PipelineError::EmptySplit {
            cutoff: split.cutoff(),
            side: "training",
        });
    }
    if test.is_empty() {
        return Err(PipelineError::EmptySplit {
            cutoff: split.cutoff(),
            side: "test",
        });
    }

    let engineer = FeatureEngineer::new(config.engine());
    let artifacts = TrainingArtifacts::fit(&engineer, readings)?;
    let train_rows = engineer.transform(&train, &artifacts.normalization, &artifacts.schema)?;
    let test_rows = engineer.transform(&test, &artifacts.normalization, &artifacts.schema)?;

    let targets: Vec<f64> = train_labels.iter().map(|l| l.rul_clipped as f64).collect();
    let model = ConstantRegressor::fit_mean(&targets);
    let predictions = test_rows
        .iter()
        .map(|row| model.predict(row.features.values()))
        .collect::<Result<Vec<_>, _>>()?;
    let truth: Vec<f64> = test_labels.iter().map(|l| l.rul_clipped as f64).collect();
    let baseline_evaluation = evaluate(&truth, &predictions)?;

    let units = |rs: &[SensorReading]| rs.iter().map(|r| r.unit_id).collect::<HashSet<_>>().len();
    let summary = TrainingSummary {
        rows: readings.len(),
        units: units(readings),
        train_units: units(&train),
        test_units: units(&test),
        train_rows: train_rows.len(),
        test_rows: test_rows.len(),
        features: artifacts.schema.len(),
        max_rul: labels.iter().map(|l| l.rul).max().unwrap_or(0),
        baseline_evaluation,
    };

    info!(
        "Trained on {} units ({} rows), held out {} units; mean-RUL baseline RMSE {:.2}",
        summary.train_units, summary.train_rows, summary.test_units, baseline_evaluation.rmse
    );
    Ok((artifacts, summary))
}
