//! Train -> persist -> load -> serve

use drift_monitor::{BaselineStats, DriftConfig};
use feature_engine::FeatureEngineer;
use frame_loader::{FrameLoader, RawReading, SensorReading};
use inference_engine::{HealthStatus, LinearRegressor, Predictor};
use pipeline::{run_training, train, PipelineConfig, PipelineError, TrainingArtifacts};
use std::path::Path;
use std::sync::Arc;

/// Units of differing lengths with slow sensor wear and a per-unit offset
fn write_log(path: &Path, lengths: &[u32]) {
    let mut out = String::new();
    for (i, &cycles) in lengths.iter().enumerate() {
        let unit = i + 1;
        for cycle in 1..=cycles {
            let wear = unit as f64 * 5.0 + cycle as f64 * 0.1;
            let mut fields = vec![
                unit.to_string(),
                cycle.to_string(),
                "0.0002".to_string(),
                "-0.0003".to_string(),
                "100.0".to_string(),
            ];
            for s in 1..=21 {
                fields.push(format!("{:.4}", 100.0 + s as f64 * 10.0 + wear));
            }
            out.push_str(&fields.join(" "));
            out.push('\n');
        }
    }
    std::fs::write(path, out).unwrap();
}

fn config(dir: &Path) -> PipelineConfig {
    PipelineConfig {
        data_path: dir.join("train_FD001.txt"),
        artifacts_dir: dir.join("artifacts"),
        train_unit_cutoff: 3,
        ..Default::default()
    }
}

#[test]
fn training_writes_loadable_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    write_log(&config.data_path, &[20, 25, 30, 15, 10]);

    let (artifacts, summary) = run_training(&config).unwrap();

    assert_eq!(summary.rows, 100);
    assert_eq!(summary.units, 5);
    assert_eq!((summary.train_units, summary.test_units), (3, 2));
    assert_eq!((summary.train_rows, summary.test_rows), (75, 25));
    assert_eq!(summary.features, 45);
    assert_eq!(summary.max_rul, 29);
    assert_eq!(summary.baseline_evaluation.samples, 25);

    assert!(config.feature_list_path().exists());
    assert!(config.normalization_path().exists());
    assert!(config.baseline_path().exists());
    assert_eq!(TrainingArtifacts::load(&config).unwrap(), artifacts);

    // 3 settings and 15 non-constant sensors
    assert_eq!(artifacts.baseline.len(), 18);
    assert_eq!(artifacts.normalization.len(), 14);
}

#[test]
fn statistics_are_fitted_on_the_whole_corpus() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    write_log(&config.data_path, &[20, 25, 30, 15, 10]);
    let readings = FrameLoader::new().load_path(&config.data_path).unwrap();

    let (artifacts, _) = train(&config, &readings).unwrap();

    let engineer = FeatureEngineer::new(config.engine());
    assert_eq!(artifacts.normalization, engineer.fit_normalization(&readings));
    let snapshots: Vec<_> = readings.iter().map(SensorReading::snapshot).collect();
    assert_eq!(artifacts.baseline, BaselineStats::from_snapshots(&snapshots));

    // Held-out units shift the fit away from the training split alone
    let train_only: Vec<SensorReading> = readings
        .iter()
        .filter(|r| r.unit_id <= config.train_unit_cutoff)
        .cloned()
        .collect();
    assert_ne!(artifacts.normalization, engineer.fit_normalization(&train_only));
}

#[test]
fn persisted_artifacts_serve_predictions() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    write_log(&config.data_path, &[20, 25, 30, 15]);
    let (artifacts, _) = run_training(&config).unwrap();

    let predictor = Predictor::from_artifacts(
        config.feature_list_path(),
        config.baseline_path(),
        DriftConfig::default(),
        Arc::new(LinearRegressor::new(50.0, vec![0.0; artifacts.schema.len()])),
    )
    .unwrap();

    let readings = FrameLoader::new().load_path(&config.data_path).unwrap();
    let prediction = predictor.predict(&RawReading::from(&readings[0])).unwrap();
    assert_eq!(prediction.predicted_rul, 50.0);
    assert_eq!(prediction.health_status, HealthStatus::Warning);

    let report = predictor.drift_report();
    assert_eq!(report.recent_requests, 1);
    assert!(!report.drift_detected);
}

#[test]
fn cutoff_must_leave_both_sides() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(dir.path());
    write_log(&config.data_path, &[10, 10]);
    let readings = FrameLoader::new().load_path(&config.data_path).unwrap();

    config.train_unit_cutoff = 80;
    assert!(matches!(
        train(&config, &readings),
        Err(PipelineError::EmptySplit { side: "test", .. })
    ));

    config.train_unit_cutoff = 0;
    assert!(matches!(
        train(&config, &readings),
        Err(PipelineError::EmptySplit { side: "training", .. })
    ));
}

#[test]
fn missing_corpus_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        run_training(&config(dir.path())),
        Err(PipelineError::Load(_))
    ));
}
