//! Turbofan RUL Pipeline - Main Entry Point
//!
//! `rul-pipeline train` fits and writes the inference artifacts.
//! `rul-pipeline replay <readings.jsonl>` serves recorded raw readings
//! through the batcher and prints each prediction plus the drift report.

use anyhow::{bail, Context};
use frame_loader::RawReading;
use inference_engine::{InferenceBatcher, LinearRegressor, Predictor};
use pipeline::{init_logging, run_training, PipelineConfig};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = PipelineConfig::load()?;
    init_logging(&config.log)?;

    info!("=== Turbofan RUL Pipeline v{} ===", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None | Some("train") => train(&config),
        Some("replay") => {
            let Some(path) = args.get(1) else {
                bail!("usage: rul-pipeline replay <readings.jsonl>");
            };
            replay(&config, path).await
        }
        Some(other) => bail!("unknown command: {other}"),
    }
}

fn train(config: &PipelineConfig) -> anyhow::Result<()> {
    let (_, summary) = run_training(config)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn replay(config: &PipelineConfig, path: &str) -> anyhow::Result<()> {
    let Some(model_file) = &config.model_file else {
        bail!("replay needs model_file in the configuration");
    };
    let regressor = LinearRegressor::load(model_file)?;
    let predictor = Arc::new(
        Predictor::from_artifacts(
            config.feature_list_path(),
            config.baseline_path(),
            config.drift.clone(),
            Arc::new(regressor),
        )?
        .with_rul_cap(config.rul_cap),
    );

    let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let readings = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .enumerate()
        .map(|(i, line)| {
            serde_json::from_str::<RawReading>(line)
                .with_context(|| format!("{path}: record {}", i + 1))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let (handle, mut batcher) = InferenceBatcher::channel(32, 10);
    let worker = {
        let predictor = Arc::clone(&predictor);
        tokio::spawn(async move { batcher.run(&predictor).await })
    };

    let pending: Vec<_> = readings
        .into_iter()
        .map(|reading| {
            let handle = handle.clone();
            tokio::spawn(async move { handle.predict(reading).await })
        })
        .collect();
    for task in pending {
        match task.await? {
            Ok(prediction) => println!("{}", serde_json::to_string(&prediction)?),
            Err(e) => println!("{}", serde_json::json!({ "error": e.to_string() })),
        }
    }
    drop(handle);
    worker.await?;

    println!("{}", serde_json::to_string_pretty(&predictor.drift_report())?);
    Ok(())
}
