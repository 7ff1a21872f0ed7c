//! Regressor Contract
//!
//! The trained model is external; anything mapping an ordered feature
//! vector to a real RUL estimate can serve predictions.

use crate::InferenceError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Index-positional RUL regressor
pub trait Regressor: Send + Sync {
    /// Predict unclamped RUL from features in schema order
    fn predict(&self, features: &[f64]) -> Result<f64, InferenceError>;

    /// Feature count the model was trained on, if known
    fn expected_features(&self) -> Option<usize> {
        None
    }
}

/// Predicts the same value for every input
///
/// Used as the mean-RUL baseline in evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantRegressor(pub f64);

impl ConstantRegressor {
    /// Mean of the training targets; 0.0 for an empty set
    pub fn fit_mean(targets: &[f64]) -> Self {
        if targets.is_empty() {
            return Self(0.0);
        }
        Self(targets.iter().sum::<f64>() / targets.len() as f64)
    }
}

impl Regressor for ConstantRegressor {
    fn predict(&self, _features: &[f64]) -> Result<f64, InferenceError> {
        Ok(self.0)
    }
}

/// Linear model `intercept + w . x` over a fixed-length feature vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressor {
    pub intercept: f64,
    pub weights: Vec<f64>,
}

impl LinearRegressor {
    pub fn new(intercept: f64, weights: Vec<f64>) -> Self {
        Self { intercept, weights }
    }

    /// Load coefficients from JSON
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| InferenceError::Regressor(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&text)
            .map_err(|e| InferenceError::Regressor(format!("{}: {e}", path.display())))
    }
}

impl Regressor for LinearRegressor {
    fn predict(&self, features: &[f64]) -> Result<f64, InferenceError> {
        if features.len() != self.weights.len() {
            return Err(InferenceError::InvalidInputShape {
                expected: self.weights.len(),
                actual: features.len(),
            });
        }
        Ok(self.intercept
            + self
                .weights
                .iter()
                .zip(features)
                .map(|(w, x)| w * x)
                .sum::<f64>())
    }

    fn expected_features(&self) -> Option<usize> {
        Some(self.weights.len())
    }
}
