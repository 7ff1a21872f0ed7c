//! Held-out Evaluation Metrics

use crate::InferenceError;
use serde::Serialize;

/// Regression quality over a held-out split
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Evaluation {
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
    pub samples: usize,
}

/// RMSE, MAE and R² for paired truth and prediction
///
/// R² is 1.0 for a perfect fit of constant truth and 0.0 for an imperfect one.
pub fn evaluate(truth: &[f64], predicted: &[f64]) -> Result<Evaluation, InferenceError> {
    if truth.len() != predicted.len() {
        return Err(InferenceError::InvalidInputShape {
            expected: truth.len(),
            actual: predicted.len(),
        });
    }
    let n = truth.len();
    if n == 0 {
        return Ok(Evaluation {
            rmse: 0.0,
            mae: 0.0,
            r2: 0.0,
            samples: 0,
        });
    }

    let mean = truth.iter().sum::<f64>() / n as f64;
    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    let mut abs_err = 0.0;
    for (t, p) in truth.iter().zip(predicted) {
        let err = t - p;
        ss_res += err * err;
        abs_err += err.abs();
        ss_tot += (t - mean) * (t - mean);
    }

    let r2 = if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else if ss_res == 0.0 {
        1.0
    } else {
        0.0
    };

    Ok(Evaluation {
        rmse: (ss_res / n as f64).sqrt(),
        mae: abs_err / n as f64,
        r2,
        samples: n,
    })
}
