//! Remaining Useful Life Labeler

use frame_loader::SensorReading;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

/// Piecewise-linear RUL cap used as the training target ceiling
pub const RUL_CAP: u32 = 125;

/// Cap a non-negative RUL value
pub fn clip(value: f64, cap: f64) -> f64 {
    value.min(cap)
}

/// Ground-truth label for one reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulLabel {
    pub unit_id: u32,
    pub cycle: u32,
    /// Cycles until the unit's final observed cycle
    #[serde(rename = "RUL")]
    pub rul: u32,
    /// `min(rul, cap)`, the regression target
    #[serde(rename = "RUL_clipped")]
    pub rul_clipped: u32,
}

impl RulLabel {
    /// Whether this is the unit's terminal (failure) record
    pub fn is_terminal(&self) -> bool {
        self.rul == 0
    }
}

/// Two-pass labeler: a unit's labels are only final once its last cycle is seen
#[derive(Debug, Clone)]
pub struct RulLabeler {
    cap: u32,
}

impl RulLabeler {
    /// Create a labeler with a custom cap
    pub fn new(cap: u32) -> Self {
        Self { cap }
    }

    /// The configured cap
    pub fn cap(&self) -> u32 {
        self.cap
    }

    /// Greatest cycle observed per unit
    pub fn max_cycles(readings: &[SensorReading]) -> HashMap<u32, u32> {
        let mut max_cycles: HashMap<u32, u32> = HashMap::new();
        for r in readings {
            let entry = max_cycles.entry(r.unit_id).or_insert(r.cycle);
            *entry = (*entry).max(r.cycle);
        }
        max_cycles
    }

    /// Label every reading; output is aligned 1:1 with the input
    pub fn label(&self, readings: &[SensorReading]) -> Vec<RulLabel> {
        let max_cycles = Self::max_cycles(readings);

        let labels: Vec<RulLabel> = readings
            .iter()
            .map(|r| {
                let rul = max_cycles[&r.unit_id].saturating_sub(r.cycle);
                RulLabel {
                    unit_id: r.unit_id,
                    cycle: r.cycle,
                    rul,
                    rul_clipped: rul.min(self.cap),
                }
            })
            .collect();

        let max_rul = labels.iter().map(|l| l.rul).max().unwrap_or(0);
        info!(
            "Labeled {} readings across {} units (max RUL {}, clipped at {})",
            labels.len(),
            max_cycles.len(),
            max_rul,
            self.cap
        );
        labels
    }
}

impl Default for RulLabeler {
    fn default() -> Self {
        Self::new(RUL_CAP)
    }
}
