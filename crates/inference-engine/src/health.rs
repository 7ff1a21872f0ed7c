//! RUL Clamping and Health Banding

use serde::{Deserialize, Serialize};
use std::fmt;

/// RUL below this is Critical
pub const CRITICAL_BELOW: f64 = 30.0;

/// RUL below this (and at least `CRITICAL_BELOW`) is Warning
pub const WARNING_BELOW: f64 = 80.0;

/// Clamp raw regressor output to `[0, cap]`
pub fn clamp_rul(raw: f64, cap: u32) -> f64 {
    raw.clamp(0.0, cap as f64)
}

/// Engine health band derived from predicted RUL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthStatus {
    Critical,
    Warning,
    Healthy,
}

/// Qualitative confidence attached to a health band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
}

impl HealthStatus {
    /// Band a (clamped) RUL; lower bounds are inclusive
    pub fn from_rul(rul: f64) -> Self {
        if rul < CRITICAL_BELOW {
            HealthStatus::Critical
        } else if rul < WARNING_BELOW {
            HealthStatus::Warning
        } else {
            HealthStatus::Healthy
        }
    }

    /// Band confidence: the extremes are High, the middle band Medium
    pub fn confidence(&self) -> Confidence {
        match self {
            HealthStatus::Critical | HealthStatus::Healthy => Confidence::High,
            HealthStatus::Warning => Confidence::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Critical => "Critical",
            HealthStatus::Warning => "Warning",
            HealthStatus::Healthy => "Healthy",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::High => f.write_str("High"),
            Confidence::Medium => f.write_str("Medium"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundaries() {
        assert_eq!(HealthStatus::from_rul(29.9), HealthStatus::Critical);
        assert_eq!(HealthStatus::from_rul(30.0), HealthStatus::Warning);
        assert_eq!(HealthStatus::from_rul(79.9), HealthStatus::Warning);
        assert_eq!(HealthStatus::from_rul(80.0), HealthStatus::Healthy);
        assert_eq!(HealthStatus::from_rul(0.0), HealthStatus::Critical);
        assert_eq!(HealthStatus::from_rul(125.0), HealthStatus::Healthy);
    }

    #[test]
    fn test_confidence() {
        assert_eq!(HealthStatus::Critical.confidence(), Confidence::High);
        assert_eq!(HealthStatus::Warning.confidence(), Confidence::Medium);
        assert_eq!(HealthStatus::Healthy.confidence(), Confidence::High);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp_rul(-12.0, 125), 0.0);
        assert_eq!(clamp_rul(57.5, 125), 57.5);
        assert_eq!(clamp_rul(300.0, 125), 125.0);
        assert_eq!(clamp_rul(180.0, 100), 100.0);
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(serde_json::to_string(&HealthStatus::Warning).unwrap(), "\"Warning\"");
        assert_eq!(Confidence::Medium.to_string(), "Medium");
    }
}
