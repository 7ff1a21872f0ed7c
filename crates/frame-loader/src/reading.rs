//! Per-Cycle Reading Types

use crate::error::LoadError;
use crate::sensors::{self, SENSOR_COUNT, SETTING_COUNT};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw settings and non-constant sensor values keyed by column name
pub type FeatureSnapshot = BTreeMap<String, f64>;

/// One engine unit at one cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Engine unit identifier (positive)
    pub unit_id: u32,
    /// Cycle index within the unit, starting at 1
    pub cycle: u32,
    /// Operational settings `setting_1..3`
    pub settings: [f64; SETTING_COUNT],
    /// Sensor measurements `s_1..s_21` (position 0 holds `s_1`)
    pub sensors: [f64; SENSOR_COUNT],
}

impl SensorReading {
    /// Sensor value by 1-based index
    pub fn sensor(&self, index: usize) -> Option<f64> {
        index
            .checked_sub(1)
            .and_then(|i| self.sensors.get(i))
            .copied()
    }

    /// Setting value by 1-based index
    pub fn setting(&self, index: usize) -> Option<f64> {
        index
            .checked_sub(1)
            .and_then(|i| self.settings.get(i))
            .copied()
    }

    /// Settings plus non-constant sensors, as stored for drift monitoring
    pub fn snapshot(&self) -> FeatureSnapshot {
        let mut snapshot = FeatureSnapshot::new();
        for (i, value) in self.settings.iter().enumerate() {
            snapshot.insert(sensors::setting_name(i + 1), *value);
        }
        for index in sensors::retained_sensors() {
            snapshot.insert(sensors::sensor_name(index), self.sensors[index - 1]);
        }
        snapshot
    }
}

/// Historyless inference request as received at the service boundary
///
/// Required fields are the three settings and every non-constant sensor.
/// Constant sensors may be present and are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawReading {
    fields: BTreeMap<String, f64>,
}

impl RawReading {
    /// Create an empty request
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field insertion
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Set a field
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.fields.insert(name.into(), value);
    }

    /// Remove a field, returning its value
    pub fn remove(&mut self, name: &str) -> Option<f64> {
        self.fields.remove(name)
    }

    /// Field value if present
    pub fn get(&self, name: &str) -> Option<f64> {
        self.fields.get(name).copied()
    }

    /// Field value or `MissingField`
    pub fn require(&self, name: &str) -> Result<f64, LoadError> {
        self.get(name)
            .ok_or_else(|| LoadError::MissingField(name.to_string()))
    }

    /// Setting by 1-based index, required
    pub fn require_setting(&self, index: usize) -> Result<f64, LoadError> {
        self.require(&sensors::setting_name(index))
    }

    /// Sensor by 1-based index, required
    pub fn require_sensor(&self, index: usize) -> Result<f64, LoadError> {
        self.require(&sensors::sensor_name(index))
    }

    /// Check every required field is present
    pub fn validate(&self) -> Result<(), LoadError> {
        self.snapshot().map(|_| ())
    }

    /// Required fields only, in column order; fails on the first missing one
    pub fn snapshot(&self) -> Result<FeatureSnapshot, LoadError> {
        sensors::snapshot_fields()
            .into_iter()
            .map(|name| {
                let value = self.require(&name)?;
                Ok((name, value))
            })
            .collect()
    }

    /// Number of fields carried
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no fields are carried
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<&SensorReading> for RawReading {
    fn from(reading: &SensorReading) -> Self {
        let mut raw = RawReading::new();
        for (i, value) in reading.settings.iter().enumerate() {
            raw.insert(sensors::setting_name(i + 1), *value);
        }
        for (i, value) in reading.sensors.iter().enumerate() {
            raw.insert(sensors::sensor_name(i + 1), *value);
        }
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading() -> SensorReading {
        let mut sensors = [0.0; SENSOR_COUNT];
        for (i, v) in sensors.iter_mut().enumerate() {
            *v = (i + 1) as f64 * 10.0;
        }
        SensorReading {
            unit_id: 1,
            cycle: 1,
            settings: [-0.0007, -0.0004, 100.0],
            sensors,
        }
    }

    #[test]
    fn test_indexed_access() {
        let r = reading();
        assert_eq!(r.sensor(1), Some(10.0));
        assert_eq!(r.sensor(21), Some(210.0));
        assert_eq!(r.sensor(0), None);
        assert_eq!(r.sensor(22), None);
        assert_eq!(r.setting(3), Some(100.0));
    }

    #[test]
    fn test_snapshot_drops_constant_sensors() {
        let snapshot = reading().snapshot();
        assert_eq!(snapshot.len(), 18);
        assert!(!snapshot.contains_key("s_1"));
        assert_eq!(snapshot["s_6"], 60.0);
    }

    #[test]
    fn test_raw_reading_missing_field() {
        let mut raw = RawReading::from(&reading());
        assert!(raw.validate().is_ok());

        raw.remove("s_11");
        match raw.validate() {
            Err(LoadError::MissingField(name)) => assert_eq!(name, "s_11"),
            other => panic!("expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_constant_sensors_are_optional() {
        let mut raw = RawReading::from(&reading());
        for s in sensors::CONSTANT_SENSORS {
            raw.remove(&sensors::sensor_name(s));
        }
        assert!(raw.validate().is_ok());
    }

    #[test]
    fn test_raw_reading_deserializes_from_flat_json() {
        let raw: RawReading =
            serde_json::from_str(r#"{"setting_1": -0.0007, "s_2": 641.82}"#).unwrap();
        assert_eq!(raw.get("s_2"), Some(641.82));
        assert_eq!(raw.len(), 2);
    }
}
