//! Feature Vector Assembly

use crate::error::FeatureError;
use crate::normalizer::NormalizationStats;
use crate::rolling::{rolling_stats, RollingStats, DEFAULT_ROLLING_WINDOW};
use crate::schema::{FeatureKind, FeatureSchema};
use frame_loader::sensors::{self, KEY_SENSORS, SETTING_COUNT};
use frame_loader::{RawReading, SensorReading};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

/// Feature vector in schema column order
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    schema: FeatureSchema,
    values: Vec<f64>,
}

impl FeatureVector {
    pub(crate) fn new(schema: FeatureSchema, values: Vec<f64>) -> Self {
        debug_assert_eq!(schema.len(), values.len());
        Self { schema, values }
    }

    /// Values in column order, as fed to the regressor
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Column names
    pub fn names(&self) -> &[String] {
        self.schema.names()
    }

    /// Schema the vector was assembled against
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Value by feature name
    pub fn get(&self, name: &str) -> Option<f64> {
        self.schema.position(name).map(|i| self.values[i])
    }

    /// `(name, value)` pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.schema
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the vector has no features
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Take the raw values
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

/// Features for one training row
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub unit_id: u32,
    pub cycle: u32,
    pub features: FeatureVector,
}

/// Feature engineering configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Trailing window length in cycles (default: 5)
    pub rolling_window: usize,
    /// Sensors that get mean/std/norm features (default: the 14 FD001 key sensors)
    pub key_sensors: Vec<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rolling_window: DEFAULT_ROLLING_WINDOW,
            key_sensors: KEY_SENSORS.to_vec(),
        }
    }
}

/// Derived values for one observation before schema assembly
#[derive(Debug, Default)]
struct DerivedRow {
    settings: [f64; SETTING_COUNT],
    rolling: BTreeMap<usize, RollingStats>,
    norm: BTreeMap<usize, f64>,
}

impl DerivedRow {
    fn value(&self, kind: FeatureKind) -> Option<f64> {
        match kind {
            FeatureKind::Setting(i) => i.checked_sub(1).and_then(|i| self.settings.get(i)).copied(),
            FeatureKind::Mean(s) => self.rolling.get(&s).map(|r| r.mean),
            FeatureKind::Std(s) => self.rolling.get(&s).map(|r| r.std),
            FeatureKind::Norm(s) => self.norm.get(&s).copied(),
        }
    }
}

/// Feature engineer shared by training and inference
#[derive(Debug, Clone)]
pub struct FeatureEngineer {
    /// Rolling window length (at least 1)
    window: usize,
    /// Key sensors after constant-sensor pruning
    key_sensors: Vec<usize>,
}

impl FeatureEngineer {
    /// Create a new feature engineer
    pub fn new(config: EngineConfig) -> Self {
        let key_sensors: Vec<usize> = config
            .key_sensors
            .iter()
            .copied()
            .filter(|&s| {
                let keep = (1..=sensors::SENSOR_COUNT).contains(&s) && !sensors::is_constant(s);
                if !keep {
                    warn!("Ignoring s_{} as a key sensor (constant or out of range)", s);
                }
                keep
            })
            .collect();

        info!(
            "Creating feature engineer: window={}, key_sensors={}",
            config.rolling_window,
            key_sensors.len()
        );
        Self {
            window: config.rolling_window.max(1),
            key_sensors,
        }
    }

    /// Rolling window length
    pub fn window(&self) -> usize {
        self.window
    }

    /// Key sensors that derive features
    pub fn key_sensors(&self) -> &[usize] {
        &self.key_sensors
    }

    /// Fit normalization over the full training corpus
    pub fn fit_normalization(&self, readings: &[SensorReading]) -> NormalizationStats {
        NormalizationStats::fit(readings, &self.key_sensors)
    }

    /// Rolling statistics per key sensor for one unit's cycle-ordered history
    pub fn unit_rolling_stats(
        &self,
        history: &[SensorReading],
    ) -> Result<BTreeMap<usize, Vec<RollingStats>>, FeatureError> {
        for pair in history.windows(2) {
            if pair[1].unit_id != pair[0].unit_id || pair[1].cycle <= pair[0].cycle {
                return Err(FeatureError::CycleOrder {
                    unit_id: pair[1].unit_id,
                    cycle: pair[1].cycle,
                });
            }
        }

        Ok(self
            .key_sensors
            .iter()
            .map(|&s| {
                let values: Vec<f64> = history
                    .iter()
                    .map(|r| r.sensors[s - 1])
                    .collect();
                (s, rolling_stats(&values, self.window))
            })
            .collect())
    }

    /// Batch mode: features for every reading, aligned 1:1 with the input
    ///
    /// Readings are grouped by unit; each unit's readings must appear in
    /// strictly increasing cycle order. Windows never cross unit boundaries.
    pub fn transform(
        &self,
        readings: &[SensorReading],
        normalization: &NormalizationStats,
        schema: &FeatureSchema,
    ) -> Result<Vec<FeatureRow>, FeatureError> {
        let mut by_unit: HashMap<u32, Vec<usize>> = HashMap::new();
        for (idx, r) in readings.iter().enumerate() {
            by_unit.entry(r.unit_id).or_default().push(idx);
        }

        let mut derived: Vec<DerivedRow> = readings
            .iter()
            .map(|r| DerivedRow {
                settings: r.settings,
                ..Default::default()
            })
            .collect();

        for indices in by_unit.values() {
            let history: Vec<SensorReading> =
                indices.iter().map(|&i| readings[i].clone()).collect();
            let rolling = self.unit_rolling_stats(&history)?;
            for (s, stats) in rolling {
                for (pos, &idx) in indices.iter().enumerate() {
                    derived[idx].rolling.insert(s, stats[pos]);
                }
            }
        }

        for (row, reading) in derived.iter_mut().zip(readings) {
            for &s in &self.key_sensors {
                if let Some(z) = normalization.normalize(s, reading.sensors[s - 1]) {
                    row.norm.insert(s, z);
                }
            }
        }

        debug!(
            "Transformed {} readings from {} units into {} features each",
            readings.len(),
            by_unit.len(),
            schema.len()
        );

        Ok(readings
            .iter()
            .zip(derived)
            .map(|(r, row)| FeatureRow {
                unit_id: r.unit_id,
                cycle: r.cycle,
                features: schema.assemble(|kind| row.value(kind)),
            })
            .collect())
    }

    /// Batch mode with an in-sample normalization fit over the same readings
    pub fn fit_transform(
        &self,
        readings: &[SensorReading],
        schema: &FeatureSchema,
    ) -> Result<(NormalizationStats, Vec<FeatureRow>), FeatureError> {
        let normalization = self.fit_normalization(readings);
        let rows = self.transform(readings, &normalization, schema)?;
        Ok((normalization, rows))
    }

    /// Single-reading mode: no history available
    ///
    /// Rolling mean is the raw value, rolling std is 0.0, and normalization
    /// uses the supplied frozen stats.
    pub fn single_reading(
        &self,
        reading: &RawReading,
        normalization: &NormalizationStats,
        schema: &FeatureSchema,
    ) -> Result<FeatureVector, FeatureError> {
        let mut row = DerivedRow::default();
        for (i, slot) in row.settings.iter_mut().enumerate() {
            *slot = reading.require_setting(i + 1)?;
        }
        for &s in &self.key_sensors {
            let value = reading.require_sensor(s)?;
            row.rolling.insert(s, RollingStats::single(value));
            if let Some(z) = normalization.normalize(s, value) {
                row.norm.insert(s, z);
            }
        }

        Ok(schema.assemble(|kind| row.value(kind)))
    }
}

impl Default for FeatureEngineer {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frame_loader::sensors::SENSOR_COUNT;

    fn reading(unit_id: u32, cycle: u32, base: f64) -> SensorReading {
        let mut sensors = [0.0; SENSOR_COUNT];
        for (i, v) in sensors.iter_mut().enumerate() {
            *v = base + i as f64;
        }
        SensorReading {
            unit_id,
            cycle,
            settings: [0.001, -0.0002, 100.0],
            sensors,
        }
    }

    fn unit(unit_id: u32, bases: &[f64]) -> Vec<SensorReading> {
        bases
            .iter()
            .enumerate()
            .map(|(i, b)| reading(unit_id, i as u32 + 1, *b))
            .collect()
    }

    #[test]
    fn test_batch_vector_shape() {
        let engineer = FeatureEngineer::default();
        let schema = FeatureSchema::fd001();
        let readings = unit(1, &[10.0, 20.0, 30.0]);

        let (_, rows) = engineer.fit_transform(&readings, &schema).unwrap();
        assert_eq!(rows.len(), 3);
        for row in &rows {
            assert_eq!(row.features.len(), 45);
            assert_eq!(row.features.names(), schema.names());
        }
        assert_eq!(rows[2].cycle, 3);
        assert_eq!(rows[0].features.get("setting_3"), Some(100.0));
    }

    #[test]
    fn test_batch_rolling_values() {
        let engineer = FeatureEngineer::default();
        let schema = FeatureSchema::fd001();
        let readings = unit(1, &[10.0, 20.0, 30.0, 40.0, 50.0, 60.0]);

        let (_, rows) = engineer.fit_transform(&readings, &schema).unwrap();
        // s_2 is base + 1
        assert_eq!(rows[0].features.get("s_2_mean"), Some(11.0));
        assert_eq!(rows[0].features.get("s_2_std"), Some(0.0));
        assert_eq!(rows[1].features.get("s_2_mean"), Some(16.0));
        // cycles 2..=6 -> bases 20..60
        assert_eq!(rows[5].features.get("s_2_mean"), Some(41.0));
        let std = rows[5].features.get("s_2_std").unwrap();
        assert!((std - 250.0f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_windows_do_not_cross_units() {
        let engineer = FeatureEngineer::default();
        let schema = FeatureSchema::fd001();
        let mut readings = unit(1, &[100.0, 200.0]);
        readings.extend(unit(2, &[10.0]));

        let (_, rows) = engineer.fit_transform(&readings, &schema).unwrap();
        assert_eq!(rows[2].unit_id, 2);
        assert_eq!(rows[2].features.get("s_2_mean"), Some(11.0));
        assert_eq!(rows[2].features.get("s_2_std"), Some(0.0));
    }

    #[test]
    fn test_interleaved_units_keep_input_alignment() {
        let engineer = FeatureEngineer::default();
        let schema = FeatureSchema::fd001();
        let readings = vec![
            reading(1, 1, 10.0),
            reading(2, 1, 500.0),
            reading(1, 2, 20.0),
        ];

        let (_, rows) = engineer.fit_transform(&readings, &schema).unwrap();
        assert_eq!(rows[1].unit_id, 2);
        assert_eq!(rows[1].features.get("s_2_mean"), Some(501.0));
        assert_eq!(rows[2].features.get("s_2_mean"), Some(16.0));
    }

    #[test]
    fn test_in_sample_normalization() {
        let engineer = FeatureEngineer::default();
        let schema = FeatureSchema::fd001();
        let readings = unit(1, &[10.0, 20.0, 30.0]);

        let (stats, rows) = engineer.fit_transform(&readings, &schema).unwrap();
        let s4 = stats.get(4).unwrap();
        assert!((s4.mean - 23.0).abs() < 1e-12);
        assert!((s4.std - 10.0).abs() < 1e-12);
        assert_eq!(rows[0].features.get("s_4_norm"), Some(-1.0));
        assert_eq!(rows[1].features.get("s_4_norm"), Some(0.0));
    }

    #[test]
    fn test_out_of_order_cycles_rejected() {
        let engineer = FeatureEngineer::default();
        let readings = vec![reading(1, 2, 0.0), reading(1, 1, 0.0)];
        let err = engineer
            .fit_transform(&readings, &FeatureSchema::fd001())
            .unwrap_err();
        assert!(matches!(err, FeatureError::CycleOrder { unit_id: 1, cycle: 1 }));
    }

    #[test]
    fn test_constant_sensor_never_derived() {
        let engineer = FeatureEngineer::new(EngineConfig {
            key_sensors: vec![1, 2, 5, 40],
            ..Default::default()
        });
        assert_eq!(engineer.key_sensors(), &[2]);

        let stats = engineer.fit_normalization(&unit(1, &[1.0, 2.0]));
        assert!(stats.get(1).is_none());
        assert!(stats.get(2).is_some());
    }

    #[test]
    fn test_single_reading_approximation() {
        let engineer = FeatureEngineer::default();
        let schema = FeatureSchema::fd001();
        let stats = NormalizationStats::from_baseline_means([("s_2", 642.6), ("s_20", 0.0)]);
        let raw = RawReading::from(&reading(7, 1, 641.0));

        let vector = engineer.single_reading(&raw, &stats, &schema).unwrap();
        assert_eq!(vector.len(), 45);
        assert_eq!(vector.get("s_2_mean"), Some(642.0));
        assert_eq!(vector.get("s_2_std"), Some(0.0));
        let expected = (642.0 - 642.6) / (642.6 * 0.05);
        assert!((vector.get("s_2_norm").unwrap() - expected).abs() < 1e-12);
        // zero baseline mean uses std 1.0
        assert_eq!(vector.get("s_20_norm"), Some(660.0));
        // no stats for s_3: zero-filled
        assert_eq!(vector.get("s_3_norm"), Some(0.0));
    }

    #[test]
    fn test_single_reading_missing_field() {
        let engineer = FeatureEngineer::default();
        let mut raw = RawReading::from(&reading(1, 1, 0.0));
        raw.remove("s_9");

        let err = engineer
            .single_reading(&raw, &NormalizationStats::default(), &FeatureSchema::fd001())
            .unwrap_err();
        assert!(matches!(
            err,
            FeatureError::Input(frame_loader::LoadError::MissingField(ref f)) if f == "s_9"
        ));
    }

    #[test]
    fn test_modes_share_schema_order() {
        let engineer = FeatureEngineer::default();
        let schema = FeatureSchema::new(["s_4_norm", "setting_2", "s_11_mean"]).unwrap();
        let readings = unit(1, &[5.0]);

        let (stats, rows) = engineer.fit_transform(&readings, &schema).unwrap();
        let single = engineer
            .single_reading(&RawReading::from(&readings[0]), &stats, &schema)
            .unwrap();

        assert_eq!(rows[0].features.names(), single.names());
        assert_eq!(rows[0].features.len(), single.len());
        // One-cycle history is exactly the historyless case
        assert_eq!(rows[0].features.values(), single.values());
    }

    #[test]
    fn test_vector_serializes_in_order() {
        let schema = FeatureSchema::new(["setting_2", "s_2_mean"]).unwrap();
        let vector = schema.assemble(|kind| match kind {
            FeatureKind::Setting(_) => Some(1.0),
            _ => Some(2.0),
        });
        let json = serde_json::to_string(&vector).unwrap();
        assert_eq!(json, r#"{"setting_2":1.0,"s_2_mean":2.0}"#);
    }
}
