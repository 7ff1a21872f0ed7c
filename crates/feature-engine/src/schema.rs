//! Persisted Feature-Name Contract
//!
//! The regressor is index-positional, so the feature list written at training
//! time is the binding column order at inference time. A schema is validated
//! once when it is built or loaded and is immutable afterwards.

use crate::error::FeatureError;
use crate::features::FeatureVector;
use frame_loader::sensors::{self, KEY_SENSORS, SETTING_COUNT};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// What a feature name refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    /// Operational setting `setting_{n}`
    Setting(usize),
    /// Rolling mean `s_{n}_mean`
    Mean(usize),
    /// Rolling standard deviation `s_{n}_std`
    Std(usize),
    /// Z-score normalized value `s_{n}_norm`
    Norm(usize),
}

impl FeatureKind {
    /// Parse a feature name; `None` if it matches no known pattern
    pub fn parse(name: &str) -> Option<Self> {
        if let Some(index) = sensors::parse_setting_name(name) {
            return Some(FeatureKind::Setting(index));
        }
        let (sensor, ctor): (&str, fn(usize) -> FeatureKind) =
            if let Some(s) = name.strip_suffix("_mean") {
                (s, FeatureKind::Mean)
            } else if let Some(s) = name.strip_suffix("_std") {
                (s, FeatureKind::Std)
            } else if let Some(s) = name.strip_suffix("_norm") {
                (s, FeatureKind::Norm)
            } else {
                return None;
            };
        sensors::parse_sensor_name(sensor).map(ctor)
    }

    /// Source sensor index for derived features
    pub fn sensor(&self) -> Option<usize> {
        match *self {
            FeatureKind::Setting(_) => None,
            FeatureKind::Mean(s) | FeatureKind::Std(s) | FeatureKind::Norm(s) => Some(s),
        }
    }

    /// Whether the engineer can produce this feature
    pub fn is_derivable(&self) -> bool {
        match *self {
            FeatureKind::Setting(i) => (1..=SETTING_COUNT).contains(&i),
            _ => self.sensor().is_some_and(sensors::is_key),
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureKind::Setting(i) => write!(f, "setting_{i}"),
            FeatureKind::Mean(s) => write!(f, "s_{s}_mean"),
            FeatureKind::Std(s) => write!(f, "s_{s}_std"),
            FeatureKind::Norm(s) => write!(f, "s_{s}_norm"),
        }
    }
}

/// Validated, ordered list of feature names
///
/// Cheap to clone; every `FeatureVector` built from it shares the name list.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    names: Arc<[String]>,
    kinds: Arc<[FeatureKind]>,
}

impl FeatureSchema {
    /// Build a schema, keeping the given order
    ///
    /// Rejects empty lists, duplicates, unparseable or non-canonical names
    /// (`s_02_mean`, `s_+2_mean`) and names built on constant or non-key
    /// sensors.
    pub fn new<I, S>(names: I) -> Result<Self, FeatureError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(FeatureError::EmptySchema);
        }

        let mut seen = HashSet::with_capacity(names.len());
        let mut kinds = Vec::with_capacity(names.len());
        for name in &names {
            let kind = match FeatureKind::parse(name) {
                Some(kind) if kind.is_derivable() && kind.to_string() == *name => kind,
                _ => return Err(FeatureError::UnknownFeature(name.clone())),
            };
            if !seen.insert(kind) {
                return Err(FeatureError::DuplicateFeature(name.clone()));
            }
            kinds.push(kind);
        }

        Ok(Self {
            names: names.into(),
            kinds: kinds.into(),
        })
    }

    /// Every derivable feature for the given key sensors, sorted by name
    pub fn for_key_sensors(key_sensors: &[usize]) -> Result<Self, FeatureError> {
        let mut names: Vec<String> = (1..=SETTING_COUNT).map(sensors::setting_name).collect();
        for &s in key_sensors {
            names.push(FeatureKind::Mean(s).to_string());
            names.push(FeatureKind::Std(s).to_string());
            names.push(FeatureKind::Norm(s).to_string());
        }
        names.sort();
        Self::new(names)
    }

    /// The FD001 training schema: 3 settings plus mean/std/norm for 14 key sensors
    pub fn fd001() -> Self {
        let mut names: Vec<String> = (1..=SETTING_COUNT).map(sensors::setting_name).collect();
        let mut kinds: Vec<FeatureKind> = (1..=SETTING_COUNT).map(FeatureKind::Setting).collect();
        for s in KEY_SENSORS {
            for kind in [FeatureKind::Mean(s), FeatureKind::Std(s), FeatureKind::Norm(s)] {
                names.push(kind.to_string());
                kinds.push(kind);
            }
        }
        let mut pairs: Vec<(String, FeatureKind)> = names.into_iter().zip(kinds).collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        let (names, kinds): (Vec<String>, Vec<FeatureKind>) = pairs.into_iter().unzip();
        Self {
            names: names.into(),
            kinds: kinds.into(),
        }
    }

    /// Load a persisted list (one name per line); failures are configuration errors
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FeatureError> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).map_err(|e| FeatureError::configuration(path, e))?;
        let schema = Self::parse(&text).map_err(|e| FeatureError::configuration(path, e))?;

        if !schema.is_sorted() {
            warn!(
                "Feature list {} is not alphabetical; using persisted order",
                path.display()
            );
        }
        info!("Loaded {} feature columns from {}", schema.len(), path.display());
        Ok(schema)
    }

    /// Parse the persisted text format
    pub fn parse(text: &str) -> Result<Self, FeatureError> {
        Self::new(text.lines().map(str::trim).filter(|l| !l.is_empty()))
    }

    /// Persisted text format: one name per line
    pub fn to_text(&self) -> String {
        let mut text = self.names.join("\n");
        text.push('\n');
        text
    }

    /// Write the persisted list
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), FeatureError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_text()).map_err(|source| FeatureError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false for a validated schema
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Feature names in column order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Feature kinds in column order
    pub fn kinds(&self) -> &[FeatureKind] {
        &self.kinds
    }

    /// Column index of a name
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Whether names are in byte-wise alphabetical order
    pub fn is_sorted(&self) -> bool {
        self.names.windows(2).all(|w| w[0] <= w[1])
    }

    /// Assemble a vector in schema order
    ///
    /// Any column the lookup cannot supply is zero-filled with a warning, so
    /// the vector is always complete and positionally stable.
    pub fn assemble(&self, lookup: impl Fn(FeatureKind) -> Option<f64>) -> FeatureVector {
        let values = self
            .names
            .iter()
            .zip(self.kinds.iter())
            .map(|(name, kind)| {
                lookup(*kind).unwrap_or_else(|| {
                    warn!("Feature {} unavailable, zero-filled", name);
                    0.0
                })
            })
            .collect();
        FeatureVector::new(self.clone(), values)
    }
}
