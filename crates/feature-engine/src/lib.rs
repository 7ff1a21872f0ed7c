//! Feature Engineering Engine
//!
//! Turns per-cycle sensor readings into the fixed, ordered feature vector the
//! RUL regressor consumes. Two modes share one output schema:
//!
//! - batch: causal rolling statistics over each unit's history plus z-score
//!   normalization fitted once over the whole training corpus
//! - single reading: historyless approximation for live requests
//!
//! Constant sensors never contribute a derived feature.

mod error;
mod features;
mod normalizer;
mod rolling;
mod schema;

pub use error::FeatureError;
pub use features::{EngineConfig, FeatureEngineer, FeatureRow, FeatureVector};
pub use normalizer::{NormalizationStats, SensorNormalization, SYNTHETIC_STD_RATIO};
pub use rolling::{rolling_stats, RollingStats, DEFAULT_ROLLING_WINDOW};
pub use schema::{FeatureKind, FeatureSchema};
