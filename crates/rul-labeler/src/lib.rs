//! RUL Labeling
//!
//! Computes remaining-useful-life targets from complete unit histories and
//! splits labeled data by engine unit.

mod labeler;
mod split;

pub use labeler::{clip, RulLabel, RulLabeler, RUL_CAP};
pub use split::{UnitSplit, DEFAULT_TRAIN_CUTOFF};
