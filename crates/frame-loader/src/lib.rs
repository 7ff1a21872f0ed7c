//! Turbofan Sensor Frames
//!
//! Parses NASA C-MAPSS sensor logs into per-cycle readings and defines the
//! sensor sets shared by the rest of the pipeline.

mod error;
mod loader;
mod reading;
pub mod sensors;

pub use error::LoadError;
pub use loader::FrameLoader;
pub use reading::{FeatureSnapshot, RawReading, SensorReading};
