//! Hearth - Features
//!
//! Pure, deterministic feature extraction for timeline records.
//!
//! # Design Principles
//!
//! - **No I/O**: every function here is a pure computation over one row
//! - **No failure modes**: a feature that cannot be derived is absent, never
//!   an error - unparseable input degrades to `None`
//! - **Deterministic**: the same row always yields the same feature bag
//!
//! # Modules
//!
//! - `extractor` - top-level [`extract`] entry point and the [`Features`] bag
//! - `time` - calendar features, cyclic encodings, state-changed detection
//! - `device` - device category classification
//! - `room` - room heuristic from area name or entity id tokens
//! - `hvac` - climate mode/setpoint extraction
//! - `occupancy` - weighted best-effort occupancy inference

mod device;
mod extractor;
mod hvac;
mod occupancy;
mod room;
mod time;

pub use device::classify_device;
pub use extractor::{FeatureInput, Features, extract, parse_numeric_state};
pub use hvac::{HvacFeatures, extract_hvac};
pub use occupancy::{Occupancy, infer_occupancy};
pub use room::extract_room;
pub use time::{TimeFeatures, extract_time};
