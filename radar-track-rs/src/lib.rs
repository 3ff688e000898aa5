//! Selection and inspection of recorded automotive RADAR detections.
//!
//! This crate provides tools for:
//! - Loading left/right RADAR detection matrices and DGPS reference data
//! - Point collections that keep per-attribute value intervals current
//! - Criteria-based selection (scalar, range or tracked interval per attribute, plus beams)
//! - Tracks with a prediction slot and two-point constant-velocity projection
//! - CSV export and bird's-eye PNG plots of selected detections
//!
//! # Example
//!
//! ```no_run
//! use radar_track::core::detections::DetectionQuery;
//! use radar_track::core::loaders::load_detections_csv;
//! use radar_track::core::points::SensorMount;
//!
//! let left = load_detections_csv("left.csv", SensorMount::left(1.88)).unwrap();
//! let near = left.select(&DetectionQuery::new().x((0.0, 20.0)).beams([0, 1]));
//! println!("{} of {} detections within 20 m", near.len(), left.len());
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod visualization;

pub use config::{AnalysisConfig, Dataset, ScenarioPaths};
pub use crate::core::detections::{DetectionList, DetectionQuery};
pub use crate::core::points::{DetectionPoint, ReferencePoint, TrackPoint};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
