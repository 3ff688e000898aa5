//! Core data types, selection engine and I/O operations.

pub mod collection;
pub mod criteria;
pub mod detections;
pub mod interval;
pub mod loaders;
pub mod points;
pub mod projection;
pub mod references;
pub mod track;
pub mod unassigned;
pub mod writers;

pub use collection::{CollectionError, PointCollection};
pub use criteria::{BeamSet, Criterion};
pub use detections::{DetectionList, DetectionQuery, DetectionSelection};
pub use interval::Interval;
pub use points::{DetectionPoint, ReferencePoint, SensorMount, Side, TrackPoint};
pub use projection::SamplingPeriod;
pub use references::{ReferenceList, ReferenceQuery};
pub use track::{Track, TrackQuery};
pub use unassigned::UnassignedDetections;
pub use writers::{write_detections_csv, write_references_csv, write_track_csv, WriteError};
