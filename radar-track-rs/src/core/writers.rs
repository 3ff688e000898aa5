//! CSV writers for selected detections, reference samples and track samples.
//!
//! Column names follow the selection arrays: detections are written as
//! `range,azimuth,velocity,x,y,trackID,beam,mcc`, references with the DGPS
//! short names (`mccL`, `mccR`, `TAR_dist`, ...).

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use log::info;
use serde::Serialize;
use thiserror::Error;

use super::points::{DetectionPoint, ReferencePoint, TrackPoint};

/// Errors that can occur during write operations.
#[derive(Error, Debug)]
pub enum WriteError {
    /// Failed to create parent directories.
    #[error("failed to create parent directories for '{path}': {source}")]
    CreateDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or open file for writing.
    #[error("failed to create file '{path}': {source}")]
    CreateFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to flush data to file.
    #[error("failed to write to file '{path}': {source}")]
    WriteFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV writing error.
    #[error("CSV write error for '{path}': {source}")]
    CsvError {
        path: String,
        #[source]
        source: csv::Error,
    },
}

/// Result type for write operations.
pub type Result<T> = std::result::Result<T, WriteError>;

/// Creates parent directories for a file path if they don't exist.
fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| WriteError::CreateDirectory {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
    }
    Ok(())
}

/// Serialize `records` as CSV rows with a header taken from the field names.
///
/// An empty selection still produces a file, holding only the header when
/// `header` is given.
fn write_records<'a, T, I>(path: &Path, records: I, header: Option<&[&str]>) -> Result<usize>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    ensure_parent_dirs(path)?;

    let path_str = path.display().to_string();
    let file = File::create(path).map_err(|e| WriteError::CreateFile {
        path: path_str.clone(),
        source: e,
    })?;

    let mut records = records.into_iter().peekable();
    let empty = records.peek().is_none();

    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(!empty)
        .from_writer(BufWriter::new(file));

    if empty {
        if let Some(header) = header {
            csv_writer
                .write_record(header)
                .map_err(|e| WriteError::CsvError {
                    path: path_str.clone(),
                    source: e,
                })?;
        }
    }

    let mut count = 0;
    for record in records {
        csv_writer
            .serialize(record)
            .map_err(|e| WriteError::CsvError {
                path: path_str.clone(),
                source: e,
            })?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| WriteError::WriteFile {
        path: path_str.clone(),
        source: e,
    })?;

    info!("Wrote {} rows to {}", count, path_str);
    Ok(count)
}

/// Write selected detections to CSV.
///
/// # Arguments
///
/// * `path` - Output file path (parent directories will be created if needed)
/// * `detections` - Selected detections, written in the given order
///
/// # Returns
///
/// The number of data rows written.
///
/// # Example
///
/// ```no_run
/// use radar_track::core::detections::{DetectionList, DetectionQuery};
/// use radar_track::core::writers::write_detections_csv;
/// use std::path::Path;
///
/// let list = DetectionList::new();
/// let selected = list.select(&DetectionQuery::new().beams([0, 1]));
/// write_detections_csv(Path::new("selected.csv"), &selected).unwrap();
/// ```
pub fn write_detections_csv(path: &Path, detections: &[&DetectionPoint]) -> Result<usize> {
    write_records(
        path,
        detections.iter().copied(),
        Some(&crate::core::detections::DetectionColumns::KEYS),
    )
}

/// Write selected DGPS samples to CSV.
pub fn write_references_csv(path: &Path, references: &[&ReferencePoint]) -> Result<usize> {
    write_records(
        path,
        references.iter().copied(),
        Some(&crate::core::references::ReferenceColumns::KEYS),
    )
}

/// Write track samples to CSV (`mcc,x,y,dx,dy,azimuth,velocity,beam`).
pub fn write_track_csv(path: &Path, samples: &[&TrackPoint]) -> Result<usize> {
    write_records(
        path,
        samples.iter().copied(),
        Some(&["mcc", "x", "y", "dx", "dy", "azimuth", "velocity", "beam"]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::detections::{DetectionList, DetectionQuery};
    use crate::core::points::{RawDetection, SensorMount};
    use crate::core::references::{ReferenceList, ReferenceQuery};
    use crate::core::track::Track;
    use tempfile::tempdir;

    fn detections() -> DetectionList {
        (0..3)
            .map(|i| {
                DetectionPoint::new(
                    RawDetection {
                        mcc: 10 + i,
                        beam: i as u8,
                        range: 4.0,
                        ..Default::default()
                    },
                    SensorMount::right(2.0),
                )
            })
            .collect()
    }

    #[test]
    fn test_write_detections_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("detections.csv");
        let list = detections();
        let selected = list.select(&DetectionQuery::new().beams([0, 2]));

        let rows = write_detections_csv(&path, &selected).unwrap();
        assert_eq!(rows, 2);

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "range,azimuth,velocity,x,y,trackID,beam,mcc");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].ends_with(",0,0,10"));
        assert!(lines[2].ends_with(",0,2,12"));
    }

    #[test]
    fn test_write_empty_selection_keeps_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("empty.csv");
        let list = detections();
        let selected = list.select(&DetectionQuery::new().mcc(999_i64));

        let rows = write_detections_csv(&path, &selected).unwrap();
        assert_eq!(rows, 0);

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim_end(), "range,azimuth,velocity,x,y,trackID,beam,mcc");
    }

    #[test]
    fn test_write_references_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dgps.csv");
        let list: ReferenceList = vec![
            ReferencePoint {
                mcc_left: 1,
                mcc_right: 2,
                target_dist: 30.0,
                ..Default::default()
            },
            ReferencePoint {
                mcc_left: 5,
                mcc_right: 6,
                ..Default::default()
            },
        ]
        .into_iter()
        .collect();
        let selected = list.select(&ReferenceQuery::new().mcc_left(1_i64));

        write_references_csv(&path, &selected).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert!(lines[0].starts_with("mccL,mccR,TAR_dist,TAR_distX"));
        assert!(lines[0].ends_with("EGO_hdg"));
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("1,2,30.0"));
    }

    #[test]
    fn test_write_track_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("track.csv");
        let mut track = Track::new(1);
        track.push(TrackPoint {
            mcc: 3,
            x: 1.5,
            beam: 2,
            ..Default::default()
        });
        let samples: Vec<&TrackPoint> = track.points().iter().collect();

        write_track_csv(&path, &samples).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "mcc,x,y,dx,dy,azimuth,velocity,beam");
        assert_eq!(lines[1], "3,1.5,0.0,0.0,0.0,0.0,0.0,2");
    }
}
