//! Data loaders for recorded RADAR detections and DGPS reference data.
//!
//! This module provides parsers for:
//! - Detection CSV files (the recorder's detection matrix, positional columns)
//! - DGPS reference CSV files (named columns, one row per sample)

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

use super::detections::DetectionList;
use super::points::{DetectionPoint, RawDetection, ReferencePoint, SensorMount};
use super::references::ReferenceList;

/// Errors that can occur during file loading.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Empty file: {0}")]
    EmptyFile(PathBuf),

    #[error("Missing required columns: {0}")]
    MissingColumns(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

// Column layout of the detection matrix.
const MCC_COL: usize = 0;
const BEAM_COL: usize = 2;
const DETECTIONS_COL: usize = 3;
const RANGE_COL: usize = 5;
const VELOCITY_COL: usize = 6;
const AZIMUTH_COL: usize = 7;
const MIN_DETECTION_COLUMNS: usize = AZIMUTH_COL + 1;

/// Reject NaN and infinities; they would fall outside every tracked interval.
fn finite_value(value: f64, row: usize, column: &str) -> Result<f64> {
    if !value.is_finite() {
        return Err(LoaderError::ParseError(format!(
            "row {}, {}: non-finite value {}",
            row, column, value
        )));
    }
    Ok(value)
}

/// Whole-number check; the recorder stores clock cycles and ids as floats.
fn integer_value(value: f64, row: usize, column: &str) -> Result<i64> {
    let value = finite_value(value, row, column)?;
    if value.fract() != 0.0 || value.abs() >= i64::MAX as f64 {
        return Err(LoaderError::ParseError(format!(
            "row {}, {}: expected an integer, got {}",
            row, column, value
        )));
    }
    Ok(value as i64)
}

/// Parse a numeric cell; `row` is 1-based and counts data rows only.
fn numeric_field(record: &StringRecord, col: usize, row: usize) -> Result<f64> {
    let raw = record.get(col).ok_or_else(|| {
        LoaderError::MissingColumns(format!("row {} has no column {}", row, col))
    })?;
    let value = raw.trim().parse::<f64>().map_err(|_| {
        LoaderError::ParseError(format!("row {}, column {}: invalid number '{}'", row, col, raw))
    })?;
    finite_value(value, row, &format!("column {}", col))
}

fn integer_field(record: &StringRecord, col: usize, row: usize) -> Result<i64> {
    integer_value(numeric_field(record, col, row)?, row, &format!("column {}", col))
}

/// Parse one row of the detection matrix.
fn parse_detection(record: &StringRecord, row: usize) -> Result<RawDetection> {
    if record.len() < MIN_DETECTION_COLUMNS {
        return Err(LoaderError::MissingColumns(format!(
            "row {} has {} columns, expected at least {}",
            row,
            record.len(),
            MIN_DETECTION_COLUMNS
        )));
    }

    let beam = integer_field(record, BEAM_COL, row)?;
    let beam = u8::try_from(beam).map_err(|_| {
        LoaderError::ParseError(format!("row {}: beam id {} out of range", row, beam))
    })?;
    let detections_in_cycle = integer_field(record, DETECTIONS_COL, row)?;
    let detections_in_cycle = u32::try_from(detections_in_cycle).map_err(|_| {
        LoaderError::ParseError(format!(
            "row {}: detection count {} out of range",
            row, detections_in_cycle
        ))
    })?;

    Ok(RawDetection {
        mcc: integer_field(record, MCC_COL, row)?,
        beam,
        detections_in_cycle,
        track_id: 0,
        range: numeric_field(record, RANGE_COL, row)?,
        velocity: numeric_field(record, VELOCITY_COL, row)?,
        azimuth: numeric_field(record, AZIMUTH_COL, row)?,
    })
}

/// Load RADAR detections from a CSV export of the detection matrix.
///
/// The expected CSV format:
/// - Header row (skipped)
/// - Columns: MCC(0), ..., Beam(2), DetectionsInCycle(3), ..., Range(5), Velocity(6), Azimuth(7)
///
/// Every detection gets track id 0. Points are appended as one batch, so the
/// list's intervals are computed once.
///
/// # Arguments
///
/// * `path` - Path to the detection CSV file
/// * `mount` - Side and car width used to derive vehicle-frame coordinates
///
/// # Errors
///
/// Returns an error if the file cannot be read, a cell is malformed, or the
/// file holds no detections.
pub fn load_detections_csv<P: AsRef<Path>>(path: P, mount: SensorMount) -> Result<DetectionList> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let mut points = Vec::with_capacity(4096);
    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        let raw = parse_detection(&record, idx + 1)?;
        points.push(DetectionPoint::new(raw, mount));
    }

    if points.is_empty() {
        return Err(LoaderError::EmptyFile(path.to_path_buf()));
    }

    let mut list = DetectionList::new();
    list.extend_points(points);

    let (mcc_lo, mcc_hi) = list.mcc_interval();
    info!(
        "Loaded {} {} detections from {} (MCC {}..{})",
        list.len(),
        mount.side.label(),
        path.display(),
        mcc_lo,
        mcc_hi
    );
    Ok(list)
}

/// One row of the DGPS export.
#[derive(Debug, Deserialize)]
struct DgpsRecord {
    #[serde(rename = "MCC_LeftRadar")]
    mcc_left: f64,
    #[serde(rename = "MCC_RightRadar")]
    mcc_right: f64,
    #[serde(rename = "TARGET_dist")]
    target_dist: f64,
    #[serde(rename = "TARGET_distX")]
    target_dist_x: f64,
    #[serde(rename = "TARGET_distY")]
    target_dist_y: f64,
    #[serde(rename = "TARGET_AbsVel_x")]
    target_vel_x: f64,
    #[serde(rename = "TARGET_AbsVel_y")]
    target_vel_y: f64,
    #[serde(rename = "TARGET_Heading")]
    target_heading: f64,
    #[serde(rename = "EGO_AbsVel_x")]
    ego_vel_x: f64,
    #[serde(rename = "EGO_AbsVel_y")]
    ego_vel_y: f64,
    #[serde(rename = "EGO_Acc_x")]
    ego_acc_x: f64,
    #[serde(rename = "EGO_Acc_y")]
    ego_acc_y: f64,
    #[serde(rename = "EGO_Heading")]
    ego_heading: f64,
}

impl DgpsRecord {
    /// Validate one data row (1-based) and convert it.
    fn into_reference(self, row: usize) -> Result<ReferencePoint> {
        let float = |value: f64, column: &str| finite_value(value, row, column);
        Ok(ReferencePoint {
            mcc_left: integer_value(self.mcc_left, row, "MCC_LeftRadar")?,
            mcc_right: integer_value(self.mcc_right, row, "MCC_RightRadar")?,
            target_dist: float(self.target_dist, "TARGET_dist")?,
            target_dist_x: float(self.target_dist_x, "TARGET_distX")?,
            target_dist_y: float(self.target_dist_y, "TARGET_distY")?,
            target_vel_x: float(self.target_vel_x, "TARGET_AbsVel_x")?,
            target_vel_y: float(self.target_vel_y, "TARGET_AbsVel_y")?,
            target_heading: float(self.target_heading, "TARGET_Heading")?,
            ego_vel_x: float(self.ego_vel_x, "EGO_AbsVel_x")?,
            ego_vel_y: float(self.ego_vel_y, "EGO_AbsVel_y")?,
            ego_acc_x: float(self.ego_acc_x, "EGO_Acc_x")?,
            ego_acc_y: float(self.ego_acc_y, "EGO_Acc_y")?,
            ego_heading: float(self.ego_heading, "EGO_Heading")?,
        })
    }
}

/// Load DGPS reference samples from a CSV file with named columns.
///
/// Required columns: `MCC_LeftRadar`, `MCC_RightRadar`, `TARGET_dist`,
/// `TARGET_distX`, `TARGET_distY`, `TARGET_AbsVel_x`, `TARGET_AbsVel_y`,
/// `TARGET_Heading`, `EGO_AbsVel_x`, `EGO_AbsVel_y`, `EGO_Acc_x`, `EGO_Acc_y`,
/// `EGO_Heading`. Extra columns are ignored.
pub fn load_references_csv<P: AsRef<Path>>(path: P) -> Result<ReferenceList> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(BufReader::new(file));

    let headers = reader.headers()?.clone();
    debug!("DGPS columns in {}: {:?}", path.display(), headers);

    let mut points = Vec::with_capacity(4096);
    for (idx, result) in reader.deserialize::<DgpsRecord>().enumerate() {
        points.push(result?.into_reference(idx + 1)?);
    }

    if points.is_empty() {
        return Err(LoaderError::EmptyFile(path.to_path_buf()));
    }

    let mut list = ReferenceList::new();
    list.extend_points(points);

    info!(
        "Loaded {} DGPS samples from {} (left MCC {:?}, right MCC {:?})",
        list.len(),
        path.display(),
        list.mcc_left_interval(),
        list.mcc_right_interval()
    );
    Ok(list)
}
