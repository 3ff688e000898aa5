//! Visualization tools for selected detections.
//!
//! Renders a bird's-eye scatter plot (x forward, y lateral) of left and right
//! sensor detections using the plotters library, optionally overlaid with the
//! DGPS target track.

use std::path::Path;

use log::info;
use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use thiserror::Error;

use crate::core::detections::DetectionColumns;
use crate::core::references::ReferenceColumns;

/// Errors that can occur during visualization.
#[derive(Error, Debug)]
pub enum VisualizationError {
    #[error("Plotting error: {0}")]
    PlottingError(String),

    #[error("Nothing selected to plot")]
    EmptySelection,
}

/// Result type for visualization operations.
pub type Result<T> = std::result::Result<T, VisualizationError>;

/// Default plot width in pixels.
const DEFAULT_WIDTH: u32 = 1920;

/// Default plot height in pixels.
const DEFAULT_HEIGHT: u32 = 1080;

/// One color per beam, indexed by beam number.
const BEAM_COLORS: &[(u8, u8, u8)] = &[
    (228, 26, 28),  // Red
    (55, 126, 184), // Blue
    (77, 175, 74),  // Green
    (255, 127, 0),  // Orange
];

/// Color of beams outside the palette.
const OTHER_BEAM_COLOR: (u8, u8, u8) = (153, 153, 153);

/// DGPS target markers.
const TARGET_COLOR: (u8, u8, u8) = (0, 0, 0);

const MARKER_SIZE: i32 = 4;

/// What to draw: either sensor may be missing, targets are optional.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetectionPlot<'a> {
    pub left: Option<&'a DetectionColumns>,
    pub right: Option<&'a DetectionColumns>,
    pub targets: Option<&'a ReferenceColumns>,
    /// Added to every target x before drawing
    pub target_x_offset: f64,
}

impl DetectionPlot<'_> {
    fn detections(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.left
            .into_iter()
            .chain(self.right)
            .flat_map(|cols| cols.x.iter().copied().zip(cols.y.iter().copied()))
    }

    fn target_positions(&self) -> Vec<(f64, f64)> {
        self.targets
            .map(|cols| {
                cols.target_dist_x
                    .iter()
                    .zip(cols.target_dist_y.iter())
                    .map(|(x, y)| (x + self.target_x_offset, *y))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Total number of markers.
    pub fn len(&self) -> usize {
        self.left.map_or(0, DetectionColumns::len)
            + self.right.map_or(0, DetectionColumns::len)
            + self.targets.map_or(0, ReferenceColumns::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn beam_color(beam: u8) -> RGBColor {
    let (r, g, b) = BEAM_COLORS
        .get(beam as usize)
        .copied()
        .unwrap_or(OTHER_BEAM_COLOR);
    RGBColor(r, g, b)
}

/// Plot detections (x vs y) and save as PNG.
///
/// Left sensor detections are drawn as circles, right sensor detections as
/// triangles, both colored by beam. DGPS targets are drawn as black crosses.
///
/// # Arguments
///
/// * `output_path` - Path to save the PNG image
/// * `plot` - The selected columns to draw
/// * `_title` - Title for the plot (unused, the bitmap backend draws no text)
pub fn plot_detections(output_path: &Path, plot: &DetectionPlot<'_>, _title: &str) -> Result<()> {
    if plot.is_empty() {
        return Err(VisualizationError::EmptySelection);
    }

    let targets = plot.target_positions();
    let (x_min, x_max, y_min, y_max) =
        compute_bounds(plot.detections().chain(targets.iter().copied()));
    let x_padding = (x_max - x_min) * 0.05;
    let y_padding = (y_max - y_min) * 0.05;

    let root = BitMapBackend::new(output_path, (DEFAULT_WIDTH, DEFAULT_HEIGHT)).into_drawing_area();

    root.fill(&WHITE)
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .build_cartesian_2d(
            (x_min - x_padding)..(x_max + x_padding),
            (y_min - y_padding)..(y_max + y_padding),
        )
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .draw()
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    if let Some(left) = plot.left {
        chart
            .draw_series(
                left.x
                    .iter()
                    .zip(left.y.iter())
                    .zip(left.beam.iter())
                    .map(|((x, y), beam)| Circle::new((*x, *y), MARKER_SIZE, beam_color(*beam).filled())),
            )
            .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;
    }

    if let Some(right) = plot.right {
        chart
            .draw_series(right.x.iter().zip(right.y.iter()).zip(right.beam.iter()).map(
                |((x, y), beam)| TriangleMarker::new((*x, *y), MARKER_SIZE, beam_color(*beam).filled()),
            ))
            .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;
    }

    if !targets.is_empty() {
        let (r, g, b) = TARGET_COLOR;
        chart
            .draw_series(
                targets
                    .iter()
                    .map(|(x, y)| Cross::new((*x, *y), MARKER_SIZE, RGBColor(r, g, b).stroke_width(2))),
            )
            .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;
    }

    root.present()
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    info!("Plotted {} markers to {}", plot.len(), output_path.display());
    Ok(())
}

/// Compute the bounds (min/max) for x and y coordinates.
///
/// Degenerate extents are widened by one meter on each side.
fn compute_bounds<I>(points: I) -> (f64, f64, f64, f64)
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let mut x_min = f64::MAX;
    let mut x_max = f64::MIN;
    let mut y_min = f64::MAX;
    let mut y_max = f64::MIN;

    for (x, y) in points {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    if (x_max - x_min).abs() < f64::EPSILON {
        x_min -= 1.0;
        x_max += 1.0;
    }
    if (y_max - y_min).abs() < f64::EPSILON {
        y_min -= 1.0;
        y_max += 1.0;
    }

    (x_min, x_max, y_min, y_max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn columns(xs: &[f64], ys: &[f64]) -> DetectionColumns {
        DetectionColumns {
            x: xs.to_vec(),
            y: ys.to_vec(),
            beam: vec![0; xs.len()],
            mcc: vec![0; xs.len()],
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_selection_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.png");
        let empty = DetectionColumns::default();
        let plot = DetectionPlot {
            left: Some(&empty),
            ..Default::default()
        };
        assert!(matches!(
            plot_detections(&path, &plot, "empty"),
            Err(VisualizationError::EmptySelection)
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_plot_collects_both_sensors_and_targets() {
        let left = columns(&[1.0, 2.0], &[-1.0, -2.0]);
        let right = columns(&[3.0], &[1.5]);
        let targets = ReferenceColumns {
            mcc_left: vec![1],
            target_dist_x: vec![10.0],
            target_dist_y: vec![0.5],
            ..Default::default()
        };
        let plot = DetectionPlot {
            left: Some(&left),
            right: Some(&right),
            targets: Some(&targets),
            target_x_offset: -2.0,
        };
        assert_eq!(plot.len(), 4);
        assert_eq!(plot.detections().count(), 3);
        assert_eq!(plot.target_positions(), vec![(8.0, 0.5)]);
    }

    #[test]
    fn test_compute_bounds() {
        let bounds = compute_bounds(vec![(1.0, -2.0), (4.0, 3.0), (2.0, 0.0)]);
        assert_eq!(bounds, (1.0, 4.0, -2.0, 3.0));
    }

    #[test]
    fn test_compute_bounds_single_point_is_widened() {
        let bounds = compute_bounds(vec![(5.0, 5.0)]);
        assert_eq!(bounds, (4.0, 6.0, 4.0, 6.0));
    }

    #[test]
    fn test_beam_palette() {
        assert_eq!(beam_color(1), RGBColor(55, 126, 184));
        assert_eq!(beam_color(9), RGBColor(153, 153, 153));
    }
}
