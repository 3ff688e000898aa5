//! Constant-velocity two-point extrapolation.

use super::collection::{CollectionError, Result};
use super::points::{DetectionPoint, TrackPoint};

/// Time between two consecutive clock cycles, in seconds.
///
/// Only finite, strictly positive values can be constructed.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct SamplingPeriod(f64);

impl SamplingPeriod {
    pub fn new(seconds: f64) -> Result<Self> {
        if seconds.is_finite() && seconds > 0.0 {
            Ok(Self(seconds))
        } else {
            Err(CollectionError::InvalidSamplingPeriod(seconds))
        }
    }

    #[inline]
    pub fn seconds(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for SamplingPeriod {
    type Error = CollectionError;

    fn try_from(seconds: f64) -> Result<Self> {
        Self::new(seconds)
    }
}

/// Anything with a position in the vehicle frame.
pub trait PlanarPosition {
    fn x(&self) -> f64;
    fn y(&self) -> f64;
}

impl PlanarPosition for DetectionPoint {
    fn x(&self) -> f64 {
        DetectionPoint::x(self)
    }

    fn y(&self) -> f64 {
        DetectionPoint::y(self)
    }
}

impl PlanarPosition for TrackPoint {
    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }
}

/// Project one sampling period beyond `end`, assuming `start` lies one period before it.
///
/// The spacing of the two inputs is not checked.
pub fn two_point_projection<A, B>(start: &A, end: &B, period: SamplingPeriod) -> TrackPoint
where
    A: PlanarPosition + ?Sized,
    B: PlanarPosition + ?Sized,
{
    TrackPoint::kinematic(
        2.0 * end.x() - start.x(),
        2.0 * end.y() - start.y(),
        (end.x() - start.x()) / period.seconds(),
        (end.y() - start.y()) / period.seconds(),
    )
}
