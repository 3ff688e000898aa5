//! Pool of detections not yet assigned to any track.

use super::collection::Result;
use super::criteria::Selector;
use super::detections::DetectionList;
use super::points::{DetectionPoint, TrackPoint};
use super::projection::{two_point_projection, SamplingPeriod};

/// Detections awaiting assignment, sampled at a fixed period.
#[derive(Debug, Clone)]
pub struct UnassignedDetections {
    detections: DetectionList,
    sampling_period: SamplingPeriod,
}

impl UnassignedDetections {
    /// Fails with `InvalidSamplingPeriod` unless `sampling_period` is finite and positive.
    pub fn new(sampling_period: f64) -> Result<Self> {
        Ok(Self::with_period(SamplingPeriod::new(sampling_period)?))
    }

    pub fn with_period(sampling_period: SamplingPeriod) -> Self {
        Self {
            detections: DetectionList::new(),
            sampling_period,
        }
    }

    #[inline]
    pub fn sampling_period(&self) -> SamplingPeriod {
        self.sampling_period
    }

    #[inline]
    pub fn detections(&self) -> &DetectionList {
        &self.detections
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.detections.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    pub fn push(&mut self, detection: DetectionPoint) {
        self.detections.push(detection);
    }

    /// Pull matching detections out of a full sensor list.
    pub fn extend_with_selection<S>(&mut self, source: &DetectionList, selector: &S) -> usize
    where
        S: Selector<DetectionPoint> + ?Sized,
    {
        self.detections.extend_with_selection(source, selector)
    }

    /// Constant-velocity projection one sampling period beyond `end`.
    pub fn two_point_projection(&self, start: &DetectionPoint, end: &DetectionPoint) -> TrackPoint {
        two_point_projection(start, end, self.sampling_period)
    }
}
