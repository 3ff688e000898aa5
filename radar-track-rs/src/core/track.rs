//! Confirmed tracks: a collection of track samples plus a prediction slot.

use super::collection::{Attribute, Columns, PointCollection, Result, TrackedPoint};
use super::criteria::{parse_attribute, BeamSet, Criterion, Predicate, Selector};
use super::interval::Interval;
use super::points::{DetectionPoint, TrackPoint};
use super::projection::{two_point_projection, PlanarPosition, SamplingPeriod};

/// Interval-tracked attributes of a track sample.
///
/// `dx`/`dy` are intentionally absent; their extents are not maintained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackAttr {
    Mcc,
    X,
    Y,
    Velocity,
    Azimuth,
}

impl Attribute for TrackAttr {
    fn name(self) -> &'static str {
        match self {
            TrackAttr::Mcc => "mcc",
            TrackAttr::X => "x",
            TrackAttr::Y => "y",
            TrackAttr::Velocity => "velocity",
            TrackAttr::Azimuth => "azimuth",
        }
    }

    fn parse(key: &str) -> Option<Self> {
        match key {
            "mcc" => Some(TrackAttr::Mcc),
            "x" => Some(TrackAttr::X),
            "y" => Some(TrackAttr::Y),
            "velocity" | "vel" => Some(TrackAttr::Velocity),
            "azimuth" | "az" => Some(TrackAttr::Azimuth),
            _ => None,
        }
    }
}

impl TrackedPoint for TrackPoint {
    type Attr = TrackAttr;
    type Columns = TrackColumns;

    const KIND: &'static str = "track";
    const TRACKED: &'static [TrackAttr] = &[
        TrackAttr::Mcc,
        TrackAttr::X,
        TrackAttr::Y,
        TrackAttr::Velocity,
        TrackAttr::Azimuth,
    ];

    fn value(&self, attr: TrackAttr) -> f64 {
        match attr {
            TrackAttr::Mcc => self.mcc as f64,
            TrackAttr::X => self.x,
            TrackAttr::Y => self.y,
            TrackAttr::Velocity => self.velocity,
            TrackAttr::Azimuth => self.azimuth,
        }
    }

    fn beam(&self) -> Option<u8> {
        Some(self.beam)
    }
}

/// Selected track samples as parallel arrays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackColumns {
    pub mcc: Vec<i64>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub dx: Vec<f64>,
    pub dy: Vec<f64>,
    pub azimuth: Vec<f64>,
    pub velocity: Vec<f64>,
    pub beam: Vec<u8>,
}

impl TrackColumns {
    #[inline]
    pub fn len(&self) -> usize {
        self.mcc.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mcc.is_empty()
    }
}

impl Columns<TrackPoint> for TrackColumns {
    fn push_point(&mut self, p: &TrackPoint) {
        self.mcc.push(p.mcc);
        self.x.push(p.x);
        self.y.push(p.y);
        self.dx.push(p.dx);
        self.dy.push(p.dy);
        self.azimuth.push(p.azimuth);
        self.velocity.push(p.velocity);
        self.beam.push(p.beam);
    }
}

/// Criteria on track samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackQuery {
    pub beam: Option<BeamSet>,
    pub mcc: Criterion,
    pub x: Criterion,
    pub y: Criterion,
    pub velocity: Criterion,
    pub azimuth: Criterion,
}

impl TrackQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, attr: TrackAttr, criterion: impl Into<Criterion>) -> Self {
        let criterion = criterion.into();
        match attr {
            TrackAttr::Mcc => self.mcc = criterion,
            TrackAttr::X => self.x = criterion,
            TrackAttr::Y => self.y = criterion,
            TrackAttr::Velocity => self.velocity = criterion,
            TrackAttr::Azimuth => self.azimuth = criterion,
        }
        self
    }

    pub fn beams<I>(mut self, beams: I) -> Self
    where
        I: IntoIterator<Item = u8>,
    {
        self.beam = Some(BeamSet::new(beams));
        self
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<[f64]>,
    {
        let mut query = Self::default();
        for (key, values) in pairs {
            let key = key.as_ref();
            let values = values.as_ref();
            if key == "beam" {
                query.beam = Some(BeamSet::from_values(values)?);
                continue;
            }
            let attr = parse_attribute::<TrackPoint>(key)?;
            query = query.with(attr, Criterion::from_values(key, values)?);
        }
        Ok(query)
    }
}

impl Selector<TrackPoint> for TrackQuery {
    fn resolve(&self, source: &PointCollection<TrackPoint>) -> Predicate<TrackAttr> {
        [
            (TrackAttr::Mcc, self.mcc),
            (TrackAttr::X, self.x),
            (TrackAttr::Y, self.y),
            (TrackAttr::Velocity, self.velocity),
            (TrackAttr::Azimuth, self.azimuth),
        ]
        .iter()
        .fold(
            Predicate::with_beams(self.beam.clone().unwrap_or_default()),
            |predicate, (attr, criterion)| {
                predicate.with_bound(*attr, criterion.resolve(source.interval(*attr)))
            },
        )
    }
}

/// A time-ordered sequence of samples believed to belong to one target.
#[derive(Debug, Clone)]
pub struct Track {
    id: u32,
    points: PointCollection<TrackPoint>,
    prediction: TrackPoint,
}

impl Track {
    /// Empty track with a zero-valued prediction.
    pub fn new(id: u32) -> Self {
        Self {
            id,
            points: PointCollection::new(),
            prediction: TrackPoint::default(),
        }
    }

    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Read-only view of the samples and their intervals.
    #[inline]
    pub fn points(&self) -> &PointCollection<TrackPoint> {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn push(&mut self, point: TrackPoint) {
        self.points.push(point);
    }

    /// Append a sample taken over from `detection`.
    pub fn push_detection(&mut self, detection: &DetectionPoint) {
        self.points.push(TrackPoint::from_detection(detection));
    }

    pub fn select(&self, query: &TrackQuery) -> Vec<&TrackPoint> {
        self.points.select(query)
    }

    pub fn select_columns(&self, query: &TrackQuery) -> TrackColumns {
        self.points.select_columns(query)
    }

    pub fn prediction(&self) -> &TrackPoint {
        &self.prediction
    }

    /// Replace the prediction. No validation, no history.
    pub fn set_prediction(&mut self, prediction: TrackPoint) {
        self.prediction = prediction;
    }

    pub fn mcc_interval(&self) -> (i64, i64) {
        self.points.interval(TrackAttr::Mcc).as_i64()
    }

    pub fn x_interval(&self) -> Interval {
        self.points.interval(TrackAttr::X)
    }

    pub fn y_interval(&self) -> Interval {
        self.points.interval(TrackAttr::Y)
    }

    pub fn velocity_interval(&self) -> Interval {
        self.points.interval(TrackAttr::Velocity)
    }

    pub fn azimuth_interval(&self) -> Interval {
        self.points.interval(TrackAttr::Azimuth)
    }

    /// Constant-velocity projection one `period` beyond `end`.
    pub fn two_point_projection<A, B>(&self, start: &A, end: &B, period: SamplingPeriod) -> TrackPoint
    where
        A: PlanarPosition + ?Sized,
        B: PlanarPosition + ?Sized,
    {
        two_point_projection(start, end, period)
    }
}
