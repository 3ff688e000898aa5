//! Detection collections and their multi-attribute queries.

use std::collections::HashMap;

use super::collection::{Attribute, Columns, PointCollection, Result, TrackedPoint};
use super::criteria::{parse_attribute, BeamSet, Criterion, Predicate, Selector};
use super::interval::Interval;
use super::points::DetectionPoint;

/// Collection of RADAR detections.
pub type DetectionList = PointCollection<DetectionPoint>;

/// Interval-tracked attributes of a detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectionAttr {
    Mcc,
    X,
    Y,
    Range,
    Velocity,
    Azimuth,
    TrackId,
}

impl Attribute for DetectionAttr {
    fn name(self) -> &'static str {
        match self {
            DetectionAttr::Mcc => "mcc",
            DetectionAttr::X => "x",
            DetectionAttr::Y => "y",
            DetectionAttr::Range => "range",
            DetectionAttr::Velocity => "velocity",
            DetectionAttr::Azimuth => "azimuth",
            DetectionAttr::TrackId => "trackID",
        }
    }

    fn parse(key: &str) -> Option<Self> {
        match key {
            "mcc" => Some(DetectionAttr::Mcc),
            "x" => Some(DetectionAttr::X),
            "y" => Some(DetectionAttr::Y),
            "range" | "rng" => Some(DetectionAttr::Range),
            "velocity" | "vel" => Some(DetectionAttr::Velocity),
            "azimuth" | "az" => Some(DetectionAttr::Azimuth),
            "trackID" | "track_id" => Some(DetectionAttr::TrackId),
            _ => None,
        }
    }
}

impl TrackedPoint for DetectionPoint {
    type Attr = DetectionAttr;
    type Columns = DetectionColumns;

    const KIND: &'static str = "detection";
    const TRACKED: &'static [DetectionAttr] = &[
        DetectionAttr::Mcc,
        DetectionAttr::X,
        DetectionAttr::Y,
        DetectionAttr::Range,
        DetectionAttr::Velocity,
        DetectionAttr::Azimuth,
        DetectionAttr::TrackId,
    ];

    fn value(&self, attr: DetectionAttr) -> f64 {
        match attr {
            DetectionAttr::Mcc => self.mcc() as f64,
            DetectionAttr::X => self.x(),
            DetectionAttr::Y => self.y(),
            DetectionAttr::Range => self.range(),
            DetectionAttr::Velocity => self.velocity(),
            DetectionAttr::Azimuth => self.azimuth(),
            DetectionAttr::TrackId => self.track_id() as f64,
        }
    }

    fn beam(&self) -> Option<u8> {
        Some(DetectionPoint::beam(self))
    }
}

/// Selected detections as parallel arrays, one entry per matching point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionColumns {
    pub range: Vec<f64>,
    pub azimuth: Vec<f64>,
    pub velocity: Vec<f64>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub track_id: Vec<u32>,
    pub beam: Vec<u8>,
    pub mcc: Vec<i64>,
}

impl DetectionColumns {
    /// Column keys in output order.
    pub const KEYS: [&'static str; 8] = [
        "range", "azimuth", "velocity", "x", "y", "trackID", "beam", "mcc",
    ];

    #[inline]
    pub fn len(&self) -> usize {
        self.mcc.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mcc.is_empty()
    }
}

impl Columns<DetectionPoint> for DetectionColumns {
    fn push_point(&mut self, point: &DetectionPoint) {
        self.range.push(point.range());
        self.azimuth.push(point.azimuth());
        self.velocity.push(point.velocity());
        self.x.push(point.x());
        self.y.push(point.y());
        self.track_id.push(point.track_id());
        self.beam.push(point.beam());
        self.mcc.push(point.mcc());
    }
}

/// Bulk filter record, typically coming from a UI.
///
/// Unset fields (and an empty or missing beam set) mean "no restriction".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionSelection {
    pub beam: Option<BeamSet>,
    pub mcc: Criterion,
    pub x: Criterion,
    pub y: Criterion,
    pub range: Criterion,
    pub velocity: Criterion,
    pub azimuth: Criterion,
    pub track_id: Criterion,
}

impl DetectionSelection {
    fn beams(&self) -> BeamSet {
        match &self.beam {
            Some(set) if !set.is_empty() => set.clone(),
            _ => BeamSet::all(),
        }
    }

    fn criteria(&self) -> [(DetectionAttr, Criterion); 7] {
        [
            (DetectionAttr::Mcc, self.mcc),
            (DetectionAttr::X, self.x),
            (DetectionAttr::Y, self.y),
            (DetectionAttr::Range, self.range),
            (DetectionAttr::Velocity, self.velocity),
            (DetectionAttr::Azimuth, self.azimuth),
            (DetectionAttr::TrackId, self.track_id),
        ]
    }
}

/// Per-attribute detection criteria.
///
/// When `selection` is present it replaces every per-attribute field: its unset
/// fields fall back to the tracked intervals, never to the fields of this query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionQuery {
    /// Allowed beams; `None` means all of [`ALL_BEAMS`](super::criteria::ALL_BEAMS).
    pub beam: Option<BeamSet>,
    pub mcc: Criterion,
    pub x: Criterion,
    pub y: Criterion,
    pub range: Criterion,
    pub velocity: Criterion,
    pub azimuth: Criterion,
    pub track_id: Criterion,
    pub selection: Option<DetectionSelection>,
}

impl DetectionQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `(key, values)` pairs such as `("mcc", [100, 200])` or `("beam", [0, 1])`.
    ///
    /// Fails on the first unknown key or malformed value list; nothing is
    /// evaluated until every pair parsed.
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
            let attr = parse_attribute::<DetectionPoint>(key)?;
            let criterion = Criterion::from_values(key, values)?;
            query = query.with(attr, criterion);
        }
        Ok(query)
    }

    /// Set the criterion of one attribute.
    pub fn with(mut self, attr: DetectionAttr, criterion: impl Into<Criterion>) -> Self {
        let criterion = criterion.into();
        match attr {
            DetectionAttr::Mcc => self.mcc = criterion,
            DetectionAttr::X => self.x = criterion,
            DetectionAttr::Y => self.y = criterion,
            DetectionAttr::Range => self.range = criterion,
            DetectionAttr::Velocity => self.velocity = criterion,
            DetectionAttr::Azimuth => self.azimuth = criterion,
            DetectionAttr::TrackId => self.track_id = criterion,
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

    pub fn mcc(self, criterion: impl Into<Criterion>) -> Self {
        self.with(DetectionAttr::Mcc, criterion)
    }

    pub fn x(self, criterion: impl Into<Criterion>) -> Self {
        self.with(DetectionAttr::X, criterion)
    }

    pub fn y(self, criterion: impl Into<Criterion>) -> Self {
        self.with(DetectionAttr::Y, criterion)
    }

    pub fn range(self, criterion: impl Into<Criterion>) -> Self {
        self.with(DetectionAttr::Range, criterion)
    }

    pub fn velocity(self, criterion: impl Into<Criterion>) -> Self {
        self.with(DetectionAttr::Velocity, criterion)
    }

    pub fn azimuth(self, criterion: impl Into<Criterion>) -> Self {
        self.with(DetectionAttr::Azimuth, criterion)
    }

    pub fn track_id(self, criterion: impl Into<Criterion>) -> Self {
        self.with(DetectionAttr::TrackId, criterion)
    }

    pub fn selection(mut self, selection: DetectionSelection) -> Self {
        self.selection = Some(selection);
        self
    }

    fn criteria(&self) -> [(DetectionAttr, Criterion); 7] {
        [
            (DetectionAttr::Mcc, self.mcc),
            (DetectionAttr::X, self.x),
            (DetectionAttr::Y, self.y),
            (DetectionAttr::Range, self.range),
            (DetectionAttr::Velocity, self.velocity),
            (DetectionAttr::Azimuth, self.azimuth),
            (DetectionAttr::TrackId, self.track_id),
        ]
    }
}

impl Selector<DetectionPoint> for DetectionQuery {
    fn resolve(&self, source: &DetectionList) -> Predicate<DetectionAttr> {
        let (beams, criteria) = match &self.selection {
            Some(bundle) => (bundle.beams(), bundle.criteria()),
            None => (self.beam.clone().unwrap_or_default(), self.criteria()),
        };
        criteria
            .iter()
            .fold(Predicate::with_beams(beams), |predicate, (attr, criterion)| {
                predicate.with_bound(*attr, criterion.resolve(source.interval(*attr)))
            })
    }

    /// Merging never filters on track id.
    fn resolve_for_merge(&self, source: &DetectionList) -> Predicate<DetectionAttr> {
        self.resolve(source).without(DetectionAttr::TrackId)
    }
}

impl Selector<DetectionPoint> for DetectionSelection {
    fn resolve(&self, source: &DetectionList) -> Predicate<DetectionAttr> {
        DetectionQuery::new().selection(self.clone()).resolve(source)
    }

    fn resolve_for_merge(&self, source: &DetectionList) -> Predicate<DetectionAttr> {
        self.resolve(source).without(DetectionAttr::TrackId)
    }
}

impl PointCollection<DetectionPoint> {
    /// MCC range as integers.
    pub fn mcc_interval(&self) -> (i64, i64) {
        self.interval(DetectionAttr::Mcc).as_i64()
    }

    pub fn x_interval(&self) -> Interval {
        self.interval(DetectionAttr::X)
    }

    pub fn y_interval(&self) -> Interval {
        self.interval(DetectionAttr::Y)
    }

    pub fn range_interval(&self) -> Interval {
        self.interval(DetectionAttr::Range)
    }

    pub fn velocity_interval(&self) -> Interval {
        self.interval(DetectionAttr::Velocity)
    }

    pub fn azimuth_interval(&self) -> Interval {
        self.interval(DetectionAttr::Azimuth)
    }

    pub fn track_id_interval(&self) -> (i64, i64) {
        self.interval(DetectionAttr::TrackId).as_i64()
    }

    /// The busiest clock cycle as `(count, mcc)`.
    ///
    /// Ties go to the cycle that was appended first. `None` when empty.
    pub fn max_detections_per_mcc(&self) -> Option<(usize, i64)> {
        let mut counts: HashMap<i64, usize> = HashMap::new();
        for det in self.iter() {
            *counts.entry(det.mcc()).or_insert(0) += 1;
        }

        let mut best: Option<(usize, i64)> = None;
        for det in self.iter() {
            let count = counts[&det.mcc()];
            if best.map_or(true, |(c, _)| count > c) {
                best = Some((count, det.mcc()));
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::collection::CollectionError;
    use crate::core::points::{RawDetection, SensorMount};

    fn det(mcc: i64, beam: u8, track_id: u32, range: f64, velocity: f64, azimuth: f64) -> DetectionPoint {
        DetectionPoint::new(
            RawDetection {
                mcc,
                beam,
                detections_in_cycle: 1,
                track_id,
                range,
                velocity,
                azimuth,
            },
            SensorMount::right(2.0),
        )
    }

    fn sample_list() -> DetectionList {
        vec![
            det(100, 0, 0, 10.0, -1.0, 0.10),
            det(101, 1, 2, 12.0, -0.5, 0.20),
            det(101, 2, 2, 8.0, 0.0, -0.10),
            det(103, 3, 0, 20.0, 1.5, 0.30),
            det(104, 1, 5, 15.0, 2.0, -0.25),
        ]
        .into_iter()
        .collect()
    }

    fn satisfies(query: &DetectionQuery, list: &DetectionList, d: &DetectionPoint) -> bool {
        query.resolve(list).matches(d)
    }

    #[test]
    fn test_tracked_intervals() {
        let list = sample_list();
        assert_eq!(list.mcc_interval(), (100, 104));
        assert_eq!(list.range_interval(), Interval::new(8.0, 20.0));
        assert_eq!(list.velocity_interval(), Interval::new(-1.0, 2.0));
        assert_eq!(list.azimuth_interval(), Interval::new(-0.25, 0.30));
        assert_eq!(list.track_id_interval(), (0, 5));
        let xs: Vec<f64> = list.iter().map(|d| d.x()).collect();
        assert_eq!(list.x_interval(), Interval::from_values(xs).unwrap());
    }

    #[test]
    fn test_select_without_criteria_returns_everything() {
        let list = sample_list();
        let all = list.select(&DetectionQuery::new());
        assert_eq!(all.len(), list.len());
        for (selected, original) in all.iter().zip(list.iter()) {
            assert_eq!(*selected, original);
        }
    }

    #[test]
    fn test_select_is_sound_and_complete() {
        let list = sample_list();
        let query = DetectionQuery::new()
            .mcc((101_i64, 104_i64))
            .velocity(-0.5..=1.5)
            .beams([1, 2, 3]);

        let selected = list.select(&query);
        let mccs: Vec<i64> = selected.iter().map(|d| d.mcc()).collect();
        assert_eq!(mccs, vec![101, 101, 103]);

        for d in list.iter() {
            let in_result = selected.iter().any(|s| std::ptr::eq(*s, d));
            assert_eq!(in_result, satisfies(&query, &list, d));
        }
    }

    #[test]
    fn test_scalar_equals_degenerate_range() {
        let list = sample_list();
        for d in list.iter() {
            let scalar = list.select(&DetectionQuery::new().range(d.range()));
            let range = list.select(&DetectionQuery::new().range((d.range(), d.range())));
            assert_eq!(scalar, range);
            assert!(!scalar.is_empty());
        }
        let by_mcc = list.select(&DetectionQuery::new().mcc(101_i64));
        assert_eq!(by_mcc.len(), 2);
    }

    #[test]
    fn test_inverted_range_selects_nothing() {
        let list = sample_list();
        let none = list.select(&DetectionQuery::new().mcc((104_i64, 100_i64)));
        assert!(none.is_empty());
    }

    #[test]
    fn test_beam_set_membership() {
        let list = sample_list();
        let beam_one = list.select(&DetectionQuery::new().beams([1]));
        assert_eq!(beam_one.len(), 2);
        assert!(beam_one.iter().all(|d| d.beam() == 1));

        let nothing = list.select(&DetectionQuery::new().beams(Vec::new()));
        assert!(nothing.is_empty());
    }

    #[test]
    fn test_track_id_filters_plain_selection() {
        let list = sample_list();
        let assigned = list.select(&DetectionQuery::new().track_id(2_i64));
        assert_eq!(assigned.len(), 2);
        assert!(assigned.iter().all(|d| d.track_id() == 2));
    }

    #[test]
    fn test_selection_bundle_overrides_individual_criteria() {
        let list = sample_list();
        let bundle = DetectionSelection {
            beam: Some(BeamSet::new([1])),
            ..Default::default()
        };
        let combined = DetectionQuery::new()
            .mcc(100_i64)
            .range((0.0, 9.0))
            .selection(bundle.clone());

        let from_combined = list.select(&combined);
        let from_bundle = list.select(&bundle);
        assert_eq!(from_combined, from_bundle);
        // mcc=100 and range<=9 would each have excluded both beam-1 detections.
        assert_eq!(from_bundle.len(), 2);
    }

    #[test]
    fn test_bundle_empty_beam_set_means_all() {
        let list = sample_list();
        let bundle = DetectionSelection {
            beam: Some(BeamSet::new(Vec::new())),
            ..Default::default()
        };
        assert_eq!(list.select(&bundle).len(), list.len());
    }

    #[test]
    fn test_columns_follow_selection() {
        let list = sample_list();
        let query = DetectionQuery::new().beams([1, 3]);
        let points = list.select(&query);
        let columns = list.select_columns(&query);

        assert_eq!(columns.len(), points.len());
        assert_eq!(columns.mcc, vec![101, 103, 104]);
        assert_eq!(columns.beam, vec![1, 3, 1]);
        assert_eq!(columns.track_id, vec![2, 0, 5]);
        for (i, p) in points.iter().enumerate() {
            assert_eq!(columns.range[i], p.range());
            assert_eq!(columns.azimuth[i], p.azimuth());
            assert_eq!(columns.velocity[i], p.velocity());
            assert_eq!(columns.x[i], p.x());
            assert_eq!(columns.y[i], p.y());
        }
        assert_eq!(DetectionColumns::KEYS.len(), 8);
    }

    #[test]
    fn test_empty_list_selects_empty_result() {
        let list = DetectionList::new();
        assert!(list.select(&DetectionQuery::new().mcc(5_i64)).is_empty());
        let columns = list.select_columns(&DetectionQuery::new().beams([0]));
        assert!(columns.is_empty());
        assert_eq!(columns, DetectionColumns::default());
        assert_eq!(list.max_detections_per_mcc(), None);
    }

    #[test]
    fn test_from_pairs() {
        let query = DetectionQuery::from_pairs(vec![
            ("mcc", vec![100.0, 101.0]),
            ("rng", vec![12.0]),
            ("beam", vec![1.0, 2.0]),
        ])
        .unwrap();
        assert_eq!(query.mcc, Criterion::Range(100.0, 101.0));
        assert_eq!(query.range, Criterion::Scalar(12.0));
        assert_eq!(query.beam, Some(BeamSet::new([1, 2])));

        let list = sample_list();
        let selected = list.select(&query);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].mcc(), 101);
    }

    #[test]
    fn test_from_pairs_rejects_unknown_attribute() {
        let err = DetectionQuery::from_pairs(vec![("heading", vec![1.0])]).unwrap_err();
        assert_eq!(
            err,
            CollectionError::UnknownAttributeCriterion {
                key: "heading".to_string(),
                point_type: "detection",
            }
        );
    }

    #[test]
    fn test_from_pairs_rejects_malformed_shape() {
        let err = DetectionQuery::from_pairs(vec![("x", vec![1.0, 2.0, 3.0])]).unwrap_err();
        assert!(matches!(
            err,
            CollectionError::MalformedCriterionShape { ref attribute, .. } if attribute == "x"
        ));
    }

    #[test]
    fn test_from_pairs_rejects_empty_value_list() {
        let err = DetectionQuery::from_pairs(vec![("mcc", Vec::<f64>::new())]).unwrap_err();
        assert!(matches!(
            err,
            CollectionError::MalformedCriterionShape { ref attribute, .. } if attribute == "mcc"
        ));
    }

    #[test]
    fn test_extend_with_selection_merges_matches_in_order() {
        let source: DetectionList = vec![
            det(10, 0, 0, 5.0, 0.0, 0.0),
            det(30, 1, 0, 6.0, 0.0, 0.0),
            det(20, 2, 0, 7.0, 0.0, 0.0),
        ]
        .into_iter()
        .collect();
        let mut target = DetectionList::new();

        let added = target.extend_with_selection(&source, &DetectionQuery::new().mcc((15_i64, 30_i64)));
        assert_eq!(added, 2);
        let mccs: Vec<i64> = target.iter().map(|d| d.mcc()).collect();
        assert_eq!(mccs, vec![30, 20]);
        assert_eq!(target.mcc_interval(), (20, 30));
    }

    #[test]
    fn test_extend_with_selection_ignores_track_id() {
        let source = sample_list();
        let mut target = DetectionList::new();
        let query = DetectionQuery::new().track_id(999_i64);

        // Plain selection honours the track id, merging does not.
        assert!(source.select(&query).is_empty());
        let added = target.extend_with_selection(&source, &query);
        assert_eq!(added, source.len());
    }

    #[test]
    fn test_extend_with_selection_bundle_wins_and_ignores_track_id() {
        let source = sample_list();
        let bundle = DetectionSelection {
            beam: Some(BeamSet::new([1])),
            track_id: Criterion::Scalar(2.0),
            ..Default::default()
        };
        assert_eq!(source.select(&bundle).len(), 1);

        let mut from_bundle = DetectionList::new();
        assert_eq!(from_bundle.extend_with_selection(&source, &bundle), 2);

        // Per-attribute mcc would exclude every beam-1 detection.
        let combined = DetectionQuery::new().mcc(100_i64).selection(bundle);
        let mut from_combined = DetectionList::new();
        assert_eq!(from_combined.extend_with_selection(&source, &combined), 2);

        let mccs: Vec<i64> = from_combined.iter().map(|d| d.mcc()).collect();
        assert_eq!(mccs, vec![101, 104]);
        assert_eq!(from_combined.as_slice(), from_bundle.as_slice());
        assert_eq!(from_combined.track_id_interval(), (2, 5));
    }

    #[test]
    fn test_extend_with_selection_defaults_come_from_source() {
        let source = sample_list();
        let mut target: DetectionList = vec![det(1, 0, 0, 1.0, 0.0, 0.0)].into_iter().collect();
        let added = target.extend_with_selection(&source, &DetectionQuery::new());
        assert_eq!(added, source.len());
        assert_eq!(target.mcc_interval(), (1, 104));
        assert_eq!(target.range_interval(), Interval::new(1.0, 20.0));
    }

    #[test]
    fn test_max_detections_per_mcc() {
        let list = sample_list();
        assert_eq!(list.max_detections_per_mcc(), Some((2, 101)));

        let tied: DetectionList = vec![
            det(7, 0, 0, 1.0, 0.0, 0.0),
            det(3, 0, 0, 1.0, 0.0, 0.0),
            det(3, 0, 0, 1.0, 0.0, 0.0),
            det(7, 0, 0, 1.0, 0.0, 0.0),
        ]
        .into_iter()
        .collect();
        assert_eq!(tied.max_detections_per_mcc(), Some((2, 7)));
    }
}
