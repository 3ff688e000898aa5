//! Selection criteria and the predicates they resolve to.
//!
//! A criterion is either unset (fall back to the collection's tracked interval),
//! a scalar (degenerate interval) or a closed `[lo, hi]` range. Beams are matched
//! by set membership instead of by interval.

use std::ops::RangeInclusive;

use super::collection::{Attribute, CollectionError, PointCollection, Result, TrackedPoint};
use super::interval::Interval;

/// Beam ids a RADAR reports.
pub const ALL_BEAMS: [u8; 4] = [0, 1, 2, 3];

/// Restriction on a single numeric attribute.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Criterion {
    /// No restriction: the attribute's tracked interval is used.
    #[default]
    Unset,
    /// Exact value, treated as `[v, v]`.
    Scalar(f64),
    /// Closed range. `lo > hi` is accepted and matches nothing.
    Range(f64, f64),
}

impl Criterion {
    pub fn range(lo: f64, hi: f64) -> Self {
        Criterion::Range(lo, hi)
    }

    /// Build from a slice of values: one value is a scalar, two values are
    /// `[lo, hi]`. Any other length is rejected.
    pub fn from_values(attribute: &str, values: &[f64]) -> Result<Self> {
        match *values {
            [v] => Ok(Criterion::Scalar(v)),
            [lo, hi] => Ok(Criterion::Range(lo, hi)),
            _ => Err(CollectionError::MalformedCriterionShape {
                attribute: attribute.to_string(),
                reason: format!(
                    "expected a scalar or a [lo, hi] pair, got {} values",
                    values.len()
                ),
            }),
        }
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        !matches!(self, Criterion::Unset)
    }

    /// Interval to test against, given the attribute's tracked interval.
    pub fn resolve(&self, tracked: Interval) -> Interval {
        match *self {
            Criterion::Unset => tracked,
            Criterion::Scalar(v) => Interval::point(v),
            Criterion::Range(lo, hi) => Interval::new(lo, hi),
        }
    }
}

impl From<f64> for Criterion {
    fn from(value: f64) -> Self {
        Criterion::Scalar(value)
    }
}

impl From<i64> for Criterion {
    fn from(value: i64) -> Self {
        Criterion::Scalar(value as f64)
    }
}

impl From<(f64, f64)> for Criterion {
    fn from((lo, hi): (f64, f64)) -> Self {
        Criterion::Range(lo, hi)
    }
}

impl From<(i64, i64)> for Criterion {
    fn from((lo, hi): (i64, i64)) -> Self {
        Criterion::Range(lo as f64, hi as f64)
    }
}

impl From<RangeInclusive<f64>> for Criterion {
    fn from(range: RangeInclusive<f64>) -> Self {
        let (lo, hi) = range.into_inner();
        Criterion::Range(lo, hi)
    }
}

impl From<Interval> for Criterion {
    fn from(interval: Interval) -> Self {
        Criterion::Range(interval.lo, interval.hi)
    }
}

/// Set of allowed beam ids, kept sorted and free of duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeamSet {
    beams: Vec<u8>,
}

impl BeamSet {
    pub fn new<I>(beams: I) -> Self
    where
        I: IntoIterator<Item = u8>,
    {
        let mut beams: Vec<u8> = beams.into_iter().collect();
        beams.sort_unstable();
        beams.dedup();
        Self { beams }
    }

    /// The full fixed set `{0, 1, 2, 3}`.
    pub fn all() -> Self {
        Self::new(ALL_BEAMS)
    }

    /// Parse numeric values into beam ids; each must be a whole number in `0..=255`.
    pub fn from_values(values: &[f64]) -> Result<Self> {
        let mut beams = Vec::with_capacity(values.len());
        for &v in values {
            if v.fract() != 0.0 || !(0.0..=u8::MAX as f64).contains(&v) {
                return Err(CollectionError::MalformedCriterionShape {
                    attribute: "beam".to_string(),
                    reason: format!("{} is not a valid beam id", v),
                });
            }
            beams.push(v as u8);
        }
        Ok(Self::new(beams))
    }

    #[inline]
    pub fn contains(&self, beam: u8) -> bool {
        self.beams.binary_search(&beam).is_ok()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.beams.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.beams
    }
}

impl Default for BeamSet {
    fn default() -> Self {
        Self::all()
    }
}

impl FromIterator<u8> for BeamSet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Fully resolved conjunction of closed-interval tests plus an optional beam set.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate<A> {
    bounds: Vec<(A, Interval)>,
    beams: Option<BeamSet>,
}

impl<A: Attribute> Predicate<A> {
    /// Predicate restricting beams to `beams`.
    pub fn with_beams(beams: BeamSet) -> Self {
        Self {
            bounds: Vec::new(),
            beams: Some(beams),
        }
    }

    /// Predicate with no beam restriction.
    pub fn any_beam() -> Self {
        Self {
            bounds: Vec::new(),
            beams: None,
        }
    }

    pub fn with_bound(mut self, attr: A, interval: Interval) -> Self {
        self.bounds.retain(|(a, _)| *a != attr);
        self.bounds.push((attr, interval));
        self
    }

    /// Drop the test on `attr`, if any.
    pub fn without(mut self, attr: A) -> Self {
        self.bounds.retain(|(a, _)| *a != attr);
        self
    }

    /// True when every bound contains the point's value and its beam is allowed.
    pub fn matches<P>(&self, point: &P) -> bool
    where
        P: TrackedPoint<Attr = A>,
    {
        let beam_ok = match (&self.beams, point.beam()) {
            (Some(set), Some(beam)) => set.contains(beam),
            _ => true,
        };
        beam_ok
            && self
                .bounds
                .iter()
                .all(|(attr, interval)| interval.contains(point.value(*attr)))
    }
}

/// Turns caller criteria into a [`Predicate`] against a concrete collection.
pub trait Selector<P: TrackedPoint> {
    /// Predicate for plain selection on `source`.
    fn resolve(&self, source: &PointCollection<P>) -> Predicate<P::Attr>;

    /// Predicate used when merging `source` into another collection.
    fn resolve_for_merge(&self, source: &PointCollection<P>) -> Predicate<P::Attr> {
        self.resolve(source)
    }
}

/// Map a criterion key onto an attribute of `P`, rejecting unknown keys.
pub fn parse_attribute<P: TrackedPoint>(key: &str) -> Result<P::Attr> {
    <P::Attr as Attribute>::parse(key).ok_or_else(|| CollectionError::UnknownAttributeCriterion {
        key: key.to_string(),
        point_type: P::KIND,
    })
}
