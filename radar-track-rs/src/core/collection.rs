//! Interval-tracked point collections.
//!
//! [`PointCollection`] wraps an ordered `Vec` of one point type together with a
//! (min, max) interval per tracked attribute. Appending is the only mutation and
//! every append rescans the whole content, so the cached intervals always equal
//! the true extent of the stored points.
//!
//! Selection is driven by a [`Selector`](super::criteria::Selector), which turns
//! caller criteria plus the collection's own intervals into a predicate.

use std::fmt;

use log::debug;
use thiserror::Error;

use super::criteria::Selector;
use super::interval::Interval;

/// Errors raised by collections and their query front-ends.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CollectionError {
    #[error("interval of '{attribute}' requested from an empty collection")]
    EmptyCollectionQuery { attribute: &'static str },

    #[error("unknown attribute '{key}' for {point_type} criteria")]
    UnknownAttributeCriterion { key: String, point_type: &'static str },

    #[error("invalid sampling period {0}: must be finite and greater than zero")]
    InvalidSamplingPeriod(f64),

    #[error("malformed criterion for '{attribute}': {reason}")]
    MalformedCriterionShape { attribute: String, reason: String },
}

/// Result type for collection operations.
pub type Result<T> = std::result::Result<T, CollectionError>;

/// A queryable numeric attribute of a point type.
pub trait Attribute: Copy + Eq + fmt::Debug + 'static {
    /// Canonical key, as used in column names and criteria.
    fn name(self) -> &'static str;

    /// Look up an attribute by key. Accepts the canonical name and short aliases.
    fn parse(key: &str) -> Option<Self>;
}

/// Struct-of-arrays sink filled with one entry per selected point.
pub trait Columns<P>: Default {
    fn push_point(&mut self, point: &P);
}

/// A point type that can live in a [`PointCollection`].
pub trait TrackedPoint: Sized {
    type Attr: Attribute;
    type Columns: Columns<Self>;

    /// Human-readable type name used in error messages.
    const KIND: &'static str;

    /// Attributes whose intervals the collection maintains, in reporting order.
    const TRACKED: &'static [Self::Attr];

    fn value(&self, attr: Self::Attr) -> f64;

    /// Discrete beam id, for point types that carry one.
    fn beam(&self) -> Option<u8> {
        None
    }
}

/// Ordered, append-only collection with per-attribute interval bookkeeping.
#[derive(Debug, Clone)]
pub struct PointCollection<P: TrackedPoint> {
    points: Vec<P>,
    intervals: Vec<Interval>,
}

impl<P: TrackedPoint> PointCollection<P> {
    /// Creates an empty collection. All intervals read as [`Interval::EMPTY`].
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            intervals: vec![Interval::EMPTY; P::TRACKED.len()],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points in append order.
    #[inline]
    pub fn as_slice(&self) -> &[P] {
        &self.points
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&P> {
        self.points.get(index)
    }

    pub fn first(&self) -> Option<&P> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&P> {
        self.points.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, P> {
        self.points.iter()
    }

    /// Append a single point and rescan every tracked interval.
    pub fn push(&mut self, point: P) {
        self.points.push(point);
        self.recompute_intervals();
    }

    /// Append a batch, rescanning intervals once afterwards.
    ///
    /// Returns the number of points appended. An empty batch leaves the
    /// intervals untouched.
    pub fn extend_points<I>(&mut self, points: I) -> usize
    where
        I: IntoIterator<Item = P>,
    {
        let before = self.points.len();
        self.points.extend(points);
        let added = self.points.len() - before;
        if added > 0 {
            self.recompute_intervals();
        }
        added
    }

    /// Cached interval of `attr`. Reads [`Interval::EMPTY`] on an empty collection.
    pub fn interval(&self, attr: P::Attr) -> Interval {
        P::TRACKED
            .iter()
            .position(|&a| a == attr)
            .and_then(|idx| self.intervals.get(idx).copied())
            .unwrap_or(Interval::EMPTY)
    }

    /// Like [`interval`](Self::interval) but refuses to answer for an empty collection.
    pub fn checked_interval(&self, attr: P::Attr) -> Result<Interval> {
        if self.is_empty() {
            return Err(CollectionError::EmptyCollectionQuery {
                attribute: attr.name(),
            });
        }
        Ok(self.interval(attr))
    }

    /// Every tracked attribute with its cached interval, in reporting order.
    pub fn intervals(&self) -> impl Iterator<Item = (P::Attr, Interval)> + '_ {
        P::TRACKED.iter().copied().zip(self.intervals.iter().copied())
    }

    /// Points matching `selector`, in append order.
    pub fn select<S>(&self, selector: &S) -> Vec<&P>
    where
        S: Selector<P> + ?Sized,
    {
        let predicate = selector.resolve(self);
        self.points.iter().filter(|p| predicate.matches(*p)).collect()
    }

    /// Same filtering as [`select`](Self::select), returned as struct-of-arrays.
    pub fn select_columns<S>(&self, selector: &S) -> P::Columns
    where
        S: Selector<P> + ?Sized,
    {
        let predicate = selector.resolve(self);
        let mut columns = P::Columns::default();
        for point in self.points.iter().filter(|p| predicate.matches(*p)) {
            columns.push_point(point);
        }
        columns
    }

    /// Append every point of `source` matching `selector`.
    ///
    /// Defaults for unset criteria come from `source`'s intervals, not from
    /// this collection's. Intervals are rescanned once after the batch.
    pub fn extend_with_selection<S>(&mut self, source: &PointCollection<P>, selector: &S) -> usize
    where
        P: Clone,
        S: Selector<P> + ?Sized,
    {
        let predicate = selector.resolve_for_merge(source);
        let matched: Vec<P> = source
            .points
            .iter()
            .filter(|p| predicate.matches(*p))
            .cloned()
            .collect();
        let added = self.extend_points(matched);
        debug!(
            "Merged {} of {} {} points",
            added,
            source.len(),
            P::KIND
        );
        added
    }

    fn recompute_intervals(&mut self) {
        for (slot, &attr) in self.intervals.iter_mut().zip(P::TRACKED) {
            *slot = Interval::from_values(self.points.iter().map(|p| p.value(attr)))
                .unwrap_or(Interval::EMPTY);
        }
    }
}

impl<P: TrackedPoint> Default for PointCollection<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, P: TrackedPoint> IntoIterator for &'a PointCollection<P> {
    type Item = &'a P;
    type IntoIter = std::slice::Iter<'a, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl<P: TrackedPoint> FromIterator<P> for PointCollection<P> {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        let mut collection = Self::new();
        collection.extend_points(iter);
        collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::criteria::{Criterion, Predicate};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Attr {
        A,
        B,
    }

    impl Attribute for Attr {
        fn name(self) -> &'static str {
            match self {
                Attr::A => "a",
                Attr::B => "b",
            }
        }

        fn parse(key: &str) -> Option<Self> {
            match key {
                "a" => Some(Attr::A),
                "b" => Some(Attr::B),
                _ => None,
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Sample {
        a: f64,
        b: f64,
    }

    #[derive(Default)]
    struct SampleColumns {
        a: Vec<f64>,
    }

    impl Columns<Sample> for SampleColumns {
        fn push_point(&mut self, point: &Sample) {
            self.a.push(point.a);
        }
    }

    impl TrackedPoint for Sample {
        type Attr = Attr;
        type Columns = SampleColumns;
        const KIND: &'static str = "sample";
        const TRACKED: &'static [Attr] = &[Attr::A, Attr::B];

        fn value(&self, attr: Attr) -> f64 {
            match attr {
                Attr::A => self.a,
                Attr::B => self.b,
            }
        }
    }

    struct OnlyA(Criterion);

    impl Selector<Sample> for OnlyA {
        fn resolve(&self, source: &PointCollection<Sample>) -> Predicate<Attr> {
            Predicate::any_beam()
                .with_bound(Attr::A, self.0.resolve(source.interval(Attr::A)))
                .with_bound(Attr::B, source.interval(Attr::B))
        }
    }

    fn sample(a: f64, b: f64) -> Sample {
        Sample { a, b }
    }

    #[test]
    fn test_empty_collection_reports_sentinel() {
        let c: PointCollection<Sample> = PointCollection::new();
        assert!(c.is_empty());
        assert_eq!(c.interval(Attr::A), Interval::EMPTY);
        assert_eq!(
            c.checked_interval(Attr::B),
            Err(CollectionError::EmptyCollectionQuery { attribute: "b" })
        );
    }

    #[test]
    fn test_intervals_follow_every_push() {
        let values = [(3.0, -1.0), (1.0, 4.0), (7.0, 2.0), (5.0, -6.0)];
        let mut c = PointCollection::new();
        for (i, &(a, b)) in values.iter().enumerate() {
            c.push(sample(a, b));
            let seen = &values[..=i];
            let a_min = seen.iter().map(|v| v.0).fold(f64::INFINITY, f64::min);
            let a_max = seen.iter().map(|v| v.0).fold(f64::NEG_INFINITY, f64::max);
            let b_min = seen.iter().map(|v| v.1).fold(f64::INFINITY, f64::min);
            let b_max = seen.iter().map(|v| v.1).fold(f64::NEG_INFINITY, f64::max);
            assert_eq!(c.interval(Attr::A), Interval::new(a_min, a_max));
            assert_eq!(c.checked_interval(Attr::B), Ok(Interval::new(b_min, b_max)));
        }
    }

    #[test]
    fn test_batch_extend_matches_point_by_point() {
        let points = vec![sample(2.0, 9.0), sample(-4.0, 1.0), sample(8.0, 3.0)];
        let mut one_by_one = PointCollection::new();
        for p in &points {
            one_by_one.push(*p);
        }
        let batched: PointCollection<Sample> = points.into_iter().collect();

        assert_eq!(batched.len(), 3);
        let a: Vec<_> = batched.intervals().collect();
        let b: Vec<_> = one_by_one.intervals().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_batch_keeps_intervals() {
        let mut c: PointCollection<Sample> = vec![sample(1.0, 2.0)].into_iter().collect();
        assert_eq!(c.extend_points(Vec::new()), 0);
        assert_eq!(c.interval(Attr::A), Interval::point(1.0));
    }

    #[test]
    fn test_select_keeps_append_order() {
        let c: PointCollection<Sample> = vec![
            sample(5.0, 0.0),
            sample(1.0, 0.0),
            sample(3.0, 0.0),
            sample(9.0, 0.0),
        ]
        .into_iter()
        .collect();

        let picked = c.select(&OnlyA(Criterion::range(2.0, 9.0)));
        let a: Vec<f64> = picked.iter().map(|p| p.a).collect();
        assert_eq!(a, vec![5.0, 3.0, 9.0]);

        let columns = c.select_columns(&OnlyA(Criterion::range(2.0, 9.0)));
        assert_eq!(columns.a, a);
    }

    #[test]
    fn test_unset_criterion_returns_everything() {
        let c: PointCollection<Sample> = vec![sample(5.0, 0.0), sample(-1.0, 3.0)]
            .into_iter()
            .collect();
        let all = c.select(&OnlyA(Criterion::Unset));
        assert_eq!(all.len(), 2);
        assert_eq!(*all[0], c.as_slice()[0]);
        assert_eq!(*all[1], c.as_slice()[1]);
    }

    #[test]
    fn test_extend_with_selection_uses_source_intervals() {
        let source: PointCollection<Sample> = vec![sample(10.0, 1.0), sample(20.0, 2.0)]
            .into_iter()
            .collect();
        // Receiver intervals do not overlap the source at all.
        let mut target: PointCollection<Sample> = vec![sample(-50.0, -50.0)].into_iter().collect();

        let added = target.extend_with_selection(&source, &OnlyA(Criterion::Unset));
        assert_eq!(added, 2);
        assert_eq!(target.len(), 3);
        assert_eq!(target.interval(Attr::A), Interval::new(-50.0, 20.0));
        assert_eq!(target.interval(Attr::B), Interval::new(-50.0, 2.0));
    }
}
