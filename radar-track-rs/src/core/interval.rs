//! Closed value intervals tracked per attribute of a point collection.

use std::fmt;

/// Closed interval `[lo, hi]`.
///
/// A collection reports [`Interval::EMPTY`] for every attribute until its
/// first point is appended; that value carries no meaning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub lo: f64,
    pub hi: f64,
}

impl Interval {
    /// Sentinel reported by empty collections.
    pub const EMPTY: Interval = Interval { lo: 0.0, hi: 0.0 };

    #[inline]
    pub const fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    /// Degenerate interval `[value, value]`.
    #[inline]
    pub const fn point(value: f64) -> Self {
        Self { lo: value, hi: value }
    }

    /// Inclusive on both ends. `lo > hi` contains nothing.
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        self.lo <= value && value <= self.hi
    }

    /// Smallest interval covering both.
    pub fn hull(&self, other: &Interval) -> Interval {
        Interval::new(self.lo.min(other.lo), self.hi.max(other.hi))
    }

    /// Bounds truncated to integers, for clock-cycle style attributes.
    pub fn as_i64(&self) -> (i64, i64) {
        (self.lo as i64, self.hi as i64)
    }

    /// Full-pass (min, max) over `values`, `None` when there are none.
    pub fn from_values<I>(values: I) -> Option<Interval>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut iter = values.into_iter();
        let first = iter.next()?;
        let (lo, hi) = iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        Some(Interval::new(lo, hi))
    }
}

impl From<(f64, f64)> for Interval {
    fn from((lo, hi): (f64, f64)) -> Self {
        Interval::new(lo, hi)
    }
}

impl From<Interval> for (f64, f64) {
    fn from(interval: Interval) -> Self {
        (interval.lo, interval.hi)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lo, self.hi)
    }
}
