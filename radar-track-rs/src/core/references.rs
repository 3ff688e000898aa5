//! DGPS reference collections.

use super::collection::{Attribute, Columns, PointCollection, Result, TrackedPoint};
use super::criteria::{parse_attribute, Criterion, Predicate, Selector};
use super::points::ReferencePoint;

/// Collection of DGPS ground-truth samples.
pub type ReferenceList = PointCollection<ReferencePoint>;

/// Interval-tracked attributes of a reference sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceAttr {
    MccLeft,
    MccRight,
}

impl Attribute for ReferenceAttr {
    fn name(self) -> &'static str {
        match self {
            ReferenceAttr::MccLeft => "mccL",
            ReferenceAttr::MccRight => "mccR",
        }
    }

    fn parse(key: &str) -> Option<Self> {
        match key {
            "mccL" | "mcc_left" => Some(ReferenceAttr::MccLeft),
            "mccR" | "mcc_right" => Some(ReferenceAttr::MccRight),
            _ => None,
        }
    }
}

impl TrackedPoint for ReferencePoint {
    type Attr = ReferenceAttr;
    type Columns = ReferenceColumns;

    const KIND: &'static str = "reference";
    const TRACKED: &'static [ReferenceAttr] = &[ReferenceAttr::MccLeft, ReferenceAttr::MccRight];

    fn value(&self, attr: ReferenceAttr) -> f64 {
        match attr {
            ReferenceAttr::MccLeft => self.mcc_left as f64,
            ReferenceAttr::MccRight => self.mcc_right as f64,
        }
    }
}

/// Selected reference samples as parallel arrays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceColumns {
    pub mcc_left: Vec<i64>,
    pub mcc_right: Vec<i64>,
    pub target_dist: Vec<f64>,
    pub target_dist_x: Vec<f64>,
    pub target_dist_y: Vec<f64>,
    pub target_vel_x: Vec<f64>,
    pub target_vel_y: Vec<f64>,
    pub target_heading: Vec<f64>,
    pub ego_vel_x: Vec<f64>,
    pub ego_vel_y: Vec<f64>,
    pub ego_acc_x: Vec<f64>,
    pub ego_acc_y: Vec<f64>,
    pub ego_heading: Vec<f64>,
}

impl ReferenceColumns {
    pub const KEYS: [&'static str; 13] = [
        "mccL", "mccR", "TAR_dist", "TAR_distX", "TAR_distY", "TAR_velX", "TAR_velY", "TAR_hdg",
        "EGO_velX", "EGO_velY", "EGO_accX", "EGO_accY", "EGO_hdg",
    ];

    #[inline]
    pub fn len(&self) -> usize {
        self.mcc_left.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mcc_left.is_empty()
    }
}

impl Columns<ReferencePoint> for ReferenceColumns {
    fn push_point(&mut self, p: &ReferencePoint) {
        self.mcc_left.push(p.mcc_left);
        self.mcc_right.push(p.mcc_right);
        self.target_dist.push(p.target_dist);
        self.target_dist_x.push(p.target_dist_x);
        self.target_dist_y.push(p.target_dist_y);
        self.target_vel_x.push(p.target_vel_x);
        self.target_vel_y.push(p.target_vel_y);
        self.target_heading.push(p.target_heading);
        self.ego_vel_x.push(p.ego_vel_x);
        self.ego_vel_y.push(p.ego_vel_y);
        self.ego_acc_x.push(p.ego_acc_x);
        self.ego_acc_y.push(p.ego_acc_y);
        self.ego_heading.push(p.ego_heading);
    }
}

/// Reference criteria on the two sensor clocks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceQuery {
    pub mcc_left: Criterion,
    pub mcc_right: Criterion,
}

impl ReferenceQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mcc_left(mut self, criterion: impl Into<Criterion>) -> Self {
        self.mcc_left = criterion.into();
        self
    }

    pub fn mcc_right(mut self, criterion: impl Into<Criterion>) -> Self {
        self.mcc_right = criterion.into();
        self
    }

    /// Parse `(key, values)` pairs; keys are `mccL` / `mccR`.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<[f64]>,
    {
        let mut query = Self::default();
        for (key, values) in pairs {
            let key = key.as_ref();
            let attr = parse_attribute::<ReferencePoint>(key)?;
            let criterion = Criterion::from_values(key, values.as_ref())?;
            match attr {
                ReferenceAttr::MccLeft => query.mcc_left = criterion,
                ReferenceAttr::MccRight => query.mcc_right = criterion,
            }
        }
        Ok(query)
    }
}

impl Selector<ReferencePoint> for ReferenceQuery {
    fn resolve(&self, source: &ReferenceList) -> Predicate<ReferenceAttr> {
        Predicate::any_beam()
            .with_bound(
                ReferenceAttr::MccLeft,
                self.mcc_left.resolve(source.interval(ReferenceAttr::MccLeft)),
            )
            .with_bound(
                ReferenceAttr::MccRight,
                self.mcc_right.resolve(source.interval(ReferenceAttr::MccRight)),
            )
    }
}

impl PointCollection<ReferencePoint> {
    pub fn mcc_left_interval(&self) -> (i64, i64) {
        self.interval(ReferenceAttr::MccLeft).as_i64()
    }

    pub fn mcc_right_interval(&self) -> (i64, i64) {
        self.interval(ReferenceAttr::MccRight).as_i64()
    }

    /// Clock range covering both sensors.
    pub fn mcc_both_interval(&self) -> (i64, i64) {
        self.interval(ReferenceAttr::MccLeft)
            .hull(&self.interval(ReferenceAttr::MccRight))
            .as_i64()
    }
}
