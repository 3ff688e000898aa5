//! Point records for RADAR detections, DGPS reference samples and track samples.
//!
//! Every record is a plain value. Detections carry Cartesian coordinates that are
//! derived once from the polar measurement and the sensor mounting, so left and
//! right sensor returns share one vehicle-centered frame.

use serde::{Deserialize, Serialize};

/// Which side of the EGO vehicle a RADAR sensor is mounted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Sign applied to the lateral coordinate: -1 for left, +1 for right.
    #[inline]
    pub fn y_sign(self) -> f64 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }

    /// Short label used in logs and summaries.
    pub fn label(self) -> &'static str {
        match self {
            Side::Left => "Left",
            Side::Right => "Right",
        }
    }
}

/// Mounting parameters shared by every detection of one recording.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorMount {
    pub side: Side,
    /// Width of the EGO car in meters.
    pub car_width: f64,
}

impl SensorMount {
    pub fn new(side: Side, car_width: f64) -> Self {
        Self { side, car_width }
    }

    pub fn left(car_width: f64) -> Self {
        Self::new(Side::Left, car_width)
    }

    pub fn right(car_width: f64) -> Self {
        Self::new(Side::Right, car_width)
    }
}

/// One row of the detection matrix, before coordinates are derived.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawDetection {
    pub mcc: i64,
    pub beam: u8,
    pub detections_in_cycle: u32,
    pub track_id: u32,
    pub range: f64,
    pub velocity: f64,
    pub azimuth: f64,
}

/// A point as it was detected by the RADAR.
///
/// Fields are private so the derived `x`/`y` can never drift from the polar
/// measurement they were computed from. Field order is the CSV export order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DetectionPoint {
    range: f64,
    azimuth: f64,
    velocity: f64,
    x: f64,
    y: f64,
    #[serde(rename = "trackID")]
    track_id: u32,
    beam: u8,
    mcc: i64,
    #[serde(skip)]
    detections_in_cycle: u32,
}

impl DetectionPoint {
    /// Build a detection, projecting range/azimuth into the vehicle frame.
    ///
    /// `x = range * cos(azimuth)` and
    /// `y = sign(side) * (range * sin(azimuth) + car_width / 2)`.
    pub fn new(raw: RawDetection, mount: SensorMount) -> Self {
        let x = raw.range * raw.azimuth.cos();
        let y = mount.side.y_sign() * (raw.range * raw.azimuth.sin() + mount.car_width / 2.0);
        Self {
            mcc: raw.mcc,
            beam: raw.beam,
            detections_in_cycle: raw.detections_in_cycle,
            track_id: raw.track_id,
            range: raw.range,
            velocity: raw.velocity,
            azimuth: raw.azimuth,
            x,
            y,
        }
    }

    #[inline]
    pub fn mcc(&self) -> i64 {
        self.mcc
    }

    #[inline]
    pub fn beam(&self) -> u8 {
        self.beam
    }

    #[inline]
    pub fn detections_in_cycle(&self) -> u32 {
        self.detections_in_cycle
    }

    /// Track the detection was assigned to, 0 when unassigned.
    #[inline]
    pub fn track_id(&self) -> u32 {
        self.track_id
    }

    #[inline]
    pub fn range(&self) -> f64 {
        self.range
    }

    #[inline]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    #[inline]
    pub fn azimuth(&self) -> f64 {
        self.azimuth
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.y
    }
}

/// One DGPS ground-truth sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    /// Left RADAR clock at this instant
    #[serde(rename = "mccL")]
    pub mcc_left: i64,
    /// Right RADAR clock at this instant
    #[serde(rename = "mccR")]
    pub mcc_right: i64,
    /// Target distance from the EGO car
    #[serde(rename = "TAR_dist")]
    pub target_dist: f64,
    #[serde(rename = "TAR_distX")]
    pub target_dist_x: f64,
    #[serde(rename = "TAR_distY")]
    pub target_dist_y: f64,
    /// Target absolute velocity along X
    #[serde(rename = "TAR_velX")]
    pub target_vel_x: f64,
    #[serde(rename = "TAR_velY")]
    pub target_vel_y: f64,
    #[serde(rename = "TAR_hdg")]
    pub target_heading: f64,
    #[serde(rename = "EGO_velX")]
    pub ego_vel_x: f64,
    #[serde(rename = "EGO_velY")]
    pub ego_vel_y: f64,
    #[serde(rename = "EGO_accX")]
    pub ego_acc_x: f64,
    #[serde(rename = "EGO_accY")]
    pub ego_acc_y: f64,
    #[serde(rename = "EGO_hdg")]
    pub ego_heading: f64,
}

/// A sample belonging to a confirmed track.
///
/// `azimuth` and `velocity` are raw sensor readings; `dx`/`dy` are the
/// kinematic derivatives of the position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TrackPoint {
    pub mcc: i64,
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
    pub azimuth: f64,
    pub velocity: f64,
    pub beam: u8,
}

impl TrackPoint {
    /// Track sample taken over from a detection; derivatives start at zero.
    pub fn from_detection(detection: &DetectionPoint) -> Self {
        Self {
            mcc: detection.mcc(),
            x: detection.x(),
            y: detection.y(),
            dx: 0.0,
            dy: 0.0,
            azimuth: detection.azimuth(),
            velocity: detection.velocity(),
            beam: detection.beam(),
        }
    }

    /// Kinematic-only point with every sensor field zeroed.
    pub fn kinematic(x: f64, y: f64, dx: f64, dy: f64) -> Self {
        Self {
            x,
            y,
            dx,
            dy,
            ..Self::default()
        }
    }

    /// State snapshot `[x, dx, y, dy]` for downstream estimators.
    pub fn state_vector(&self) -> [f64; 4] {
        [self.x, self.dx, self.y, self.dy]
    }
}
