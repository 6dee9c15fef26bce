//! # Orientation
//!
//! Turns ride telemetry quaternions into the roll/pitch targets a motion
//! platform expects.
//!
//! - [`angles`]: stateless quaternion decomposition and angle wrapping
//! - [`tracker`]: per-connection state that keeps roll/pitch continuous
//!   across the ±180° seam of the decomposition

use nalgebra as na;

pub mod angles;
pub mod tracker;

pub use angles::{euler_from_quaternion, wrap_angle};
pub use tracker::{OrientationOutput, OrientationTracker};

/// One pose snapshot as reported by the telemetry source.
///
/// Components are stored as received. Normalisation is the source's job;
/// the decomposition normalises internally and never rejects a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuaternionSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl QuaternionSample {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// Convert into a unit quaternion for rotation math
    pub fn to_unit_quaternion(&self) -> na::UnitQuaternion<f64> {
        na::UnitQuaternion::from_quaternion(na::Quaternion::new(self.w, self.x, self.y, self.z))
    }
}

impl Default for QuaternionSample {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<na::UnitQuaternion<f64>> for QuaternionSample {
    fn from(q: na::UnitQuaternion<f64>) -> Self {
        let q = q.into_inner();
        Self::new(q.i, q.j, q.k, q.w)
    }
}
