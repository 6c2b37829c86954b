//! Swerve drive modifier
//!
//! Wheel offsets are given in the robot frame with +x forward and +y to the
//! left, so with the robot facing +x the front left wheel sits at
//! `(+d/2, +w/2)` from the centroid.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Point2, Rotation2, Vector2};

use super::{wheel_trajectory, Modifier, WheelSet};
use crate::profile::Trajectory;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Projects the centroid trajectory onto the four corner wheels of a swerve
/// chassis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwerveModifier {
    /// Distance between the left and right wheels.
    pub wheel_base_w: f64,

    /// Distance between the front and back wheels.
    pub wheel_base_d: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SwerveModifier {
    pub fn new(wheel_base_w: f64, wheel_base_d: f64) -> Self {
        Self {
            wheel_base_w,
            wheel_base_d,
        }
    }

    /// Robot frame offsets of the front left, front right, back left and back
    /// right wheels.
    pub fn wheel_offsets(&self) -> [Vector2<f64>; 4] {
        let half_w = 0.5 * self.wheel_base_w;
        let half_d = 0.5 * self.wheel_base_d;

        [
            Vector2::new(half_d, half_w),
            Vector2::new(half_d, -half_w),
            Vector2::new(-half_d, half_w),
            Vector2::new(-half_d, -half_w),
        ]
    }

    fn wheel_path(&self, source: &Trajectory, offset: &Vector2<f64>) -> Vec<(f64, f64, f64)> {
        let mut dist = 0.0;
        let mut prev: Option<Point2<f64>> = None;

        source
            .segments()
            .iter()
            .map(|seg| {
                let pos = Point2::new(seg.x, seg.y) + Rotation2::new(seg.heading) * offset;

                if let Some(p) = prev {
                    dist += (pos - p).norm();
                }
                prev = Some(pos);

                (pos.x, pos.y, dist)
            })
            .collect()
    }
}

impl Modifier for SwerveModifier {
    fn apply(&self, source: &Trajectory) -> WheelSet {
        let [fl, fr, bl, br] = self.wheel_offsets();

        WheelSet {
            front_left: wheel_trajectory(source, &self.wheel_path(source, &fl)),
            front_right: wheel_trajectory(source, &self.wheel_path(source, &fr)),
            back_left: Some(wheel_trajectory(source, &self.wheel_path(source, &bl))),
            back_right: Some(wheel_trajectory(source, &self.wheel_path(source, &br))),
        }
    }
}
