//! Differential (tank) drive modifier

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;

use super::{wheel_trajectory, Modifier, WheelSet};
use crate::profile::Trajectory;
use util::maths::get_ang_dist;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Splits the centroid trajectory into left and right wheel trajectories.
///
/// The wheels sit either side of the centroid on the axis perpendicular to
/// the heading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TankModifier {
    /// Distance between the left and right wheels.
    pub wheel_base_w: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TankModifier {
    pub fn new(wheel_base_w: f64) -> Self {
        Self { wheel_base_w }
    }
}

impl Modifier for TankModifier {
    fn apply(&self, source: &Trajectory) -> WheelSet {
        let half_w = 0.5 * self.wheel_base_w;
        let segs = source.segments();

        let mut left = Vec::with_capacity(segs.len());
        let mut right = Vec::with_capacity(segs.len());

        let (mut left_dist, mut right_dist) = (0.0, 0.0);

        for (k, seg) in segs.iter().enumerate() {
            if k > 0 {
                let prev = &segs[k - 1];
                let ds = seg.position - prev.position;

                // Turning left shortens the left wheel's path
                let dtheta = get_ang_dist(prev.heading, seg.heading);
                left_dist += ds - half_w * dtheta;
                right_dist += ds + half_w * dtheta;
            }

            let (sin, cos) = seg.heading.sin_cos();
            let (off_x, off_y) = (-sin * half_w, cos * half_w);

            left.push((seg.x + off_x, seg.y + off_y, left_dist));
            right.push((seg.x - off_x, seg.y - off_y, right_dist));
        }

        trace!(
            "Tank modifier: left {:.4}, right {:.4} travelled",
            left_dist,
            right_dist
        );

        WheelSet {
            front_left: wheel_trajectory(source, &left),
            front_right: wheel_trajectory(source, &right),
            back_left: None,
            back_right: None,
        }
    }
}
