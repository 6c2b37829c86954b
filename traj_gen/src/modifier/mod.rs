//! # Chassis modifiers
//!
//! Modifiers project the centroid (source) trajectory onto the wheels of a
//! particular chassis.
//!
//! Every modifier follows the same rules for the fields it doesn't compute
//! itself: `dt`, heading, acceleration and jerk are copied from the centroid.
//! Wheel velocity is the forward difference of the wheel's distance over the
//! real interval to the next segment, the final segment reusing the
//! backward difference.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod swerve;
mod tank;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::{
    config::{DriveBase, KinematicConfig},
    profile::{Segment, Trajectory},
};
pub use swerve::SwerveModifier;
pub use tank::TankModifier;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A transformation from the centroid trajectory to per-wheel trajectories.
pub trait Modifier {
    fn apply(&self, source: &Trajectory) -> WheelSet;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The wheel trajectories produced by a modifier.
///
/// Tank chassis fill the front pair only (left and right), the back pair is
/// `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WheelSet {
    pub front_left: Trajectory,
    pub front_right: Trajectory,
    pub back_left: Option<Trajectory>,
    pub back_right: Option<Trajectory>,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Build the modifier matching the drive base and geometry of `config`.
pub fn modifier_for(config: &KinematicConfig) -> Box<dyn Modifier> {
    match config.drive {
        DriveBase::Tank => Box::new(TankModifier::new(config.wheel_base_w)),
        DriveBase::Swerve => {
            Box::new(SwerveModifier::new(config.wheel_base_w, config.wheel_base_d))
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Build a wheel trajectory from the source and the wheel's (x, y, distance)
/// at every source segment.
fn wheel_trajectory(source: &Trajectory, wheel: &[(f64, f64, f64)]) -> Trajectory {
    let n = wheel.len();

    let segments = source
        .segments()
        .iter()
        .zip(wheel.iter())
        .enumerate()
        .map(|(k, (centre, &(x, y, position)))| Segment {
            x,
            y,
            position,
            velocity: finite_difference(source, wheel, k, n),
            ..*centre
        })
        .collect();

    Trajectory::from_segments(segments, source.total_time())
}

fn finite_difference(
    source: &Trajectory,
    wheel: &[(f64, f64, f64)],
    k: usize,
    n: usize,
) -> f64 {
    if n < 2 {
        return 0.0;
    }

    let k = if k + 1 < n { k } else { n - 2 };
    let interval = source.interval(k);

    if interval > 0.0 {
        (wheel[k + 1].2 - wheel[k].2) / interval
    } else {
        0.0
    }
}
