//! # Trajectory sampling
//!
//! Turns a fitted path into a time indexed trajectory by running a jerk
//! limited S-curve along the path's arc length and sampling it at a fixed
//! time step.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod scurve;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;
use serde::Serialize;
use std::fmt;

use crate::{config::KinematicConfig, error::GenError, path::FittedPath};
pub use scurve::SCurve;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Largest number of segments a single trajectory may hold.
pub const MAX_SEGMENTS: usize = 10_000_000;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One sample of a trajectory.
///
/// Field order matches the column order of every exported format.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Segment {
    /// Units: seconds
    pub dt: f64,

    pub x: f64,
    pub y: f64,

    /// Distance travelled from the start of the trajectory.
    pub position: f64,

    pub velocity: f64,
    pub acceleration: f64,
    pub jerk: f64,

    /// Units: radians
    pub heading: f64,
}

/// A time ordered sequence of segments.
///
/// A trajectory lasting `T` seconds holds `round(T / dt)` segments. All but
/// the last are taken every `dt` seconds from the start, the last is taken at
/// exactly `T`. The final interval therefore absorbs the rounding remainder
/// and lasts between `3dt/2` and `5dt/2`, or the whole motion if it is too
/// short for more than the start and end segments. See
/// [`Trajectory::interval`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trajectory {
    segments: Vec<Segment>,

    /// Duration of the motion.
    ///
    /// Units: seconds
    total_time_s: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A column of a trajectory segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileElement {
    DeltaTime,
    XPoint,
    YPoint,
    Position,
    Velocity,
    Acceleration,
    Jerk,
    Heading,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Segment {
    /// Read a single column of the segment.
    pub fn element(&self, element: ProfileElement) -> f64 {
        match element {
            ProfileElement::DeltaTime => self.dt,
            ProfileElement::XPoint => self.x,
            ProfileElement::YPoint => self.y,
            ProfileElement::Position => self.position,
            ProfileElement::Velocity => self.velocity,
            ProfileElement::Acceleration => self.acceleration,
            ProfileElement::Jerk => self.jerk,
            ProfileElement::Heading => self.heading,
        }
    }
}

impl ProfileElement {
    pub const ALL: [ProfileElement; 8] = [
        ProfileElement::DeltaTime,
        ProfileElement::XPoint,
        ProfileElement::YPoint,
        ProfileElement::Position,
        ProfileElement::Velocity,
        ProfileElement::Acceleration,
        ProfileElement::Jerk,
        ProfileElement::Heading,
    ];

    /// 1-based column index.
    pub fn index(&self) -> usize {
        match self {
            ProfileElement::DeltaTime => 1,
            ProfileElement::XPoint => 2,
            ProfileElement::YPoint => 3,
            ProfileElement::Position => 4,
            ProfileElement::Velocity => 5,
            ProfileElement::Acceleration => 6,
            ProfileElement::Jerk => 7,
            ProfileElement::Heading => 8,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            ProfileElement::DeltaTime => "DELTA_TIME",
            ProfileElement::XPoint => "X_POINT",
            ProfileElement::YPoint => "Y_POINT",
            ProfileElement::Position => "POSITION",
            ProfileElement::Velocity => "VELOCITY",
            ProfileElement::Acceleration => "ACCELERATION",
            ProfileElement::Jerk => "JERK",
            ProfileElement::Heading => "HEADING",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProfileElement::DeltaTime => "Delta Time",
            ProfileElement::XPoint => "X Point",
            ProfileElement::YPoint => "Y Point",
            ProfileElement::Position => "Position",
            ProfileElement::Velocity => "Velocity",
            ProfileElement::Acceleration => "Acceleration",
            ProfileElement::Jerk => "Jerk",
            ProfileElement::Heading => "Heading",
        }
    }
}

impl fmt::Display for ProfileElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Trajectory {
    /// Build a trajectory from already sampled segments.
    pub fn from_segments(segments: Vec<Segment>, total_time_s: f64) -> Self {
        Self {
            segments,
            total_time_s,
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn first(&self) -> Option<&Segment> {
        self.segments.first()
    }

    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// Duration of the motion in seconds.
    pub fn total_time(&self) -> f64 {
        self.total_time_s
    }

    /// Number of time steps between the first and last segment.
    pub fn num_intervals(&self) -> usize {
        self.segments.len().saturating_sub(1)
    }

    /// Real time between segment `index` and the next one.
    ///
    /// Every interval is `dt` except the last, which ends at the total time.
    /// Returns 0 for the final segment and beyond.
    pub fn interval(&self, index: usize) -> f64 {
        let n = self.segments.len();

        if index + 2 < n {
            self.segments[index].dt
        } else if index + 2 == n {
            (self.total_time_s - index as f64 * self.segments[index].dt).max(0.0)
        } else {
            0.0
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Sample a fitted path under the kinematic limits of `config`.
///
/// # Errors
/// - `GenError::InfeasibleLimits` if `dt` or any motion limit is not strictly
///   positive, or if `dt` is so small the trajectory would exceed
///   [`MAX_SEGMENTS`].
pub fn generate(path: &FittedPath, config: &KinematicConfig) -> Result<Trajectory, GenError> {
    config.validate_limits()?;

    let length = path.length();
    let curve = SCurve::plan(length, config.max_vel, config.max_acc, config.max_jerk);
    let total_time_s = curve.duration();

    if length <= 0.0 {
        return Ok(Trajectory::default());
    }

    // Start and end are always sampled, even for motions shorter than dt
    let num_segments = (total_time_s / config.dt).round().max(2.0);

    if num_segments > MAX_SEGMENTS as f64 {
        return Err(GenError::InfeasibleLimits(format!(
            "dt of {} s gives {} segments over {:.3} s, the limit is {}",
            config.dt, num_segments, total_time_s, MAX_SEGMENTS
        )));
    }

    let num_segments = num_segments as usize;

    debug!(
        "Sampling {:.4} long path: peak vel {:.4}, peak acc {:.4}, {:.3} s in {} segments",
        length, curve.peak_vel, curve.peak_acc, total_time_s, num_segments
    );

    let mut segments = Vec::with_capacity(num_segments);

    for k in 0..num_segments - 1 {
        let state = curve.state_at(k as f64 * config.dt);
        let sample = path.interpolate(state.position);

        segments.push(Segment {
            dt: config.dt,
            x: sample.x,
            y: sample.y,
            position: state.position,
            velocity: state.velocity,
            acceleration: state.acceleration,
            jerk: state.jerk,
            heading: sample.heading_rad,
        });
    }

    // The robot is at rest at the very end of the path
    let end = path.interpolate(length);
    segments.push(Segment {
        dt: config.dt,
        x: end.x,
        y: end.y,
        position: length,
        velocity: 0.0,
        acceleration: 0.0,
        jerk: 0.0,
        heading: end.heading_rad,
    });

    Ok(Trajectory::from_segments(segments, total_time_s))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        config::FitMethod,
        path::{fit, Waypoint, SAMPLES_LOW},
        units::Unit,
    };
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    fn straight_config() -> KinematicConfig {
        KinematicConfig {
            wheel_base_w: 2.0,
            ..KinematicConfig::defaults(Unit::Feet)
        }
    }

    fn curved_path(method: FitMethod) -> FittedPath {
        let wps = [
            Waypoint::new(0.0, 0.0, 0.0),
            Waypoint::new(6.0, 3.0, FRAC_PI_2),
            Waypoint::new(2.0, 9.0, std::f64::consts::PI),
        ];
        fit(&wps, method, SAMPLES_LOW).unwrap()
    }

    #[test]
    fn test_straight_line() {
        let wps = [Waypoint::new(0.0, 0.0, 0.0), Waypoint::new(10.0, 0.0, 0.0)];
        let path = fit(&wps, FitMethod::Cubic, SAMPLES_LOW).unwrap();
        let traj = generate(&path, &straight_config()).unwrap();

        let first = traj.first().unwrap();
        let last = traj.last().unwrap();

        assert_eq!(first.velocity, 0.0);
        assert_eq!(first.position, 0.0);
        assert_abs_diff_eq!(last.position, 10.0, epsilon = 1e-3);
        assert_abs_diff_eq!(last.velocity, 0.0, epsilon = 1e-9);

        // Cruise limited: L/v + v/a + a/j
        assert_abs_diff_eq!(traj.total_time(), 3.8833, epsilon = 1e-3);
        assert!(traj.segments().iter().all(|s| s.y == 0.0 && s.dt == 0.05));
    }

    #[test]
    fn test_limits_respected() {
        let config = KinematicConfig {
            max_vel: 3.0,
            max_acc: 2.0,
            max_jerk: 15.0,
            dt: 0.01,
            ..KinematicConfig::default()
        };

        for method in FitMethod::ALL.iter() {
            let traj = generate(&curved_path(*method), &config).unwrap();

            for seg in traj.segments() {
                assert!(seg.velocity.abs() <= config.max_vel * (1.0 + 1e-6));
                assert!(seg.acceleration.abs() <= config.max_acc * (1.0 + 1e-6));
                assert!(seg.jerk.abs() <= config.max_jerk * (1.0 + 1e-6));
            }

            assert_abs_diff_eq!(traj.first().unwrap().velocity, 0.0, epsilon = 1e-9);
            assert_abs_diff_eq!(traj.last().unwrap().velocity, 0.0, epsilon = 1e-9);

            let n = traj.len() as f64;
            assert_eq!(traj.len(), (traj.total_time() / config.dt).round() as usize);
            assert!((n * config.dt - traj.total_time()).abs() <= config.dt);

            assert!(traj
                .segments()
                .windows(2)
                .all(|w| w[1].position >= w[0].position));
        }
    }

    #[test]
    fn test_last_interval_absorbs_remainder() {
        let wps = [Waypoint::new(0.0, 0.0, 0.0), Waypoint::new(10.0, 0.0, 0.0)];
        let path = fit(&wps, FitMethod::Cubic, SAMPLES_LOW).unwrap();
        let traj = generate(&path, &straight_config()).unwrap();

        // 3.8833 s at 0.05 s is 77.67 steps, rounded to 78 segments
        assert_eq!(traj.len(), 78);
        assert!((traj.len() as f64 * 0.05 - traj.total_time()).abs() <= 0.05);

        let last_interval = traj.interval(traj.num_intervals() - 1);
        // 3.8833 s - 76 * 0.05 s
        assert_abs_diff_eq!(last_interval, 0.0833, epsilon = 1e-3);
        assert!(last_interval >= 0.075 - 1e-12 && last_interval <= 0.125 + 1e-12);
        assert_eq!(traj.interval(0), 0.05);
        assert_eq!(traj.interval(traj.len() - 1), 0.0);

        let sum: f64 = (0..traj.num_intervals()).map(|k| traj.interval(k)).sum();
        assert_abs_diff_eq!(sum, traj.total_time(), epsilon = 1e-9);
    }

    #[test]
    fn test_infeasible_limits() {
        let path = curved_path(FitMethod::Cubic);

        for config in [
            KinematicConfig { dt: 0.0, ..KinematicConfig::default() },
            KinematicConfig { max_vel: -1.0, ..KinematicConfig::default() },
            KinematicConfig { max_acc: 0.0, ..KinematicConfig::default() },
            KinematicConfig { max_jerk: f64::NAN, ..KinematicConfig::default() },
        ]
        .iter()
        {
            assert!(matches!(
                generate(&path, config),
                Err(GenError::InfeasibleLimits(_))
            ));
        }
    }

    #[test]
    fn test_too_many_segments() {
        let path = curved_path(FitMethod::Cubic);
        let config = KinematicConfig {
            dt: 1e-9,
            ..KinematicConfig::default()
        };

        assert!(matches!(
            generate(&path, &config),
            Err(GenError::InfeasibleLimits(_))
        ));
    }

    #[test]
    fn test_short_motion_keeps_both_ends() {
        let wps = [Waypoint::new(0.0, 0.0, 0.0), Waypoint::new(0.001, 0.0, 0.0)];
        let path = fit(&wps, FitMethod::Cubic, SAMPLES_LOW).unwrap();
        let traj = generate(&path, &KinematicConfig::default()).unwrap();

        assert_eq!(traj.len(), 2);
        assert_eq!(traj.first().unwrap().position, 0.0);
        assert_abs_diff_eq!(traj.last().unwrap().position, 0.001, epsilon = 1e-12);
    }

    #[test]
    fn test_profile_elements() {
        let seg = Segment {
            dt: 1.0,
            x: 2.0,
            y: 3.0,
            position: 4.0,
            velocity: 5.0,
            acceleration: 6.0,
            jerk: 7.0,
            heading: 8.0,
        };

        for e in ProfileElement::ALL.iter() {
            assert_eq!(seg.element(*e), e.index() as f64);
        }
        assert_eq!(ProfileElement::DeltaTime.token(), "DELTA_TIME");
        assert_eq!(ProfileElement::YPoint.to_string(), "Y Point");
    }
}
