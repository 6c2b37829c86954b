//! # Path fitting
//!
//! Fits a smooth curve through an ordered list of waypoints and samples it
//! densely, recording the position, heading and cumulative arc length of
//! every sample.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod hermite;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use serde::{Deserialize, Serialize};

use crate::{config::FitMethod, error::GenError};
pub use hermite::HermiteSpline;
use util::maths::{get_ang_dist, lin_map, wrap_pi};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Fast, low fidelity sample count.
pub const SAMPLES_FAST: usize = 1_000;

/// Medium fidelity sample count.
pub const SAMPLES_LOW: usize = 10_000;

/// High fidelity sample count, used by default.
pub const SAMPLES_HIGH: usize = 100_000;

/// Number of chords used to estimate each spline's arc length before the
/// samples are allocated between splines.
const ARC_LENGTH_ESTIMATE_SAMPLES: usize = 1_000;

/// Every spline gets at least this many samples.
const MIN_SAMPLES_PER_SPLINE: usize = 2;

/// Waypoints closer than this are considered coincident.
const COINCIDENT_TOLERANCE: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A pose the path must pass through.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Waypoint {
    pub x: f64,

    pub y: f64,

    /// Heading at the waypoint, measured anticlockwise from +x.
    ///
    /// Units: radians
    pub angle_rad: f64,
}

/// One dense sample of a fitted path.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PathSample {
    pub x: f64,
    pub y: f64,

    /// Units: radians
    pub heading_rad: f64,

    /// Distance travelled along the path from the first sample.
    pub arc_length: f64,
}

/// A densely sampled path.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedPath {
    samples: Vec<PathSample>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Waypoint {
    pub fn new(x: f64, y: f64, angle_rad: f64) -> Self {
        Self { x, y, angle_rad }
    }

    /// Straight line distance to another waypoint.
    pub fn distance_to(&self, other: &Waypoint) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

impl FittedPath {
    /// All samples, in order of increasing arc length.
    pub fn samples(&self) -> &[PathSample] {
        &self.samples
    }

    /// Total arc length of the path.
    pub fn length(&self) -> f64 {
        self.samples.last().map(|s| s.arc_length).unwrap_or(0.0)
    }

    /// Find the position and heading at the given arc length.
    ///
    /// The two dense samples either side of `arc_length` are linearly
    /// interpolated. Arc lengths outside the path are clamped to its ends.
    pub fn interpolate(&self, arc_length: f64) -> PathSample {
        let samples = &self.samples;

        // Index of the first sample at or beyond the arc length
        let idx = samples.partition_point(|s| s.arc_length < arc_length);

        if idx == 0 {
            return samples[0];
        }
        if idx >= samples.len() {
            return samples[samples.len() - 1];
        }

        let lo = &samples[idx - 1];
        let hi = &samples[idx];
        let range = (lo.arc_length, hi.arc_length);

        // Interpolate heading along the shortest arc so that we don't swing
        // the long way round at the +/-pi boundary
        let heading_step = get_ang_dist(lo.heading_rad, hi.heading_rad);

        PathSample {
            x: lin_map(range, (lo.x, hi.x), arc_length),
            y: lin_map(range, (lo.y, hi.y), arc_length),
            heading_rad: wrap_pi(lo.heading_rad + lin_map(range, (0.0, heading_step), arc_length)),
            arc_length,
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Fit a path through the waypoints and sample it.
///
/// Roughly `sample_count` samples are produced, shared out between the
/// splines in proportion to their arc lengths. Every spline is sampled
/// uniformly in its parameter `u`.
///
/// # Errors
/// - `GenError::DegenerateInput` if there are fewer than 2 waypoints or two
///   consecutive waypoints are coincident.
pub fn fit(
    waypoints: &[Waypoint],
    method: FitMethod,
    sample_count: usize,
) -> Result<FittedPath, GenError> {
    if waypoints.len() < 2 {
        return Err(GenError::DegenerateInput(format!(
            "At least 2 waypoints are required, found {}",
            waypoints.len()
        )));
    }

    // Build splines between each pair of waypoints
    let mut splines = Vec::with_capacity(waypoints.len() - 1);

    for (i, pair) in waypoints.windows(2).enumerate() {
        if pair[0].distance_to(&pair[1]) <= COINCIDENT_TOLERANCE {
            return Err(GenError::DegenerateInput(format!(
                "Waypoints {} and {} are coincident",
                i,
                i + 1
            )));
        }

        splines.push(HermiteSpline::new(&pair[0], &pair[1], method));
    }

    // Measure each spline so samples can be shared out by length
    let lengths: Vec<f64> = splines
        .iter()
        .map(|s| s.arc_length(ARC_LENGTH_ESTIMATE_SAMPLES))
        .collect();

    let counts = allocate_samples(&lengths, sample_count);

    trace!(
        "Fitting {} splines ({:?}) with {:?} samples",
        splines.len(),
        method,
        counts
    );

    // Sample every spline. The end of one spline is the start of the next so
    // only the final spline includes u = 1.
    let total: usize = counts.iter().sum::<usize>() + 1;
    let mut samples: Vec<PathSample> = Vec::with_capacity(total);
    let mut arc_length = 0.0;

    for (spline, count) in splines.iter().zip(counts.iter()) {
        for k in 0..*count {
            push_sample(&mut samples, &mut arc_length, spline, k as f64 / *count as f64);
        }
    }

    if let Some(last) = splines.last() {
        push_sample(&mut samples, &mut arc_length, last, 1.0);
    }

    Ok(FittedPath { samples })
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Share `sample_count` samples between splines in proportion to their
/// lengths, giving any remainder to the last spline.
fn allocate_samples(lengths: &[f64], sample_count: usize) -> Vec<usize> {
    let total_length: f64 = lengths.iter().sum();
    let available = sample_count
        .saturating_sub(1)
        .max(lengths.len() * MIN_SAMPLES_PER_SPLINE);

    let mut counts: Vec<usize> = lengths
        .iter()
        .map(|l| {
            let share = if total_length > 0.0 {
                (available as f64 * l / total_length).floor() as usize
            } else {
                0
            };
            share.max(MIN_SAMPLES_PER_SPLINE)
        })
        .collect();

    let last = counts.len() - 1;
    let assigned: usize = counts[..last].iter().sum();
    counts[last] = available
        .saturating_sub(assigned)
        .max(MIN_SAMPLES_PER_SPLINE);

    counts
}

fn push_sample(samples: &mut Vec<PathSample>, arc_length: &mut f64, spline: &HermiteSpline, u: f64) {
    let point = spline.position(u);

    if let Some(prev) = samples.last() {
        *arc_length += ((point.x - prev.x).powi(2) + (point.y - prev.y).powi(2)).sqrt();
    }

    samples.push(PathSample {
        x: point.x,
        y: point.y,
        heading_rad: spline.heading(u),
        arc_length: *arc_length,
    });
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_fit_degenerate() {
        let one = [Waypoint::new(0.0, 0.0, 0.0)];
        assert!(matches!(
            fit(&one, FitMethod::Cubic, SAMPLES_FAST),
            Err(GenError::DegenerateInput(_))
        ));

        let coincident = [
            Waypoint::new(0.0, 0.0, 0.0),
            Waypoint::new(1.0, 1.0, 0.0),
            Waypoint::new(1.0, 1.0, 1.0),
        ];
        assert!(matches!(
            fit(&coincident, FitMethod::Quintic, SAMPLES_FAST),
            Err(GenError::DegenerateInput(_))
        ));
    }

    #[test]
    fn test_fit_straight_line() {
        let wps = [Waypoint::new(0.0, 0.0, 0.0), Waypoint::new(10.0, 0.0, 0.0)];
        let path = fit(&wps, FitMethod::Cubic, SAMPLES_LOW).unwrap();

        assert_eq!(path.samples().len(), SAMPLES_LOW);
        assert_abs_diff_eq!(path.length(), 10.0, epsilon = 1e-9);

        let mid = path.interpolate(5.0);
        assert_abs_diff_eq!(mid.x, 5.0, epsilon = 1e-6);
        assert_abs_diff_eq!(mid.y, 0.0);
        assert_abs_diff_eq!(mid.heading_rad, 0.0);
    }

    #[test]
    fn test_fit_arc_length_monotone() {
        let wps = [
            Waypoint::new(0.0, 0.0, 0.0),
            Waypoint::new(5.0, 5.0, FRAC_PI_2),
            Waypoint::new(0.0, 8.0, std::f64::consts::PI),
        ];

        for method in FitMethod::ALL.iter() {
            let path = fit(&wps, *method, SAMPLES_LOW).unwrap();
            let samples = path.samples();

            assert!(samples
                .windows(2)
                .all(|w| w[1].arc_length >= w[0].arc_length));

            // Passes through every waypoint
            let first = samples[0];
            let last = samples[samples.len() - 1];
            assert_abs_diff_eq!(first.x, 0.0);
            assert_abs_diff_eq!(last.x, 0.0, epsilon = 1e-9);
            assert_abs_diff_eq!(last.y, 8.0, epsilon = 1e-9);
            assert!(samples
                .iter()
                .any(|s| (s.x - 5.0).abs() < 1e-9 && (s.y - 5.0).abs() < 1e-9));
        }
    }

    #[test]
    fn test_quintic_longer_than_cubic() {
        let wps = [Waypoint::new(0.0, 0.0, 0.0), Waypoint::new(5.0, 5.0, FRAC_PI_2)];

        let cubic = fit(&wps, FitMethod::Cubic, SAMPLES_HIGH).unwrap().length();
        let quintic = fit(&wps, FitMethod::Quintic, SAMPLES_HIGH).unwrap().length();

        assert!(quintic >= cubic);
        assert!(quintic <= 1.1 * cubic);

        // Both bow outside the chord
        assert!(cubic > 50f64.sqrt());
    }

    #[test]
    fn test_allocation_follows_length() {
        let counts = allocate_samples(&[1.0, 3.0], 1001);
        assert_eq!(counts, vec![250, 750]);

        // Tiny sample counts still give every spline its minimum
        let counts = allocate_samples(&[1.0, 1.0, 1.0], 2);
        assert!(counts.iter().all(|c| *c >= MIN_SAMPLES_PER_SPLINE));
    }

    #[test]
    fn test_interpolate_heading_across_seam() {
        let path = FittedPath {
            samples: vec![
                PathSample { x: 0.0, y: 0.0, heading_rad: 3.1, arc_length: 0.0 },
                PathSample { x: 1.0, y: 0.0, heading_rad: -3.1, arc_length: 1.0 },
            ],
        };

        // Turns the short way through pi and stays in [-pi, pi)
        let mid = path.interpolate(0.9);
        assert!(mid.heading_rad >= -std::f64::consts::PI && mid.heading_rad < std::f64::consts::PI);
        assert_abs_diff_eq!(
            mid.heading_rad,
            3.1 + 0.9 * (2.0 * std::f64::consts::PI - 6.2) - 2.0 * std::f64::consts::PI,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_interpolate_clamps() {
        let wps = [Waypoint::new(0.0, 0.0, 0.0), Waypoint::new(2.0, 0.0, 0.0)];
        let path = fit(&wps, FitMethod::Quintic, SAMPLES_FAST).unwrap();

        assert_eq!(path.interpolate(-1.0).x, 0.0);
        assert_abs_diff_eq!(path.interpolate(10.0).x, 2.0, epsilon = 1e-12);
    }
}
