//! Hermite spline segments
//!
//! A spline joins two waypoints. The tangent at each end points along the
//! waypoint's heading and has a magnitude equal to the chord length between
//! the two waypoints.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;

use super::Waypoint;
use crate::config::FitMethod;
use util::maths::poly_val;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

// Basis polynomials, highest power first. Each array holds the weights of
// (p0, t0, p1, t1) for the cubic and (p0, t0, a0, a1, t1, p1) for the
// quintic.

const CUBIC_BASIS: [[f64; 4]; 4] = [
    [2.0, -3.0, 0.0, 1.0],
    [1.0, -2.0, 1.0, 0.0],
    [-2.0, 3.0, 0.0, 0.0],
    [1.0, -1.0, 0.0, 0.0],
];

const CUBIC_BASIS_DERIV: [[f64; 3]; 4] = [
    [6.0, -6.0, 0.0],
    [3.0, -4.0, 1.0],
    [-6.0, 6.0, 0.0],
    [3.0, -2.0, 0.0],
];

const QUINTIC_BASIS: [[f64; 6]; 6] = [
    [-6.0, 15.0, -10.0, 0.0, 0.0, 1.0],
    [-3.0, 8.0, -6.0, 0.0, 1.0, 0.0],
    [-0.5, 1.5, -1.5, 0.5, 0.0, 0.0],
    [0.5, -1.0, 0.5, 0.0, 0.0, 0.0],
    [-3.0, 7.0, -4.0, 0.0, 0.0, 0.0],
    [6.0, -15.0, 10.0, 0.0, 0.0, 0.0],
];

const QUINTIC_BASIS_DERIV: [[f64; 5]; 6] = [
    [-30.0, 60.0, -30.0, 0.0, 0.0],
    [-15.0, 32.0, -18.0, 0.0, 1.0],
    [-2.5, 6.0, -4.5, 1.0, 0.0],
    [2.5, -4.0, 1.5, 0.0, 0.0],
    [-15.0, 28.0, -12.0, 0.0, 0.0],
    [30.0, -60.0, 30.0, 0.0, 0.0],
];

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single Hermite spline between two waypoints, parameterised by
/// `u` in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct HermiteSpline {
    method: FitMethod,

    start: Vector2<f64>,
    end: Vector2<f64>,

    start_tangent: Vector2<f64>,
    end_tangent: Vector2<f64>,

    /// Second derivatives at each end, zero for every spline built from
    /// waypoints.
    start_accel: Vector2<f64>,
    end_accel: Vector2<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl HermiteSpline {
    /// Build the spline joining `from` to `to`.
    pub fn new(from: &Waypoint, to: &Waypoint, method: FitMethod) -> Self {
        let start = Vector2::new(from.x, from.y);
        let end = Vector2::new(to.x, to.y);

        let chord = (end - start).norm();

        Self {
            method,
            start,
            end,
            start_tangent: chord * Vector2::new(from.angle_rad.cos(), from.angle_rad.sin()),
            end_tangent: chord * Vector2::new(to.angle_rad.cos(), to.angle_rad.sin()),
            start_accel: Vector2::zeros(),
            end_accel: Vector2::zeros(),
        }
    }

    /// The straight line distance between the two ends of the spline.
    pub fn chord_length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// Position on the spline at `u`.
    pub fn position(&self, u: f64) -> Vector2<f64> {
        match self.method {
            FitMethod::Cubic => {
                let w = basis_weights(&CUBIC_BASIS, u);

                w[0] * self.start + w[1] * self.start_tangent + w[2] * self.end + w[3] * self.end_tangent
            }
            FitMethod::Quintic => {
                let w = basis_weights(&QUINTIC_BASIS, u);

                w[0] * self.start
                    + w[1] * self.start_tangent
                    + w[2] * self.start_accel
                    + w[3] * self.end_accel
                    + w[4] * self.end_tangent
                    + w[5] * self.end
            }
        }
    }

    /// First derivative of position with respect to `u`.
    pub fn derivative(&self, u: f64) -> Vector2<f64> {
        match self.method {
            FitMethod::Cubic => {
                let w = basis_weights(&CUBIC_BASIS_DERIV, u);

                w[0] * self.start + w[1] * self.start_tangent + w[2] * self.end + w[3] * self.end_tangent
            }
            FitMethod::Quintic => {
                let w = basis_weights(&QUINTIC_BASIS_DERIV, u);

                w[0] * self.start
                    + w[1] * self.start_tangent
                    + w[2] * self.start_accel
                    + w[3] * self.end_accel
                    + w[4] * self.end_tangent
                    + w[5] * self.end
            }
        }
    }

    /// Heading of the curve at `u`, measured from +x.
    ///
    /// Units: radians
    pub fn heading(&self, u: f64) -> f64 {
        let d = self.derivative(u);
        d.y.atan2(d.x)
    }

    /// Estimate the arc length by summing `num_samples` chords along the
    /// spline.
    pub fn arc_length(&self, num_samples: usize) -> f64 {
        let n = num_samples.max(1);

        let mut length = 0.0;
        let mut last = self.position(0.0);

        for i in 1..=n {
            let point = self.position(i as f64 / n as f64);
            length += (point - last).norm();
            last = point;
        }

        length
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Evaluate every polynomial of a basis at `u`.
fn basis_weights<const N: usize, const M: usize>(basis: &[[f64; M]; N], u: f64) -> [f64; N] {
    let mut weights = [0f64; N];

    for (w, coeffs) in weights.iter_mut().zip(basis.iter()) {
        *w = poly_val(u, coeffs);
    }

    weights
}
