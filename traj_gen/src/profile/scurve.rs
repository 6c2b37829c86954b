//! Jerk limited S-curve planning along a single axis.
//!
//! The profile is made of seven phases, each with a constant jerk:
//!
//! 1. jerk up to the peak acceleration,
//! 2. constant acceleration,
//! 3. jerk down to zero acceleration,
//! 4. cruise at the peak velocity,
//! 5. to 7. the mirror image of 1 to 3, decelerating to rest.
//!
//! Any phase may have zero duration.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A constant jerk interval of the profile.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Phase {
    duration: f64,
    jerk: f64,
}

/// Kinematic state at an instant of the profile.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct State {
    pub position: f64,
    pub velocity: f64,
    pub acceleration: f64,
    pub jerk: f64,
}

/// A planned rest to rest S-curve covering a fixed distance.
#[derive(Debug, Clone, PartialEq)]
pub struct SCurve {
    phases: [Phase; 7],

    /// Peak velocity reached during the profile.
    pub peak_vel: f64,

    /// Peak acceleration reached during the profile.
    pub peak_acc: f64,

    /// Total distance covered.
    pub length: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SCurve {
    /// Plan the fastest profile covering `length` from rest to rest.
    ///
    /// The limits must be strictly positive, `length` must be non-negative.
    /// The peak velocity is lowered below `max_vel` when the distance is too
    /// short to reach it, and the peak acceleration follows from the peak
    /// velocity.
    pub fn plan(length: f64, max_vel: f64, max_acc: f64, max_jerk: f64) -> Self {
        if length <= 0.0 {
            return Self {
                phases: [Phase::default(); 7],
                peak_vel: 0.0,
                peak_acc: 0.0,
                length: 0.0,
            };
        }

        let peak_vel = if 2.0 * accel_distance(max_vel, max_acc, max_jerk) <= length {
            max_vel
        } else {
            // Try keeping the full acceleration limit first, which is only
            // valid if the velocity is high enough to reach it.
            let a2_j = max_acc * max_acc / max_jerk;
            let v = 0.5 * (-a2_j + (a2_j * a2_j + 4.0 * max_acc * length).sqrt());

            if v >= a2_j {
                v
            } else {
                (0.5 * length * max_jerk.sqrt()).powf(2.0 / 3.0)
            }
        };

        let peak_acc = peak_acc(peak_vel, max_acc, max_jerk);
        let t_jerk = peak_acc / max_jerk;
        let t_acc = (peak_vel / peak_acc - t_jerk).max(0.0);
        let t_cruise =
            ((length - 2.0 * accel_distance(peak_vel, max_acc, max_jerk)) / peak_vel).max(0.0);

        let phase = |duration, jerk| Phase { duration, jerk };

        Self {
            phases: [
                phase(t_jerk, max_jerk),
                phase(t_acc, 0.0),
                phase(t_jerk, -max_jerk),
                phase(t_cruise, 0.0),
                phase(t_jerk, -max_jerk),
                phase(t_acc, 0.0),
                phase(t_jerk, max_jerk),
            ],
            peak_vel,
            peak_acc,
            length,
        }
    }

    /// Total duration of the profile.
    ///
    /// Units: seconds
    pub fn duration(&self) -> f64 {
        self.phases.iter().map(|p| p.duration).sum()
    }

    /// Evaluate the profile at time `t`, clamped to `[0, duration]`.
    ///
    /// Each phase is integrated in closed form from the state at its start.
    pub fn state_at(&self, t: f64) -> State {
        let mut state = State::default();
        let mut remaining = clamp(t, 0.0, self.duration());

        for phase in self.phases.iter() {
            if phase.duration <= 0.0 {
                continue;
            }

            let tau = remaining.min(phase.duration);
            state = advance(&state, phase.jerk, tau);
            remaining -= tau;

            if remaining <= 0.0 {
                break;
            }
        }

        state
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Peak acceleration reached when accelerating from rest to `vel`.
fn peak_acc(vel: f64, max_acc: f64, max_jerk: f64) -> f64 {
    max_acc.min((vel * max_jerk).sqrt())
}

/// Distance needed to accelerate from rest to `vel`.
fn accel_distance(vel: f64, max_acc: f64, max_jerk: f64) -> f64 {
    let a = peak_acc(vel, max_acc, max_jerk);

    0.5 * vel * (vel / a + a / max_jerk)
}

/// Integrate a constant jerk over `tau` seconds.
fn advance(state: &State, jerk: f64, tau: f64) -> State {
    let (s, v, a) = (state.position, state.velocity, state.acceleration);
    let tau2 = tau * tau;

    State {
        position: s + v * tau + a * tau2 / 2.0 + jerk * tau2 * tau / 6.0,
        velocity: v + a * tau + jerk * tau2 / 2.0,
        acceleration: a + jerk * tau,
        jerk,
    }
}
