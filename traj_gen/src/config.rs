//! # Kinematic configuration
//!
//! The configuration holds the kinematic limits and chassis geometry used to
//! generate trajectories, along with the fit method, drive base and the unit
//! every distance is expressed in.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::{
    error::{GenError, ProfileError},
    units::{self, Unit},
};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The polynomial family used to interpolate between waypoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FitMethod {
    /// Hermite cubic, C1 continuous at the waypoints.
    #[serde(rename = "HERMITE_CUBIC")]
    Cubic,

    /// Hermite quintic, C2 continuous at the waypoints.
    #[serde(rename = "HERMITE_QUINTIC")]
    Quintic,
}

/// The chassis the wheel trajectories are generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DriveBase {
    /// Two wheel differential drive.
    #[serde(rename = "TANK")]
    Tank,

    /// Four independently steered wheels, one at each corner.
    #[serde(rename = "SWERVE")]
    Swerve,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Kinematic limits and chassis geometry.
///
/// All distances are expressed in `unit`, so for example `max_vel` is in
/// `unit`/second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KinematicConfig {
    /// Time step between trajectory segments.
    ///
    /// Units: seconds
    pub dt: f64,

    /// Maximum velocity of the robot's centroid.
    pub max_vel: f64,

    /// Maximum acceleration of the robot's centroid.
    pub max_acc: f64,

    /// Maximum jerk of the robot's centroid.
    pub max_jerk: f64,

    /// Distance between the left and right wheels.
    pub wheel_base_w: f64,

    /// Distance between the front and back wheels, used by swerve only.
    pub wheel_base_d: f64,

    pub fit: FitMethod,

    pub drive: DriveBase,

    pub unit: Unit,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FitMethod {
    pub const ALL: [FitMethod; 2] = [FitMethod::Cubic, FitMethod::Quintic];

    /// The stable token used in project files.
    pub fn token(&self) -> &'static str {
        match self {
            FitMethod::Cubic => "HERMITE_CUBIC",
            FitMethod::Quintic => "HERMITE_QUINTIC",
        }
    }

    /// The human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            FitMethod::Cubic => "Cubic",
            FitMethod::Quintic => "Quintic",
        }
    }
}

impl fmt::Display for FitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FitMethod {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "HERMITE_CUBIC" => Ok(FitMethod::Cubic),
            "HERMITE_QUINTIC" => Ok(FitMethod::Quintic),
            other => Err(ProfileError::InvalidArgument(format!(
                "Unknown fit method token \"{}\"",
                other
            ))),
        }
    }
}

impl DriveBase {
    pub const ALL: [DriveBase; 2] = [DriveBase::Tank, DriveBase::Swerve];

    /// The stable token used in project files.
    pub fn token(&self) -> &'static str {
        match self {
            DriveBase::Tank => "TANK",
            DriveBase::Swerve => "SWERVE",
        }
    }

    /// The human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            DriveBase::Tank => "Tank",
            DriveBase::Swerve => "Swerve",
        }
    }
}

impl fmt::Display for DriveBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DriveBase {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "TANK" => Ok(DriveBase::Tank),
            "SWERVE" => Ok(DriveBase::Swerve),
            other => Err(ProfileError::InvalidArgument(format!(
                "Unknown drive base token \"{}\"",
                other
            ))),
        }
    }
}

impl KinematicConfig {
    /// The default configuration for the given unit.
    ///
    /// Defaults describe the same physical robot in every unit: 4 ft/s, 3
    /// ft/s^2, 60 ft/s^3 and a 1.464 ft square wheel base.
    pub fn defaults(unit: Unit) -> Self {
        let (max_vel, max_acc, max_jerk, wheel_base) = match unit {
            Unit::Feet => (4.0, 3.0, 60.0, 1.464),
            Unit::Inches => (48.0, 36.0, 720.0, 17.568),
            Unit::Meters => (1.2192, 0.9144, 18.288, 0.4462272),
        };

        Self {
            dt: 0.05,
            max_vel,
            max_acc,
            max_jerk,
            wheel_base_w: wheel_base,
            wheel_base_d: wheel_base,
            fit: FitMethod::Cubic,
            drive: DriveBase::Tank,
            unit,
        }
    }

    /// Check that the time step and motion limits are strictly positive and
    /// finite.
    pub fn validate_limits(&self) -> Result<(), GenError> {
        let limits = [
            ("dt", self.dt),
            ("velocity", self.max_vel),
            ("acceleration", self.max_acc),
            ("jerk", self.max_jerk),
        ];

        for (name, value) in limits.iter() {
            if !(value.is_finite() && *value > 0.0) {
                return Err(GenError::InfeasibleLimits(format!(
                    "{} must be positive, found {}",
                    name, value
                )));
            }
        }

        Ok(())
    }

    /// Return a copy of this config with every distance based scalar moved
    /// into the new unit and rounded to 4 decimal places.
    ///
    /// `dt` is unit invariant and is left untouched.
    pub fn converted(&self, new_unit: Unit) -> Self {
        let conv = |v: f64| units::convert(v, self.unit, new_unit);

        Self {
            max_vel: conv(self.max_vel),
            max_acc: conv(self.max_acc),
            max_jerk: conv(self.max_jerk),
            wheel_base_w: conv(self.wheel_base_w),
            wheel_base_d: conv(self.wheel_base_d),
            unit: new_unit,
            ..*self
        }
    }
}

impl Default for KinematicConfig {
    fn default() -> Self {
        Self::defaults(Unit::Feet)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults_describe_same_robot() {
        let feet = KinematicConfig::defaults(Unit::Feet);

        for unit in [Unit::Inches, Unit::Meters].iter() {
            let other = KinematicConfig::defaults(*unit);
            let converted = feet.converted(*unit);

            assert_eq!(converted.max_vel, other.max_vel);
            assert_eq!(converted.max_acc, other.max_acc);
            assert_eq!(converted.max_jerk, other.max_jerk);
            assert_eq!(converted.dt, other.dt);
        }
    }

    #[test]
    fn test_converted_velocity_to_meters() {
        let cfg = KinematicConfig::defaults(Unit::Feet).converted(Unit::Meters);
        assert_eq!(cfg.max_vel, 1.2192);
        assert_eq!(cfg.unit, Unit::Meters);
        // Wheel bases follow the same rule
        assert_eq!(cfg.wheel_base_w, 0.4462);
        assert_eq!(cfg.wheel_base_d, 0.4462);
    }

    #[test]
    fn test_validate_limits() {
        let mut cfg = KinematicConfig::default();
        assert!(cfg.validate_limits().is_ok());

        cfg.dt = 0.0;
        assert!(matches!(
            cfg.validate_limits(),
            Err(GenError::InfeasibleLimits(_))
        ));

        cfg.dt = 0.05;
        cfg.max_jerk = -1.0;
        assert!(cfg.validate_limits().is_err());

        cfg.max_jerk = f64::NAN;
        assert!(cfg.validate_limits().is_err());
    }

    #[test]
    fn test_tokens() {
        for fit in FitMethod::ALL.iter() {
            assert_eq!(fit.token().parse::<FitMethod>().unwrap(), *fit);
        }
        for drive in DriveBase::ALL.iter() {
            assert_eq!(drive.token().parse::<DriveBase>().unwrap(), *drive);
        }
        assert_eq!(FitMethod::Quintic.to_string(), "Quintic");
        assert!("HERMITE_LINEAR".parse::<FitMethod>().is_err());
    }
}
