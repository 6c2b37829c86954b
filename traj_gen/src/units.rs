//! # Units
//!
//! All distances in a project are held in the currently selected display
//! unit. Conversions go through feet as the intermediate unit.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::ProfileError;
use util::maths::round;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of inches in a foot.
pub const INCHES_PER_FOOT: f64 = 12.0;

/// Number of meters in a foot (exact by definition).
pub const METERS_PER_FOOT: f64 = 0.3048;

/// Number of decimal places stored values are rounded to after a unit
/// change.
pub const UNIT_ROUNDING_DECIMALS: i32 = 4;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A distance unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "FEET")]
    Feet,

    #[serde(rename = "INCHES")]
    Inches,

    #[serde(rename = "METERS")]
    Meters,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Unit {
    /// All units, in display order.
    pub const ALL: [Unit; 3] = [Unit::Feet, Unit::Inches, Unit::Meters];

    /// The stable token used in project files.
    pub fn token(&self) -> &'static str {
        match self {
            Unit::Feet => "FEET",
            Unit::Inches => "INCHES",
            Unit::Meters => "METERS",
        }
    }

    /// The human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Unit::Feet => "Feet",
            Unit::Inches => "Inches",
            Unit::Meters => "Meter",
        }
    }
}

impl Default for Unit {
    fn default() -> Self {
        Unit::Feet
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Unit {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "FEET" => Ok(Unit::Feet),
            "INCHES" => Ok(Unit::Inches),
            "METERS" => Ok(Unit::Meters),
            other => Err(ProfileError::InvalidArgument(format!(
                "Unknown unit token \"{}\"",
                other
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert a value in the given unit into feet.
pub fn to_feet(value: f64, unit: Unit) -> f64 {
    match unit {
        Unit::Feet => value,
        Unit::Inches => value / INCHES_PER_FOOT,
        Unit::Meters => value / METERS_PER_FOOT,
    }
}

/// Convert a value in feet into the given unit.
pub fn from_feet(value: f64, unit: Unit) -> f64 {
    match unit {
        Unit::Feet => value,
        Unit::Inches => value * INCHES_PER_FOOT,
        Unit::Meters => value * METERS_PER_FOOT,
    }
}

/// Convert a value between two units, rounding the result to
/// [`UNIT_ROUNDING_DECIMALS`] places.
pub fn convert(value: f64, from: Unit, to: Unit) -> f64 {
    round(from_feet(to_feet(value, from), to), UNIT_ROUNDING_DECIMALS)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_to_feet_identity() {
        for v in [0.0, 1.0, -3.25, 1234.5678].iter() {
            assert_eq!(to_feet(*v, Unit::Feet), *v);
            assert_eq!(from_feet(*v, Unit::Feet), *v);
        }
    }

    #[test]
    fn test_conversion_constants() {
        assert_eq!(to_feet(12.0, Unit::Inches), 1.0);
        assert_eq!(from_feet(1.0, Unit::Meters), 0.3048);
        assert_eq!(convert(1.0, Unit::Meters, Unit::Inches), 39.3701);
        assert_eq!(convert(4.0, Unit::Feet, Unit::Meters), 1.2192);
    }

    #[test]
    fn test_round_trip() {
        let values = [0.0, 0.05, 1.464, 4.0, 17.568, -2.5, 123.4567, 0.4462];

        for unit in Unit::ALL.iter() {
            for v in values.iter() {
                let there_and_back = round(from_feet(to_feet(*v, *unit), *unit), 4);
                assert_eq!(there_and_back, round(*v, 4), "{} in {}", v, unit);
                assert_eq!(convert(*v, *unit, *unit), round(*v, 4));
            }
        }
    }

    #[test]
    fn test_tokens() {
        for unit in Unit::ALL.iter() {
            assert_eq!(unit.token().parse::<Unit>().unwrap(), *unit);
        }
        assert_eq!(Unit::Meters.to_string(), "Meter");
        assert!(matches!(
            "YARDS".parse::<Unit>(),
            Err(ProfileError::InvalidArgument(_))
        ));
    }
}
