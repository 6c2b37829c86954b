//! # Trajectory generation library.
//!
//! Generates time-parameterised motion profiles for a ground robot from a set
//! of pose waypoints and kinematic limits, and splits the centroid profile
//! into per-wheel profiles for tank and swerve chassis.
//!
//! The pipeline is:
//!
//! ```text
//! waypoints + fit -> path::fit -> profile::generate -> modifier::{tank, swerve}
//! ```
//!
//! with [`model::ProfileModel`] holding the inputs and caching the outputs.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Error taxonomy shared by the whole pipeline
pub mod error;

/// Distance units and conversions between them
pub mod units;

/// Kinematic configuration and the enumerations it is built from
pub mod config;

/// Path fitting - turns waypoints into a dense smooth curve
pub mod path;

/// Trajectory sampling - turns a dense curve into a jerk limited time profile
pub mod profile;

/// Chassis modifiers - split a centroid trajectory into wheel trajectories
pub mod modifier;

/// The profile model - holds inputs and lazily derived trajectories
pub mod model;

/// Project files and legacy `.bot` imports
pub mod project;

/// Trajectory exporters (CSV and native binary)
pub mod export;

/// Parameters of the command line executable
pub mod params;

// ------------------------------------------------------------------------------------------------
// REEXPORTS
// ------------------------------------------------------------------------------------------------

pub use config::{DriveBase, FitMethod, KinematicConfig};
pub use error::{GenError, ProfileError};
pub use model::ProfileModel;
pub use path::Waypoint;
pub use profile::{Segment, Trajectory};
pub use units::Unit;
