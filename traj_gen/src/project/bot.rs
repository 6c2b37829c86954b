//! Legacy `.bot` project import
//!
//! A `.bot` file is plain text with one value per line:
//!
//! ```text
//! dt
//! velocity
//! acceleration
//! jerk
//! wheel base width
//! wheel base depth
//! fit method (CUBIC or QUINTIC)
//! x,y,angle_degrees
//! ...
//! ```
//!
//! Blank lines are ignored. The file carries no unit.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::{fs, path::Path};

use crate::{
    config::{DriveBase, FitMethod, KinematicConfig},
    error::ProfileError,
    path::Waypoint,
    units::Unit,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of header lines before the waypoints start.
const HEADER_LINES: usize = 7;

const FIT_TOKEN_PREFIX: &str = "HERMITE_";

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Read a `.bot` file, taking every value to be in `unit`.
pub fn read_bot(path: &Path, unit: Unit) -> Result<(KinematicConfig, Vec<Waypoint>), ProfileError> {
    let text = fs::read_to_string(path)?;
    parse_bot(&text, unit)
}

/// Parse the text of a `.bot` file.
///
/// The configuration starts from the defaults for `unit`. Scalars are taken
/// as their absolute value, and a positive wheel base depth selects a swerve
/// drive base.
pub fn parse_bot(text: &str, unit: Unit) -> Result<(KinematicConfig, Vec<Waypoint>), ProfileError> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    if lines.len() < HEADER_LINES {
        return Err(ProfileError::ParseFailure(format!(
            "Expected at least {} lines in bot file, found {}",
            HEADER_LINES,
            lines.len()
        )));
    }

    let mut config = KinematicConfig::defaults(unit);
    config.dt = parse_scalar("dt", lines[0])?;
    config.max_vel = parse_scalar("velocity", lines[1])?;
    config.max_acc = parse_scalar("acceleration", lines[2])?;
    config.max_jerk = parse_scalar("jerk", lines[3])?;
    config.wheel_base_w = parse_scalar("wheel base width", lines[4])?;
    config.wheel_base_d = parse_scalar("wheel base depth", lines[5])?;

    config.fit = format!("{}{}", FIT_TOKEN_PREFIX, lines[6].to_uppercase()).parse::<FitMethod>()?;

    if config.wheel_base_d > 0.0 {
        config.drive = DriveBase::Swerve;
    }

    let waypoints = lines[HEADER_LINES..]
        .iter()
        .enumerate()
        .map(|(i, line)| parse_waypoint(i, line))
        .collect::<Result<Vec<_>, _>>()?;

    Ok((config, waypoints))
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn parse_scalar(name: &str, text: &str) -> Result<f64, ProfileError> {
    text.parse::<f64>().map(f64::abs).map_err(|e| {
        ProfileError::InvalidArgument(format!("Bot file {} \"{}\" is not a number: {}", name, text, e))
    })
}

/// Parse an `x,y,angle_degrees` line.
fn parse_waypoint(index: usize, line: &str) -> Result<Waypoint, ProfileError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();

    if fields.len() != 3 {
        return Err(ProfileError::ParseFailure(format!(
            "Bot file waypoint {} should have 3 fields, found {}",
            index,
            fields.len()
        )));
    }

    let mut values = [0f64; 3];
    for (value, field) in values.iter_mut().zip(fields.iter()) {
        *value = field.parse().map_err(|e| {
            ProfileError::InvalidArgument(format!(
                "Bot file waypoint {} field \"{}\" is not a number: {}",
                index, field, e
            ))
        })?;
    }

    Ok(Waypoint::new(values[0], values[1], values[2].to_radians()))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ProfileModel;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    const STRAIGHT: &str = "0.05\n4\n3\n60\n2\n0\nCUBIC\n0,0,0\n10,0,0\n";

    #[test]
    fn test_parse_straight() {
        let (config, waypoints) = parse_bot(STRAIGHT, Unit::Feet).unwrap();

        assert_eq!(config.dt, 0.05);
        assert_eq!(config.max_vel, 4.0);
        assert_eq!(config.max_acc, 3.0);
        assert_eq!(config.max_jerk, 60.0);
        assert_eq!(config.wheel_base_w, 2.0);
        assert_eq!(config.fit, FitMethod::Cubic);
        assert_eq!(config.drive, DriveBase::Tank);
        assert_eq!(config.unit, Unit::Feet);

        assert_eq!(
            waypoints,
            vec![Waypoint::new(0.0, 0.0, 0.0), Waypoint::new(10.0, 0.0, 0.0)]
        );
    }

    #[test]
    fn test_parse_swerve_quintic() {
        let text = "\n0.02\n-48\n36\n720\n20\n24\n quintic \n\n0, 0, 90\n100,50,-45\n";
        let (config, waypoints) = parse_bot(text, Unit::Inches).unwrap();

        assert_eq!(config.max_vel, 48.0);
        assert_eq!(config.fit, FitMethod::Quintic);
        assert_eq!(config.drive, DriveBase::Swerve);
        assert_eq!(config.unit, Unit::Inches);

        assert_eq!(waypoints.len(), 2);
        assert_abs_diff_eq!(waypoints[0].angle_rad, FRAC_PI_2, epsilon = 1e-12);
        assert_abs_diff_eq!(waypoints[1].angle_rad, -FRAC_PI_2 / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_bot("0.05\n4\n3\n", Unit::Feet),
            Err(ProfileError::ParseFailure(_))
        ));
        assert!(matches!(
            parse_bot(&STRAIGHT.replace("60", "sixty"), Unit::Feet),
            Err(ProfileError::InvalidArgument(_))
        ));
        assert!(matches!(
            parse_bot(&STRAIGHT.replace("CUBIC", "BEZIER"), Unit::Feet),
            Err(ProfileError::InvalidArgument(_))
        ));
        assert!(matches!(
            parse_bot(&STRAIGHT.replace("10,0,0", "10,0"), Unit::Feet),
            Err(ProfileError::ParseFailure(_))
        ));
        assert!(matches!(
            parse_bot(&STRAIGHT.replace("10,0,0", "10,x,0"), Unit::Feet),
            Err(ProfileError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_import_into_model() {
        let path = std::env::temp_dir().join(format!("traj_gen_import_{}.bot", std::process::id()));
        fs::write(&path, STRAIGHT).unwrap();

        let mut model = ProfileModel::new(Unit::Meters);
        model.set_sample_count(crate::path::SAMPLES_LOW);
        model.add_waypoint(Waypoint::new(5.0, 5.0, 0.0));
        model.save_project_as(path.with_extension("xml")).unwrap();

        model.import_bot_file(&path, Unit::Feet).unwrap();

        assert!(!model.has_working_project());
        assert_eq!(model.num_waypoints(), 2);
        assert_eq!(model.config().unit, Unit::Feet);
        assert_eq!(model.config().drive, DriveBase::Tank);

        let source = model.source_trajectory().unwrap().unwrap();
        assert_abs_diff_eq!(source.last().unwrap().position, 10.0, epsilon = 1e-3);
        let left = model.front_left().unwrap().unwrap();
        assert_abs_diff_eq!(left.first().unwrap().y, 1.0, epsilon = 1e-12);

        fs::remove_file(&path).unwrap();
        fs::remove_file(path.with_extension("xml")).unwrap();
    }
}
