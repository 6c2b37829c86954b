//! # Project files
//!
//! A project file stores the kinematic configuration and waypoints of a
//! model as XML:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <Trajectory dt="0.05" velocity="4" acceleration="3" jerk="60"
//!             wheelBaseW="1.464" wheelBaseD="1.464" fitMethod="HERMITE_CUBIC"
//!             driveBase="TANK" units="FEET">
//!   <Waypoint>
//!     <X>0</X>
//!     <Y>0</Y>
//!     <Angle>0</Angle>
//!   </Waypoint>
//! </Trajectory>
//! ```
//!
//! Angles are in radians. Every other value is in the project's unit.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod bot;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use serde::{Deserialize, Serialize};
use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::{
    config::KinematicConfig,
    error::ProfileError,
    path::Waypoint,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

pub const PROJECT_EXTENSION: &str = "xml";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// On disk layout of a project.
///
/// Values are kept as text so that a malformed number can be reported as an
/// invalid argument rather than a syntax error.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "Trajectory")]
struct ProjectDoc {
    #[serde(rename = "@dt")]
    dt: String,

    #[serde(rename = "@velocity")]
    velocity: String,

    #[serde(rename = "@acceleration")]
    acceleration: String,

    #[serde(rename = "@jerk")]
    jerk: String,

    #[serde(rename = "@wheelBaseW")]
    wheel_base_w: String,

    #[serde(rename = "@wheelBaseD")]
    wheel_base_d: String,

    #[serde(rename = "@fitMethod")]
    fit_method: String,

    #[serde(rename = "@driveBase")]
    drive_base: String,

    #[serde(rename = "@units")]
    units: String,

    #[serde(rename = "Waypoint", default)]
    waypoints: Vec<WaypointDoc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WaypointDoc {
    #[serde(rename = "X")]
    x: String,

    #[serde(rename = "Y")]
    y: String,

    #[serde(rename = "Angle")]
    angle: String,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ProjectDoc {
    fn new(config: &KinematicConfig, waypoints: &[Waypoint]) -> Self {
        Self {
            dt: config.dt.to_string(),
            velocity: config.max_vel.to_string(),
            acceleration: config.max_acc.to_string(),
            jerk: config.max_jerk.to_string(),
            wheel_base_w: config.wheel_base_w.to_string(),
            wheel_base_d: config.wheel_base_d.to_string(),
            fit_method: config.fit.token().into(),
            drive_base: config.drive.token().into(),
            units: config.unit.token().into(),
            waypoints: waypoints
                .iter()
                .map(|wp| WaypointDoc {
                    x: wp.x.to_string(),
                    y: wp.y.to_string(),
                    angle: wp.angle_rad.to_string(),
                })
                .collect(),
        }
    }

    fn into_model(self) -> Result<(KinematicConfig, Vec<Waypoint>), ProfileError> {
        let config = KinematicConfig {
            dt: parse_number("dt", &self.dt)?,
            max_vel: parse_number("velocity", &self.velocity)?,
            max_acc: parse_number("acceleration", &self.acceleration)?,
            max_jerk: parse_number("jerk", &self.jerk)?,
            wheel_base_w: parse_number("wheelBaseW", &self.wheel_base_w)?,
            wheel_base_d: parse_number("wheelBaseD", &self.wheel_base_d)?,
            fit: self.fit_method.parse()?,
            drive: self.drive_base.parse()?,
            unit: self.units.parse()?,
        };

        let waypoints = self
            .waypoints
            .iter()
            .map(|wp| {
                Ok(Waypoint::new(
                    parse_number("X", &wp.x)?,
                    parse_number("Y", &wp.y)?,
                    parse_number("Angle", &wp.angle)?,
                ))
            })
            .collect::<Result<Vec<_>, ProfileError>>()?;

        Ok((config, waypoints))
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Render a project as XML text.
pub fn to_xml(config: &KinematicConfig, waypoints: &[Waypoint]) -> Result<String, ProfileError> {
    let mut xml = String::from(XML_DECLARATION);
    xml.push('\n');

    let mut ser = quick_xml::se::Serializer::new(&mut xml);
    ser.indent(' ', 2);

    ProjectDoc::new(config, waypoints)
        .serialize(ser)
        .map_err(|e| ProfileError::InvalidArgument(format!("Cannot serialise project: {}", e)))?;

    xml.push('\n');
    Ok(xml)
}

/// Parse a project from XML text.
pub fn from_xml(xml: &str) -> Result<(KinematicConfig, Vec<Waypoint>), ProfileError> {
    let doc: ProjectDoc = quick_xml::de::from_str(xml)
        .map_err(|e| ProfileError::ParseFailure(format!("Malformed project file: {}", e)))?;

    doc.into_model()
}

/// Read a project file.
pub fn read_project(path: &Path) -> Result<(KinematicConfig, Vec<Waypoint>), ProfileError> {
    let xml = fs::read_to_string(path)?;
    trace!("Read {} bytes from {:?}", xml.len(), path);

    from_xml(&xml)
}

/// Write a project file, creating any missing parent directories.
pub fn write_project(
    path: &Path,
    config: &KinematicConfig,
    waypoints: &[Waypoint],
) -> Result<(), ProfileError> {
    let xml = to_xml(config, waypoints)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(path, xml)?;
    trace!("Wrote project to {:?}", path);

    Ok(())
}

/// Append `.xml` to the path unless it already has that extension.
pub fn with_project_extension(path: &Path) -> PathBuf {
    match path.extension() {
        Some(ext) if ext.eq_ignore_ascii_case(PROJECT_EXTENSION) => path.to_path_buf(),
        _ => {
            let mut name = OsString::from(path.as_os_str());
            name.push(".");
            name.push(PROJECT_EXTENSION);
            PathBuf::from(name)
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn parse_number(field: &str, text: &str) -> Result<f64, ProfileError> {
    f64::from_str(text.trim()).map_err(|e| {
        ProfileError::InvalidArgument(format!("{} is not a number (\"{}\"): {}", field, text, e))
    })
}
