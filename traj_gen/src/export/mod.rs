//! # Trajectory export
//!
//! Writes trajectories to disk for consumption by robot code. Two families
//! are supported:
//!
//! - Jaci: the source and every wheel, either as CSV with a header row
//!   (`<base>_<name>_Jaci.csv`) or as binary (`<base>_<name>_Jaci.traj`).
//! - Talon: the wheels only as headerless CSV of position, velocity and
//!   integer millisecond period (`<base>_<name>_Talon.csv`), or the source
//!   and every wheel as binary (`<base>_<name>_detailed.traj`).
//!
//! Files are written in order and the first failure is returned. Files
//! already written are left in place.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod binary;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;
use serde::Serialize;
use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::{error::ProfileError, profile::Trajectory};
pub use binary::{read_traj, write_traj};
use util::{archive::Archiver, time::seconds_to_millis};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// On disk format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Traj,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A row of a Talon CSV file.
#[derive(Debug, Serialize)]
struct TalonRow {
    position: f64,
    velocity: f64,
    dt_ms: i64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Traj => "traj",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ProfileError;

    /// Parse an extension, with or without its leading dot.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ext = s.trim().trim_start_matches('.');

        if ext.eq_ignore_ascii_case("csv") {
            Ok(ExportFormat::Csv)
        } else if ext.eq_ignore_ascii_case("traj") {
            Ok(ExportFormat::Traj)
        } else {
            Err(ProfileError::InvalidArgument(format!(
                "Unsupported export extension \"{}\"",
                s
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Export named trajectories in the Jaci family of formats.
///
/// Returns the paths written, in the order of `outputs`.
pub fn export_jaci(
    base: &Path,
    format: ExportFormat,
    outputs: &[(&str, &Trajectory)],
) -> Result<Vec<PathBuf>, ProfileError> {
    create_parent(base)?;

    let mut written = Vec::with_capacity(outputs.len());

    for (name, traj) in outputs.iter() {
        let path = export_path(base, name, "Jaci", format.extension());

        match format {
            ExportFormat::Csv => write_jaci_csv(&path, traj)?,
            ExportFormat::Traj => write_traj(&path, traj)?,
        }

        debug!("Exported {} trajectory to {:?}", name, path);
        written.push(path);
    }

    Ok(written)
}

/// Export named trajectories in the Talon family of formats.
///
/// The source is never written as Talon CSV, if present in `outputs` it is
/// skipped.
pub fn export_talon(
    base: &Path,
    format: ExportFormat,
    outputs: &[(&str, &Trajectory)],
) -> Result<Vec<PathBuf>, ProfileError> {
    create_parent(base)?;

    let mut written = Vec::with_capacity(outputs.len());

    for (name, traj) in outputs.iter() {
        let path = match format {
            ExportFormat::Csv => {
                if *name == "source" {
                    continue;
                }
                let path = export_path(base, name, "Talon", "csv");
                write_talon_csv(&path, traj)?;
                path
            }
            ExportFormat::Traj => {
                let path = export_path(base, name, "detailed", "traj");
                write_traj(&path, traj)?;
                path
            }
        };

        debug!("Exported {} trajectory to {:?}", name, path);
        written.push(path);
    }

    Ok(written)
}

/// Write a trajectory as CSV with a header row and one row per segment.
pub fn write_jaci_csv(path: &Path, traj: &Trajectory) -> Result<(), ProfileError> {
    let mut archiver = Archiver::create(path, true)?;

    for seg in traj.segments() {
        archiver.serialise(seg)?;
    }

    archiver.flush()?;
    Ok(())
}

/// Write a trajectory as headerless position, velocity and millisecond
/// period rows.
pub fn write_talon_csv(path: &Path, traj: &Trajectory) -> Result<(), ProfileError> {
    let mut archiver = Archiver::create(path, false)?;

    for seg in traj.segments() {
        archiver.serialise(TalonRow {
            position: seg.position,
            velocity: seg.velocity,
            dt_ms: seconds_to_millis(seg.dt),
        })?;
    }

    archiver.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// `<base>_<name>_<family>.<ext>`
fn export_path(base: &Path, name: &str, family: &str, ext: &str) -> PathBuf {
    let mut path = OsString::from(base.as_os_str());
    path.push(format!("_{}_{}.{}", name, family, ext));
    PathBuf::from(path)
}

fn create_parent(base: &Path) -> Result<(), ProfileError> {
    match base.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent)?;
            Ok(())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{profile::Segment, ProfileModel, Unit, Waypoint, DriveBase};
    use std::fs;

    fn temp_base(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("traj_gen_export_{}_{}", name, std::process::id()))
            .join("run")
    }

    fn model() -> ProfileModel {
        let mut model = ProfileModel::new(Unit::Feet);
        model.set_sample_count(crate::path::SAMPLES_FAST);
        model.add_waypoint(Waypoint::new(0.0, 0.0, 0.0));
        model.add_waypoint(Waypoint::new(3.0, 1.0, 0.5));
        model
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!(".traj".parse::<ExportFormat>().unwrap(), ExportFormat::Traj);
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert!(matches!(
            "json".parse::<ExportFormat>(),
            Err(ProfileError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_export_path() {
        let path = export_path(Path::new("out/run1"), "fl", "Talon", "csv");
        assert_eq!(path, PathBuf::from("out/run1_fl_Talon.csv"));
    }

    #[test]
    fn test_talon_csv_rows() {
        let base = temp_base("talon_rows");
        fs::create_dir_all(base.parent().unwrap()).unwrap();
        let path = base.with_extension("csv");

        let traj = Trajectory::from_segments(
            vec![
                Segment { dt: 0.05, position: 0.0, velocity: 0.0, ..Segment::default() },
                Segment { dt: 0.05, position: 0.25, velocity: 1.5, ..Segment::default() },
            ],
            0.05,
        );
        write_talon_csv(&path, &traj).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "0.0,0.0,50\n0.25,1.5,50\n");

        fs::remove_dir_all(base.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_export_jaci_tank() {
        let base = temp_base("jaci_tank");
        let written = model().export_jaci(&base, "csv").unwrap();

        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec!["run_source_Jaci.csv", "run_left_Jaci.csv", "run_right_Jaci.csv"]
        );

        let contents = fs::read_to_string(&written[0]).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next().unwrap(),
            "dt,x,y,position,velocity,acceleration,jerk,heading"
        );
        assert!(lines.next().unwrap().starts_with("0.05,0.0,0.0,0.0,0.0"));

        fs::remove_dir_all(base.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_export_talon_swerve() {
        let base = temp_base("talon_swerve");
        let mut model = model();
        model.set_drive_base(DriveBase::Swerve);

        let written = model.export_talon(&base, "csv").unwrap();
        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "run_fl_Talon.csv",
                "run_fr_Talon.csv",
                "run_bl_Talon.csv",
                "run_br_Talon.csv"
            ]
        );

        let written = model.export_talon(&base, "traj").unwrap();
        assert_eq!(written.len(), 5);
        assert!(written[0].ends_with("run_source_detailed.traj"));

        let source = model.source_trajectory().unwrap().unwrap();
        assert_eq!(read_traj(&written[0]).unwrap(), source.segments());

        fs::remove_dir_all(base.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_export_failures() {
        let base = temp_base("failures");

        assert!(matches!(
            model().export_jaci(&base, "xlsx"),
            Err(ProfileError::InvalidArgument(_))
        ));

        let empty = ProfileModel::new(Unit::Feet);
        assert!(matches!(
            empty.export_talon(&base, "csv"),
            Err(ProfileError::Gen(_))
        ));

        let _ = fs::remove_dir_all(base.parent().unwrap());
    }
}
