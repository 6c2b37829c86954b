//! # Trajectory Generator
//!
//! Command line front end to the trajectory generation library. Loads
//! project files, summarises and exports the trajectories they describe,
//! and converts legacy `.bot` files and units.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::path::PathBuf;

use color_eyre::{eyre::WrapErr, Result};
use log::{info, warn};
use structopt::StructOpt;

use traj_lib::{
    params::ExecParams,
    profile::ProfileElement,
    ProfileModel, Trajectory, Unit,
};
use util::{
    logger::{logger_init, parse_level},
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Generate robot trajectories from project files.
#[derive(Debug, StructOpt)]
#[structopt(name = "traj_gen")]
enum Cmd {
    /// Load a project and log a summary of every trajectory it produces.
    #[structopt(name = "info")]
    Info {
        /// Path to the project file.
        project: PathBuf,
    },

    /// Load a project and export its trajectories.
    #[structopt(name = "export")]
    Export {
        /// Path to the project file.
        project: PathBuf,

        /// Base path of the exported files, a suffix is appended for each
        /// trajectory.
        base: PathBuf,

        /// Export in the Talon family rather than the Jaci family.
        #[structopt(long)]
        talon: bool,

        /// File format, either `csv` or `traj`.
        #[structopt(long, default_value = "csv")]
        ext: String,
    },

    /// Convert a legacy `.bot` file into a project file.
    #[structopt(name = "import-bot")]
    ImportBot {
        /// Path to the `.bot` file.
        bot: PathBuf,

        /// Unit the `.bot` file's values are in, one of FEET, INCHES or
        /// METERS.
        units: Unit,

        /// Path of the project file to write.
        out: PathBuf,
    },

    /// Rescale a project into a different unit.
    #[structopt(name = "convert")]
    Convert {
        /// Path to the project file.
        project: PathBuf,

        /// Unit to convert to, one of FEET, INCHES or METERS.
        units: Unit,

        /// Path of the project file to write, the input project is
        /// overwritten if not given.
        out: Option<PathBuf>,
    },
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    let cmd = Cmd::from_args();

    // ---- EARLY INITIALISATION ----

    let params: ExecParams =
        util::params::load("traj_gen.toml").wrap_err("Could not load traj_gen params")?;

    let session = Session::new("traj_gen", &params.sessions_dir)
        .wrap_err("Failed to create the session")?;

    let level = parse_level(&params.log_level).wrap_err("Invalid log level in traj_gen params")?;
    logger_init(level, &session).wrap_err("Failed to initialise logging")?;

    info!("Trajectory Generator\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- EXECUTE ----

    let mut model = ProfileModel::new(params.default_units);
    model.set_sample_count(params.sample_count);

    match cmd {
        Cmd::Info { project } => {
            model
                .load_project(&project)
                .wrap_err_with(|| format!("Failed to load project {:?}", project))?;

            log_summary(&model);
        }
        Cmd::Export {
            project,
            base,
            talon,
            ext,
        } => {
            model
                .load_project(&project)
                .wrap_err_with(|| format!("Failed to load project {:?}", project))?;

            let written = if talon {
                model.export_talon(&base, &ext)
            } else {
                model.export_jaci(&base, &ext)
            }
            .wrap_err("Failed to export trajectories")?;

            for path in written.iter() {
                info!("Wrote {:?}", path);
            }
        }
        Cmd::ImportBot { bot, units, out } => {
            model
                .import_bot_file(&bot, units)
                .wrap_err_with(|| format!("Failed to import {:?}", bot))?;

            let path = model
                .save_project_as(&out)
                .wrap_err("Failed to save the imported project")?;

            info!("Imported {:?} into {:?}", bot, path);
        }
        Cmd::Convert {
            project,
            units,
            out,
        } => {
            model
                .load_project(&project)
                .wrap_err_with(|| format!("Failed to load project {:?}", project))?;

            let from = model.config().unit;
            model.set_unit(units);

            match out {
                Some(out) => {
                    model
                        .save_project_as(&out)
                        .wrap_err("Failed to save the converted project")?;
                }
                None => model
                    .save_working_project()
                    .wrap_err("Failed to save the converted project")?,
            }

            info!("Converted {:?} from {} to {}", project, from, units);
        }
    }

    Ok(())
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Log the configuration and a summary of every output trajectory.
fn log_summary(model: &ProfileModel) {
    let config = model.config();

    info!(
        "{} waypoints, {} fit, {} drive, units: {}",
        model.num_waypoints(),
        config.fit,
        config.drive,
        config.unit
    );
    info!(
        "dt {} s, max vel {}, max acc {}, max jerk {}, wheel base {} x {}",
        config.dt,
        config.max_vel,
        config.max_acc,
        config.max_jerk,
        config.wheel_base_w,
        config.wheel_base_d
    );

    let outputs = match model.named_outputs(true) {
        Ok(o) => o,
        Err(e) => {
            warn!("No trajectories generated: {}", e);
            return;
        }
    };

    for (name, traj) in outputs.iter() {
        log_trajectory(name, traj);
    }
}

fn log_trajectory(name: &str, traj: &Trajectory) {
    info!(
        "{}: {} segments over {:.3} s",
        name,
        traj.len(),
        traj.total_time()
    );

    let last = match traj.last() {
        Some(s) => s,
        None => return,
    };

    for element in ProfileElement::ALL.iter() {
        let peak = traj
            .segments()
            .iter()
            .map(|s| s.element(*element).abs())
            .fold(0.0, f64::max);

        info!(
            "    {:>12}: final {:>10.4}, peak |{:.4}|",
            element.label(),
            last.element(*element),
            peak
        );
    }
}
