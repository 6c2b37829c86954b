//! # Profile model
//!
//! The model owns the kinematic configuration and the waypoints, and exposes
//! the source and wheel trajectories derived from them.
//!
//! Outputs are computed lazily. Every mutation clears the caches that depend
//! on the changed input, so an output read after a mutation always reflects
//! the current inputs:
//!
//! - the source trajectory depends on the waypoints, fit method, `dt`, the
//!   motion limits and the dense sample count,
//! - the wheel trajectories depend on the source, the drive base and the
//!   wheel base geometry.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, info};
use std::{
    cell::OnceCell,
    path::{Path, PathBuf},
};

use crate::{
    config::{DriveBase, FitMethod, KinematicConfig},
    error::{GenError, ProfileError},
    export::{self, ExportFormat},
    modifier::{modifier_for, WheelSet},
    path::{self, Waypoint, SAMPLES_HIGH},
    profile::{self, Trajectory},
    project,
    units::{self, Unit},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

type Cached<T> = OnceCell<Result<Option<T>, GenError>>;

/// Holds the generation inputs and caches the trajectories derived from
/// them.
#[derive(Debug, Clone)]
pub struct ProfileModel {
    config: KinematicConfig,

    waypoints: Vec<Waypoint>,

    /// Number of dense samples taken along the fitted path.
    sample_count: usize,

    /// Project file the model was last loaded from or saved to.
    working_project: Option<PathBuf>,

    source: Cached<Trajectory>,

    wheels: Cached<WheelSet>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ProfileModel {
    /// Create an empty model with the default configuration for `unit`.
    pub fn new(unit: Unit) -> Self {
        Self {
            config: KinematicConfig::defaults(unit),
            waypoints: Vec::new(),
            sample_count: SAMPLES_HIGH,
            working_project: None,
            source: OnceCell::new(),
            wheels: OnceCell::new(),
        }
    }

    // ---- CONFIGURATION ----

    pub fn config(&self) -> &KinematicConfig {
        &self.config
    }

    pub fn set_dt(&mut self, dt: f64) {
        self.config.dt = dt;
        self.invalidate_source();
    }

    pub fn set_max_vel(&mut self, max_vel: f64) {
        self.config.max_vel = max_vel;
        self.invalidate_source();
    }

    pub fn set_max_acc(&mut self, max_acc: f64) {
        self.config.max_acc = max_acc;
        self.invalidate_source();
    }

    pub fn set_max_jerk(&mut self, max_jerk: f64) {
        self.config.max_jerk = max_jerk;
        self.invalidate_source();
    }

    pub fn set_fit_method(&mut self, fit: FitMethod) {
        self.config.fit = fit;
        self.invalidate_source();
    }

    pub fn set_wheel_base_w(&mut self, wheel_base_w: f64) {
        self.config.wheel_base_w = wheel_base_w;
        self.invalidate_wheels();
    }

    pub fn set_wheel_base_d(&mut self, wheel_base_d: f64) {
        self.config.wheel_base_d = wheel_base_d;
        self.invalidate_wheels();
    }

    pub fn set_drive_base(&mut self, drive: DriveBase) {
        self.config.drive = drive;
        self.invalidate_wheels();
    }

    /// Change the unit every distance is expressed in.
    ///
    /// Waypoint coordinates and every distance based scalar are rescaled so
    /// that they describe the same physical motion, then rounded to 4
    /// decimal places. Setting the current unit does nothing.
    pub fn set_unit(&mut self, unit: Unit) {
        let from = self.config.unit;

        if from == unit {
            return;
        }

        debug!("Converting model from {} to {}", from, unit);

        self.config = self.config.converted(unit);

        for wp in self.waypoints.iter_mut() {
            wp.x = units::convert(wp.x, from, unit);
            wp.y = units::convert(wp.y, from, unit);
        }

        self.invalidate_source();
    }

    /// Reset the configuration to the defaults for `unit`, keeping the
    /// waypoints as they are.
    pub fn set_default_values(&mut self, unit: Unit) {
        self.config = KinematicConfig::defaults(unit);
        self.invalidate_source();
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn set_sample_count(&mut self, sample_count: usize) {
        self.sample_count = sample_count;
        self.invalidate_source();
    }

    // ---- WAYPOINTS ----

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn num_waypoints(&self) -> usize {
        self.waypoints.len()
    }

    pub fn add_waypoint(&mut self, waypoint: Waypoint) {
        self.waypoints.push(waypoint);
        self.invalidate_source();
    }

    /// Insert a waypoint before `index`, or at the end if `index` equals the
    /// number of waypoints.
    pub fn insert_waypoint(&mut self, index: usize, waypoint: Waypoint) -> Result<(), ProfileError> {
        if index > self.waypoints.len() {
            return Err(self.index_error(index));
        }

        self.waypoints.insert(index, waypoint);
        self.invalidate_source();
        Ok(())
    }

    /// Replace the waypoint at `index`.
    pub fn edit_waypoint(&mut self, index: usize, waypoint: Waypoint) -> Result<(), ProfileError> {
        match self.waypoints.get_mut(index) {
            Some(wp) => *wp = waypoint,
            None => return Err(self.index_error(index)),
        }

        self.invalidate_source();
        Ok(())
    }

    pub fn remove_waypoint(&mut self, index: usize) -> Result<Waypoint, ProfileError> {
        if index >= self.waypoints.len() {
            return Err(self.index_error(index));
        }

        let removed = self.waypoints.remove(index);
        self.invalidate_source();
        Ok(removed)
    }

    /// Remove the last waypoint, returning `None` if there are none.
    pub fn remove_last_waypoint(&mut self) -> Option<Waypoint> {
        let removed = self.waypoints.pop();

        if removed.is_some() {
            self.invalidate_source();
        }

        removed
    }

    /// Remove the waypoints from `first` to `last` inclusive.
    pub fn remove_waypoints(&mut self, first: usize, last: usize) -> Result<(), ProfileError> {
        if first > last {
            return Err(ProfileError::InvalidArgument(format!(
                "Waypoint range {}..={} is reversed",
                first, last
            )));
        }
        if last >= self.waypoints.len() {
            return Err(self.index_error(last));
        }

        self.waypoints.drain(first..=last);
        self.invalidate_source();
        Ok(())
    }

    pub fn clear_waypoints(&mut self) {
        self.waypoints.clear();
        self.invalidate_source();
    }

    // ---- OUTPUTS ----

    /// The centroid trajectory, or `None` if there are fewer than 2
    /// waypoints.
    pub fn source_trajectory(&self) -> Result<Option<&Trajectory>, GenError> {
        match self.source.get_or_init(|| self.generate_source()) {
            Ok(traj) => Ok(traj.as_ref()),
            Err(e) => Err(e.clone()),
        }
    }

    /// Front left wheel for swerve, left wheel for tank.
    pub fn front_left(&self) -> Result<Option<&Trajectory>, GenError> {
        Ok(self.wheels()?.map(|w| &w.front_left))
    }

    /// Front right wheel for swerve, right wheel for tank.
    pub fn front_right(&self) -> Result<Option<&Trajectory>, GenError> {
        Ok(self.wheels()?.map(|w| &w.front_right))
    }

    /// Back left wheel, always `None` for tank.
    pub fn back_left(&self) -> Result<Option<&Trajectory>, GenError> {
        Ok(self.wheels()?.and_then(|w| w.back_left.as_ref()))
    }

    /// Back right wheel, always `None` for tank.
    pub fn back_right(&self) -> Result<Option<&Trajectory>, GenError> {
        Ok(self.wheels()?.and_then(|w| w.back_right.as_ref()))
    }

    /// The outputs to export, named by the suffix used in file names.
    ///
    /// The source is listed first when `with_source` is set, followed by the
    /// wheels.
    pub fn named_outputs(&self, with_source: bool) -> Result<Vec<(&'static str, &Trajectory)>, ProfileError> {
        let source = self.source_trajectory()?.ok_or_else(|| {
            GenError::DegenerateInput(format!(
                "At least 2 waypoints are required, found {}",
                self.waypoints.len()
            ))
        })?;

        let mut outputs = Vec::with_capacity(5);

        if with_source {
            outputs.push(("source", source));
        }

        if let Some(wheels) = self.wheels()? {
            match self.config.drive {
                DriveBase::Tank => {
                    outputs.push(("left", &wheels.front_left));
                    outputs.push(("right", &wheels.front_right));
                }
                DriveBase::Swerve => {
                    outputs.push(("fl", &wheels.front_left));
                    outputs.push(("fr", &wheels.front_right));
                    if let Some(bl) = wheels.back_left.as_ref() {
                        outputs.push(("bl", bl));
                    }
                    if let Some(br) = wheels.back_right.as_ref() {
                        outputs.push(("br", br));
                    }
                }
            }
        }

        Ok(outputs)
    }

    // ---- FILES ----

    /// Replace the model's inputs with the contents of a project file.
    ///
    /// The model is left unchanged if the file can't be read or parsed.
    pub fn load_project<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ProfileError> {
        let path = path.as_ref();
        let (config, waypoints) = project::read_project(path)?;

        info!(
            "Loaded project {:?}: {} waypoints, {} drive",
            path,
            waypoints.len(),
            config.drive
        );

        self.config = config;
        self.waypoints = waypoints;
        self.working_project = Some(path.to_path_buf());
        self.invalidate_source();

        Ok(())
    }

    /// Save the model to a new project file and make it the working project.
    ///
    /// `.xml` is appended if the path doesn't already end with it, and
    /// missing parent directories are created. Returns the path written.
    pub fn save_project_as<P: AsRef<Path>>(&mut self, path: P) -> Result<PathBuf, ProfileError> {
        let path = project::with_project_extension(path.as_ref());

        project::write_project(&path, &self.config, &self.waypoints)?;
        info!("Saved project to {:?}", path);

        self.working_project = Some(path.clone());
        Ok(path)
    }

    /// Save the model to the working project.
    pub fn save_working_project(&self) -> Result<(), ProfileError> {
        let path = self.working_project.as_ref().ok_or_else(|| {
            ProfileError::InvalidArgument("There is no working project to save to".into())
        })?;

        project::write_project(path, &self.config, &self.waypoints)?;
        info!("Saved working project {:?}", path);

        Ok(())
    }

    pub fn has_working_project(&self) -> bool {
        self.working_project.is_some()
    }

    pub fn working_project(&self) -> Option<&Path> {
        self.working_project.as_deref()
    }

    /// Forget the working project.
    pub fn clear_working_files(&mut self) {
        self.working_project = None;
    }

    /// Replace the model's inputs with the contents of a legacy `.bot` file.
    ///
    /// `.bot` files carry no unit, so every value is taken to be in `unit`.
    /// The working project is forgotten.
    pub fn import_bot_file<P: AsRef<Path>>(&mut self, path: P, unit: Unit) -> Result<(), ProfileError> {
        let path = path.as_ref();
        let (config, waypoints) = project::bot::read_bot(path, unit)?;

        info!("Imported {:?}: {} waypoints", path, waypoints.len());

        self.config = config;
        self.waypoints = waypoints;
        self.working_project = None;
        self.invalidate_source();

        Ok(())
    }

    /// Export the source and wheel trajectories in the Jaci family of
    /// formats. `ext` selects `csv` or `traj`.
    pub fn export_jaci<P: AsRef<Path>>(&self, base: P, ext: &str) -> Result<Vec<PathBuf>, ProfileError> {
        let format: ExportFormat = ext.parse()?;
        let outputs = self.named_outputs(true)?;

        export::export_jaci(base.as_ref(), format, &outputs)
    }

    /// Export the wheel trajectories in the Talon family of formats. `ext`
    /// selects `csv` or `traj`, only the `traj` format includes the source.
    pub fn export_talon<P: AsRef<Path>>(&self, base: P, ext: &str) -> Result<Vec<PathBuf>, ProfileError> {
        let format: ExportFormat = ext.parse()?;
        let outputs = self.named_outputs(format == ExportFormat::Traj)?;

        export::export_talon(base.as_ref(), format, &outputs)
    }

    // ---- PRIVATE ----

    fn wheels(&self) -> Result<Option<&WheelSet>, GenError> {
        match self.wheels.get_or_init(|| self.generate_wheels()) {
            Ok(wheels) => Ok(wheels.as_ref()),
            Err(e) => Err(e.clone()),
        }
    }

    fn generate_source(&self) -> Result<Option<Trajectory>, GenError> {
        if self.waypoints.len() < 2 {
            return Ok(None);
        }

        let fitted = path::fit(&self.waypoints, self.config.fit, self.sample_count)?;
        let traj = profile::generate(&fitted, &self.config)?;

        debug!(
            "Generated source trajectory: {} segments over {:.3} s",
            traj.len(),
            traj.total_time()
        );

        Ok(Some(traj))
    }

    fn generate_wheels(&self) -> Result<Option<WheelSet>, GenError> {
        Ok(self
            .source_trajectory()?
            .map(|source| modifier_for(&self.config).apply(source)))
    }

    fn invalidate_source(&mut self) {
        self.source.take();
        self.invalidate_wheels();
    }

    fn invalidate_wheels(&mut self) {
        self.wheels.take();
    }

    fn index_error(&self, index: usize) -> ProfileError {
        ProfileError::InvalidArgument(format!(
            "Waypoint index {} out of range, there are {} waypoints",
            index,
            self.waypoints.len()
        ))
    }
}

impl Default for ProfileModel {
    fn default() -> Self {
        Self::new(Unit::default())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::path::SAMPLES_LOW;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    /// Two point tank model in feet.
    fn straight_model() -> ProfileModel {
        let mut model = ProfileModel::new(Unit::Feet);
        model.set_sample_count(SAMPLES_LOW);
        model.set_wheel_base_w(2.0);
        model.add_waypoint(Waypoint::new(0.0, 0.0, 0.0));
        model.add_waypoint(Waypoint::new(10.0, 0.0, 0.0));
        model
    }

    #[test]
    fn test_two_point_tank() {
        let model = straight_model();

        let source = model.source_trajectory().unwrap().unwrap();
        let last = source.last().unwrap();
        assert_abs_diff_eq!(last.position, 10.0, epsilon = 1e-3);
        assert_eq!(last.velocity, 0.0);

        // The fastest jerk limited profile for these limits takes
        // L/v + v/a + a/j seconds.
        assert_abs_diff_eq!(source.total_time(), 10.0 / 4.0 + 4.0 / 3.0 + 3.0 / 60.0, epsilon = 1e-3);

        let left = model.front_left().unwrap().unwrap();
        let right = model.front_right().unwrap().unwrap();
        assert!(left.segments().iter().all(|s| (s.y - 1.0).abs() < 1e-12));
        assert!(right.segments().iter().all(|s| (s.y + 1.0).abs() < 1e-12));

        assert!(model.back_left().unwrap().is_none());
        assert!(model.back_right().unwrap().is_none());
    }

    #[test]
    fn test_absent_below_two_waypoints() {
        let mut model = ProfileModel::new(Unit::Feet);
        assert!(model.source_trajectory().unwrap().is_none());

        model.add_waypoint(Waypoint::new(0.0, 0.0, 0.0));
        assert!(model.source_trajectory().unwrap().is_none());
        assert!(model.front_left().unwrap().is_none());

        // Even with infeasible limits
        model.set_dt(0.0);
        assert!(model.source_trajectory().unwrap().is_none());
    }

    #[test]
    fn test_infeasible() {
        let mut model = straight_model();
        model.set_dt(0.0);

        assert!(matches!(
            model.source_trajectory(),
            Err(GenError::InfeasibleLimits(_))
        ));
        assert!(matches!(model.front_left(), Err(GenError::InfeasibleLimits(_))));

        model.set_dt(0.05);
        assert!(model.source_trajectory().unwrap().is_some());
    }

    #[test]
    fn test_mutation_invalidates() {
        let mut model = straight_model();
        let before = model.source_trajectory().unwrap().unwrap().len();

        model.set_max_vel(2.0);
        let after = model.source_trajectory().unwrap().unwrap().len();
        assert!(after > before);

        // Geometry only touches the wheels
        let src_time = model.source_trajectory().unwrap().unwrap().total_time();
        model.set_wheel_base_w(4.0);
        assert_eq!(
            model.source_trajectory().unwrap().unwrap().total_time(),
            src_time
        );
        let left = model.front_left().unwrap().unwrap();
        assert_abs_diff_eq!(left.first().unwrap().y, 2.0, epsilon = 1e-12);

        model.set_drive_base(DriveBase::Swerve);
        assert!(model.back_left().unwrap().is_some());

        model.remove_last_waypoint();
        assert!(model.source_trajectory().unwrap().is_none());
        assert!(model.back_left().unwrap().is_none());
    }

    #[test]
    fn test_unit_change() {
        let mut model = ProfileModel::new(Unit::Feet);
        assert_eq!(model.config().max_vel, 4.0);

        model.set_unit(Unit::Meters);
        assert_eq!(model.config().max_vel, 1.2192);
        assert_eq!(model.config().unit, Unit::Meters);
    }

    #[test]
    fn test_unit_change_idempotent() {
        let mut model = straight_model();
        model.add_waypoint(Waypoint::new(12.3456, -7.891, FRAC_PI_2));
        let config = *model.config();
        let waypoints = model.waypoints().to_vec();

        model.set_unit(Unit::Feet);
        assert_eq!(*model.config(), config);
        assert_eq!(model.waypoints(), &waypoints[..]);

        model.set_unit(Unit::Inches);
        model.set_unit(Unit::Feet);

        let round = |v: f64| util::maths::round(v, 4);
        assert_eq!(model.config().max_vel, round(config.max_vel));
        assert_eq!(model.config().max_acc, round(config.max_acc));
        assert_eq!(model.config().max_jerk, round(config.max_jerk));
        assert_eq!(model.config().wheel_base_w, round(config.wheel_base_w));
        assert_eq!(model.config().wheel_base_d, round(config.wheel_base_d));
        assert_eq!(model.config().dt, config.dt);

        for (now, then) in model.waypoints().iter().zip(waypoints.iter()) {
            assert_eq!(now.x, round(then.x));
            assert_eq!(now.y, round(then.y));
            assert_eq!(now.angle_rad, then.angle_rad);
        }
    }

    #[test]
    fn test_waypoint_editing() {
        let mut model = ProfileModel::new(Unit::Feet);
        for i in 0..5 {
            model.add_waypoint(Waypoint::new(i as f64, 0.0, 0.0));
        }

        model.insert_waypoint(0, Waypoint::new(-1.0, 0.0, 0.0)).unwrap();
        assert_eq!(model.waypoints()[0].x, -1.0);
        assert_eq!(model.num_waypoints(), 6);

        model.edit_waypoint(5, Waypoint::new(9.0, 1.0, 0.0)).unwrap();
        assert_eq!(model.waypoints()[5].x, 9.0);

        assert_eq!(model.remove_waypoint(0).unwrap().x, -1.0);

        model.remove_waypoints(1, 2).unwrap();
        let xs: Vec<f64> = model.waypoints().iter().map(|w| w.x).collect();
        assert_eq!(xs, vec![0.0, 3.0, 9.0]);

        // Out of range indices leave the model unchanged
        assert!(matches!(
            model.insert_waypoint(4, Waypoint::default()),
            Err(ProfileError::InvalidArgument(_))
        ));
        assert!(matches!(
            model.edit_waypoint(3, Waypoint::default()),
            Err(ProfileError::InvalidArgument(_))
        ));
        assert!(model.remove_waypoint(3).is_err());
        assert!(model.remove_waypoints(2, 1).is_err());
        assert!(model.remove_waypoints(0, 3).is_err());
        assert_eq!(model.num_waypoints(), 3);

        model.clear_waypoints();
        assert_eq!(model.num_waypoints(), 0);
        assert!(model.remove_last_waypoint().is_none());
    }

    #[test]
    fn test_default_values() {
        let mut model = straight_model();
        model.set_max_jerk(1.0);
        model.set_default_values(Unit::Inches);

        assert_eq!(*model.config(), KinematicConfig::defaults(Unit::Inches));
        assert_eq!(model.num_waypoints(), 2);
    }

    #[test]
    fn test_named_outputs() {
        let mut model = straight_model();

        let names: Vec<&str> = model.named_outputs(true).unwrap().iter().map(|o| o.0).collect();
        assert_eq!(names, vec!["source", "left", "right"]);

        model.set_drive_base(DriveBase::Swerve);
        let names: Vec<&str> = model.named_outputs(false).unwrap().iter().map(|o| o.0).collect();
        assert_eq!(names, vec!["fl", "fr", "bl", "br"]);

        model.clear_waypoints();
        assert!(matches!(
            model.named_outputs(true),
            Err(ProfileError::Gen(GenError::DegenerateInput(_)))
        ));
    }

    #[test]
    fn test_save_without_working_project() {
        let model = straight_model();
        assert!(!model.has_working_project());
        assert!(matches!(
            model.save_working_project(),
            Err(ProfileError::InvalidArgument(_))
        ));
    }
}
