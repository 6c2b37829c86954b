//! Host platform utility functions

use std::env;
use std::path::PathBuf;

/// Name of the environment variable pointing at the software root.
pub const SW_ROOT_ENV_VAR: &str = "TRAJ_GEN_ROOT";

/// Get the software root directory.
///
/// This is the directory containing `params/` and where session directories
/// are created. It is read from the `TRAJ_GEN_ROOT` environment variable, and
/// if that is not set the current working directory is used instead.
pub fn get_sw_root() -> std::io::Result<PathBuf> {
    match env::var_os(SW_ROOT_ENV_VAR) {
        Some(root) => Ok(PathBuf::from(root)),
        None => env::current_dir(),
    }
}
