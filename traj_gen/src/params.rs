//! # Trajectory Generator Executable Parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::{path::SAMPLES_HIGH, units::Unit};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecParams {
    /// Unit used for new models and for `.bot` files when none is given
    pub default_units: Unit,

    /// Number of dense samples taken along fitted paths
    #[serde(default = "default_sample_count")]
    pub sample_count: usize,

    /// Directory, relative to the software root, that sessions are created in
    pub sessions_dir: String,

    /// Maximum level of messages to log, one of "info", "debug" or "trace"
    pub log_level: String,
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn default_sample_count() -> usize {
    SAMPLES_HIGH
}
