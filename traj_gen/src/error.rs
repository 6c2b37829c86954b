//! # Errors
//!
//! Errors are split in two. [`GenError`] covers the numeric pipeline and is
//! cheap to clone so that the model can cache a failed generation alongside
//! successful ones. [`ProfileError`] covers everything at the model's
//! boundary (files, arguments) and wraps `GenError`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use thiserror::Error;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised by the fit, sample and modify pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenError {
    /// Fewer than two waypoints, or two consecutive coincident waypoints.
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    /// A kinematic scalar (dt, velocity, acceleration, jerk) is not strictly
    /// positive and finite.
    #[error("Infeasible limits: {0}")]
    InfeasibleLimits(String),
}

/// Errors raised at the boundary of the profile model.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error(transparent)]
    Gen(#[from] GenError),

    /// Unknown enum token, unknown export extension, malformed numeric field
    /// or out of range index.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO failure: {0}")]
    IoFailure(#[from] std::io::Error),

    /// The project or bot file is syntactically malformed.
    #[error("Parse failure: {0}")]
    ParseFailure(String),
}

impl From<util::archive::ArchiveError> for ProfileError {
    fn from(e: util::archive::ArchiveError) -> Self {
        ProfileError::IoFailure(e.into_io_error())
    }
}
