//! # Drive control module
//!
//! Drive routines turn operator or trajectory inputs into a pair of left and
//! right motor demands. Exactly one routine is active at a time, selected
//! through the `DriveRoutineRegistry` which owns every routine for the life of
//! the executable.
//!
//! Every routine is polled once per control cycle on the control thread and
//! must not block.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod arcade;
mod cmd;
mod constant;
mod curvature;
mod deadband;
mod motion;
mod params;
mod positional_pid;
mod registry;
mod spline_drive;
mod trajectory_drive;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use arcade::*;
pub use cmd::*;
pub use constant::*;
pub use curvature::*;
pub use deadband::*;
pub use motion::*;
pub use params::*;
pub use positional_pid::*;
pub use registry::*;
pub use spline_drive::*;
pub use trajectory_drive::*;

use crate::traj::TrajError;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A drive strategy.
///
/// Routines are constructed once at startup with their input sources, then
/// `reset` each time they become active, polled through `get_motion` each
/// cycle while active, and `disable`d when superseded.
pub trait DriveRoutine {
    /// Take on new parameters, reinitialising any internal state.
    ///
    /// Parameters which belong to a different routine are rejected.
    fn reset(&mut self, _params: &DriveRoutineParameters) -> Result<(), DriveCtrlError> {
        Ok(())
    }

    /// Calculate the demand for each side given the current wheel speeds in
    /// meters/second.
    fn get_motion(&mut self, left_speed: f64, right_speed: f64) -> DriveMotion;

    /// True once there's nothing more for the routine to do. Continuous
    /// routines such as operator drive are always finished.
    fn has_finished(&self) -> bool;

    fn name(&self) -> &str;

    /// Activate the routine, assuming the robot is where it should be.
    fn enable(&mut self) {}

    /// Prepare for deactivation. May be called before `enable`.
    fn disable(&mut self) {}
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur in drive control.
#[derive(Debug, thiserror::Error)]
pub enum DriveCtrlError {
    #[error("No drive routine registered for {0:?}")]
    UnregisteredRoutine(DriveRoutineType),

    #[error("The {routine} routine cannot take {params} parameters")]
    UnsupportedParameters { routine: String, params: String },

    #[error("The {0} routine needs at least two waypoints")]
    TooFewWaypoints(String),

    #[error("Could not generate the trajectory: {0}")]
    TrajError(#[from] TrajError),
}
