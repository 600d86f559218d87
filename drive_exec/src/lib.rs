//! # Drive library.
//!
//! This library holds the drive-motion control layer: the interchangeable
//! drive routines which turn operator or trajectory inputs into left/right
//! motor demands, the control building blocks they share, and the registry
//! which switches between them.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Time sources used by the routines
pub mod clock;

/// Control building blocks - PID, feedforward, RAMSETE, jerk-limited ramps
pub mod ctrl;

/// Drive control module - the drive routines and the registry which selects between them
pub mod drive_ctrl;

/// Operator input sources
pub mod inputs;

/// Localisation - pose types and the location interface
pub mod loc;

/// Executable parameters
pub mod params;

/// Simulated drivebase used by the executable in place of hardware
pub mod sim;

/// Trajectories - time-indexed paths, generation and caching
pub mod traj;
