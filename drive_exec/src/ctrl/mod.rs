//! # Control building blocks
//!
//! The controllers in this module are shared by the drive routines. None of
//! them read the clock themselves except `PositionPid`; everything else is
//! handed an explicit `dt` so that behaviour under clock anomalies (zero or
//! negative `dt`) is decided in one place per controller.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod encoder_follower;
pub mod feedforward;
pub mod kinematics;
pub mod low_pass;
pub mod pid;
pub mod position_calc;
pub mod position_pid;
pub mod ramsete;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use encoder_follower::{EncoderFollower, FollowerGains};
pub use feedforward::SimpleMotorFeedforward;
pub use kinematics::{ChassisSpeeds, DifferentialDriveKinematics, WheelSpeeds};
pub use low_pass::LowPassFilter;
pub use pid::PidController;
pub use position_calc::PositionCalc;
pub use position_pid::{PositionPid, VapidGains};
pub use ramsete::RamseteController;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Smallest time step treated as a real step. Anything at or below this is
/// considered a clock anomaly and doesn't advance integrators or estimate
/// rates.
///
/// Units: seconds
pub const MIN_DT_S: f64 = 1e-6;

// ---------------------------------------------------------------------------
// TYPES
// ---------------------------------------------------------------------------

/// A measurement source, such as a wheel encoder distance or speed.
pub type Sensor = Box<dyn Fn() -> f64>;
