//! Parameters structure for drive control

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::ctrl::{FollowerGains, RamseteController, SimpleMotorFeedforward, VapidGains};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for drive control. Any value missing from the parameter file
/// takes the default for the competition drivebase.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Params {

    // ---- GEOMETRY ----

    /// Distance between the left and right wheels.
    ///
    /// Units: meters
    pub track_width_m: f64,

    // ---- CAPABILITIES ----

    /// Units: meters/second
    pub max_speed_ms: f64,

    /// Units: meters/second^2
    pub max_accel_mss: f64,

    // ---- OPERATOR DRIVE ----

    /// Scale applied to arcade duty cycle output
    pub arcade_scale: f64,

    /// Square arcade inputs for finer control at low demand
    pub arcade_squared_inputs: bool,

    /// Outputs smaller than this are zeroed
    pub deadband: f64,

    /// Below this throttle magnitude quick turn accumulates
    pub curvature_min_speed: f64,

    // ---- TRAJECTORY FOLLOWING ----

    /// Drivebase motor model, in volts
    pub feedforward: SimpleMotorFeedforward,

    /// Proportional gain on each side's wheel speed error
    ///
    /// Units: volts/(meters/second)
    pub traj_vel_k_p: f64,

    pub ramsete: RamseteController,

    // ---- POSITIONAL PID ----

    pub pid_gains: VapidGains,

    /// Maximum rate of change of the ramped speed
    ///
    /// Units: meters/second^2
    pub pid_max_jerk: f64,

    /// Smoothing of the target speed, between 0 (frozen) and 1 (unfiltered)
    pub pid_speed_alpha: f64,

    /// Scale from operator input to target speed
    ///
    /// Units: meters/second
    pub pid_speed_scale: f64,

    /// Scale from operator turn input to speed difference
    ///
    /// Units: meters/second
    pub pid_turn_scale: f64,

    // ---- SPLINE FOLLOWING ----

    pub follower_gains: FollowerGains,

    /// Time between trajectory segments, which must match the control period
    ///
    /// Units: seconds
    pub spline_dt_s: f64,

    /// Seconds between progress log messages
    pub spline_progress_period_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            track_width_m: 0.71,
            max_speed_ms: 4.0,
            max_accel_mss: 2.0,
            arcade_scale: 1.0,
            arcade_squared_inputs: true,
            deadband: 0.02,
            curvature_min_speed: 0.02,
            feedforward: SimpleMotorFeedforward::new(0.283, 2.49, 0.316),
            traj_vel_k_p: 0.01,
            ramsete: RamseteController::default(),
            pid_gains: VapidGains::default(),
            pid_max_jerk: 2.0,
            pid_speed_alpha: 0.2,
            pid_speed_scale: 1.0,
            pid_turn_scale: 1.0,
            follower_gains: FollowerGains::default(),
            spline_dt_s: 0.02,
            spline_progress_period_s: 0.5,
        }
    }
}
