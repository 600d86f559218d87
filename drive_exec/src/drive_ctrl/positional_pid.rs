//! Positional PID drive
//!
//! Takes a target speed and turn, and drives each side through a jerk limited
//! `PositionPid` so that the side keeps to its speed even when the robot is
//! hard to turn. Used for operator drive during tuning and by driver assist
//! modes which steer while the operator sets the speed.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, trace};
use std::rc::Rc;
use util::telemetry::Telemetry;

use super::{DriveCtrlError, DriveMotion, DriveRoutine, DriveRoutineParameters, Params};
use crate::clock::Clock;
use crate::ctrl::{LowPassFilter, PositionPid, Sensor, VapidGains};
use crate::inputs::{ContinuousRange, Switch};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// How long the finished condition must hold before the routine reports it
/// has finished.
///
/// Units: seconds
const FINISHED_HOLD_S: f64 = 1.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Tunables for a `PositionalPidDrive`.
#[derive(Debug, Clone, Copy)]
pub struct PositionalPidConfig {
    pub gains: VapidGains,

    /// Units: meters/second^2
    pub max_jerk: f64,

    /// Low pass filter constant applied to the target speed
    pub speed_alpha: f64,

    pub speed_scale: f64,
    pub turn_scale: f64,
}

/// Inputs polled by a `PositionalPidDrive` each cycle.
pub struct PositionalPidInputs {
    /// True when the routine has achieved what it was asked to do
    pub finished: Box<dyn Switch>,

    pub target_speed: Box<dyn ContinuousRange>,
    pub target_turn: Box<dyn ContinuousRange>,

    /// Encoder distances, meters
    pub left_distance: Sensor,
    pub right_distance: Sensor,
}

pub struct PositionalPidDrive {
    name: String,
    config: PositionalPidConfig,

    finished: Box<dyn Switch>,
    target_speed: Box<dyn ContinuousRange>,
    target_turn: Box<dyn ContinuousRange>,

    filtered_speed: LowPassFilter,

    left: PositionPid,
    right: PositionPid,

    clock: Rc<dyn Clock>,

    /// Last time the finished condition was false
    timestamp_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PositionalPidConfig {
    pub fn from_params(params: &Params) -> Self {
        Self {
            gains: params.pid_gains,
            max_jerk: params.pid_max_jerk,
            speed_alpha: params.pid_speed_alpha,
            speed_scale: params.pid_speed_scale,
            turn_scale: params.pid_turn_scale,
        }
    }
}

impl PositionalPidDrive {
    pub fn new(
        name: &str,
        config: PositionalPidConfig,
        inputs: PositionalPidInputs,
        clock: Rc<dyn Clock>,
        telemetry: &mut Telemetry,
    ) -> Self {
        let left = PositionPid::new(
            &format!("{}/left", name),
            config.gains,
            config.max_jerk,
            inputs.left_distance,
            clock.clone(),
            telemetry,
        );
        let right = PositionPid::new(
            &format!("{}/right", name),
            config.gains,
            config.max_jerk,
            inputs.right_distance,
            clock.clone(),
            telemetry,
        );

        Self {
            name: name.to_string(),
            config,
            finished: inputs.finished,
            target_speed: inputs.target_speed,
            target_turn: inputs.target_turn,
            filtered_speed: LowPassFilter::new(config.speed_alpha, 0.0),
            left,
            right,
            timestamp_s: clock.current_time(),
            clock,
        }
    }
}

impl DriveRoutine for PositionalPidDrive {
    /// Restart both sides from rest. The parameters carry nothing this
    /// routine needs.
    fn reset(&mut self, _params: &DriveRoutineParameters) -> Result<(), DriveCtrlError> {
        debug!("{}: starting positional PID drive", self.name);

        self.timestamp_s = self.clock.current_time();
        self.filtered_speed = LowPassFilter::new(self.config.speed_alpha, 0.0);
        self.left.reset();
        self.right.reset();

        Ok(())
    }

    fn get_motion(&mut self, _left_speed: f64, _right_speed: f64) -> DriveMotion {
        let speed = self.config.speed_scale * self.filtered_speed.update(self.target_speed.read());
        let turn = self.config.turn_scale * self.target_turn.read();

        let left = self.left.motor_power(speed + turn);
        let right = self.right.motor_power(speed - turn);

        if !self.finished.is_triggered() {
            self.timestamp_s = self.clock.current_time();
        }

        trace!("{}: left={:.3} right={:.3}", self.name, left, right);

        DriveMotion::new(left, right)
    }

    fn has_finished(&self) -> bool {
        self.clock.current_time() - self.timestamp_s > FINISHED_HOLD_S
    }

    fn name(&self) -> &str {
        &self.name
    }

    /// Nothing to do, output resumes on the next `reset`.
    fn enable(&mut self) {}

    fn disable(&mut self) {
        self.left.disable();
        self.right.disable();
    }
}
