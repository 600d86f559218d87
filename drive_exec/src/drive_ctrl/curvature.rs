//! Curvature drive
//!
//! Steering input sets the curvature of the robot's path rather than its turn
//! rate, so turns feel the same at any speed. Holding quick turn at low
//! throttle lets the robot pivot on the spot.
//!
//! Pivoting builds up a quick stop accumulator. When normal driving resumes the
//! accumulator is subtracted from the steering and decays back to zero,
//! countering the robot's tendency to keep rotating after a pivot.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use util::{
    maths::limit,
    telemetry::{Probe, Telemetry},
};

use super::{DriveMotion, DriveRoutine};
use crate::inputs::{ContinuousRange, Switch};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Smoothing applied to the accumulator while pivoting.
const QUICK_STOP_ALPHA: f64 = 0.1;

/// Gain from wheel input to the accumulator while pivoting.
const QUICK_STOP_SCALAR: f64 = 2.0;

/// Most the accumulator decays by in a single cycle.
const QUICK_STOP_DECAY: f64 = 1.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Operator curvature ("cheesy") drive.
pub struct CurvatureDrive {
    throttle: Box<dyn ContinuousRange>,
    wheel: Box<dyn ContinuousRange>,
    quick_turn: Box<dyn Switch>,

    /// Throttle magnitude below which quick turn builds the accumulator
    min_speed: f64,

    quick_stop_accumulator: f64,
    accumulator_probe: Probe,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CurvatureDrive {
    pub fn new(
        throttle: Box<dyn ContinuousRange>,
        wheel: Box<dyn ContinuousRange>,
        quick_turn: Box<dyn Switch>,
        min_speed: f64,
        telemetry: &mut Telemetry,
    ) -> Self {
        let accumulator_probe = Probe::new();
        telemetry.register(
            false,
            accumulator_probe.source(),
            "Drive/Curvature/quickStopAccumulator",
        );

        Self {
            throttle,
            wheel,
            quick_turn,
            min_speed,
            quick_stop_accumulator: 0.0,
            accumulator_probe,
        }
    }

    pub fn quick_stop_accumulator(&self) -> f64 {
        self.quick_stop_accumulator
    }
}

impl DriveRoutine for CurvatureDrive {
    fn get_motion(&mut self, _left_speed: f64, _right_speed: f64) -> DriveMotion {
        let wheel = limit(self.wheel.read());
        let throttle = limit(self.throttle.read());

        let over_power;
        let angular_power;

        if self.quick_turn.is_triggered() {
            if throttle.abs() < self.min_speed {
                self.quick_stop_accumulator = (1.0 - QUICK_STOP_ALPHA) * self.quick_stop_accumulator
                    + QUICK_STOP_ALPHA * wheel * QUICK_STOP_SCALAR;
            }
            over_power = 1.0;
            angular_power = wheel;
        }
        else {
            over_power = 0.0;
            angular_power = throttle.abs() * wheel - self.quick_stop_accumulator;

            self.quick_stop_accumulator = if self.quick_stop_accumulator > QUICK_STOP_DECAY {
                self.quick_stop_accumulator - QUICK_STOP_DECAY
            } else if self.quick_stop_accumulator < -QUICK_STOP_DECAY {
                self.quick_stop_accumulator + QUICK_STOP_DECAY
            } else {
                0.0
            };
        }

        let mut left = throttle + angular_power;
        let mut right = throttle - angular_power;

        // Move any excess onto the other side, only while quick turning
        if left > 1.0 {
            right -= over_power * (left - 1.0);
            left = 1.0;
        } else if right > 1.0 {
            left -= over_power * (right - 1.0);
            right = 1.0;
        } else if left < -1.0 {
            right += over_power * (-1.0 - left);
            left = -1.0;
        } else if right < -1.0 {
            left += over_power * (-1.0 - right);
            right = -1.0;
        }

        self.accumulator_probe.set(self.quick_stop_accumulator);
        trace!(
            "Curvature: throttle {:.3} wheel {:.3} acc {:.3}",
            throttle, wheel, self.quick_stop_accumulator
        );

        DriveMotion::new(limit(left), limit(right))
    }

    fn has_finished(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "Curvature"
    }
}
