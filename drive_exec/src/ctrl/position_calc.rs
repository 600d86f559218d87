//! Jerk-limited speed ramp.
//!
//! Takes a target speed for a wheel and calculates the position the encoder
//! would show had the wheel followed the ramped speed. Used as the setpoint
//! of a positional PID on each side of the robot.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use super::MIN_DT_S;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct PositionCalc {
    /// Ideal position
    position: f64,

    /// Ramped speed
    speed: f64,

    /// Acceleration applied over the last update
    accel: f64,

    target_speed: f64,

    /// Maximum change in speed per second. Named for the drivebase tunable it
    /// comes from, it limits the speed ramp rate.
    max_jerk: f64,

    last_time_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PositionCalc {
    pub fn new(initial_position: f64, initial_speed: f64, max_jerk: f64, time_s: f64) -> Self {
        Self {
            position: initial_position,
            speed: initial_speed,
            accel: 0.0,
            target_speed: initial_speed,
            max_jerk: max_jerk.abs(),
            last_time_s: time_s,
        }
    }

    /// Advance the ramp to `time_s` and return the new ideal position.
    ///
    /// The speed moves towards the target by at most `max_jerk * dt` without
    /// overshooting. A zero or negative `dt` leaves the ramp untouched.
    pub fn update(&mut self, time_s: f64) -> f64 {
        let dt = time_s - self.last_time_s;
        self.last_time_s = time_s;

        if dt <= MIN_DT_S {
            return self.position;
        }

        let last_speed = self.speed;
        let remaining = self.target_speed - self.speed;
        let dv = (dt * self.max_jerk).min(remaining.abs()) * remaining.signum();

        self.speed += dv;
        self.accel = dv / dt;

        // Integrate using the average speed over the period
        self.position += dt * (self.speed + last_speed) / 2.0;

        self.position
    }

    /// Set the speed to ramp towards.
    pub fn set_target_speed(&mut self, speed: f64) {
        self.target_speed = speed;
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn accel(&self) -> f64 {
        self.accel
    }

    pub fn target_speed(&self) -> f64 {
        self.target_speed
    }

    /// Restart the ramp from the given position and speed.
    pub fn reset(&mut self, position: f64, speed: f64, time_s: f64) {
        self.position = position;
        self.speed = speed;
        self.target_speed = speed;
        self.accel = 0.0;
        self.last_time_s = time_s;
    }
}
