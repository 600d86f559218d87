//! # Position PID
//!
//! Per-side closed loop controller which tracks a target speed without
//! exceeding a maximum jerk. The target speed is ramped by a `PositionCalc`,
//! whose integrated position is the setpoint of a distance PID loop. The
//! ramped speed and acceleration are also fed forward through `kV` and `kA`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use util::{maths::limit, telemetry::{Probe, Telemetry}};

use super::{PidController, PositionCalc, Sensor};
use crate::clock::Clock;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Velocity, acceleration and PID gains.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VapidGains {
    pub k_v: f64,
    pub k_a: f64,
    pub k_p: f64,
    pub k_i: f64,
    pub k_d: f64,

    /// Magnitude limit on the integral accumulation
    pub integral_limit: f64,
}

pub struct PositionPid {
    state: PidState,

    gains: VapidGains,

    ramp: PositionCalc,

    pid: PidController,

    /// Distance travelled by this side
    ///
    /// Units: meters
    distance: Sensor,

    clock: Rc<dyn Clock>,

    last_time_s: f64,

    probes: PidProbes,
}

struct PidProbes {
    target: Probe,
    ramped: Probe,
    setpoint: Probe,
    error: Probe,
    output: Probe,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PidState {
    Enabled,
    Disabled,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for VapidGains {
    fn default() -> Self {
        Self {
            k_v: 0.018,
            k_a: 0.0,
            k_p: 0.0125,
            k_i: 0.0,
            k_d: 0.5,
            integral_limit: 1.0,
        }
    }
}

impl PositionPid {
    /// Create a new controller, initially disabled.
    ///
    /// Probes are registered with the telemetry sink under `Drive/<name>/`.
    pub fn new(
        name: &str,
        gains: VapidGains,
        max_jerk: f64,
        distance: Sensor,
        clock: Rc<dyn Clock>,
        telemetry: &mut Telemetry,
    ) -> Self {
        let now = clock.current_time();

        let probes = PidProbes {
            target: Probe::new(),
            ramped: Probe::new(),
            setpoint: Probe::new(),
            error: Probe::new(),
            output: Probe::new(),
        };

        telemetry
            .register(false, probes.target.source(), format!("Drive/{}/targetSpeed", name))
            .register(false, probes.ramped.source(), format!("Drive/{}/rampedSpeed", name))
            .register(false, probes.setpoint.source(), format!("Drive/{}/setpoint", name))
            .register(false, probes.error.source(), format!("Drive/{}/error", name))
            .register(true, probes.output.source(), format!("Drive/{}/output", name));

        Self {
            state: PidState::Disabled,
            gains,
            ramp: PositionCalc::new(0.0, 0.0, max_jerk, now),
            pid: PidController::new(gains.k_p, gains.k_i, gains.k_d)
                .with_integral_limit(gains.integral_limit),
            distance,
            clock,
            last_time_s: now,
            probes,
        }
    }

    /// Get the motor power needed to follow `target_speed`, in `[-1, 1]`.
    ///
    /// Returns zero while disabled.
    pub fn motor_power(&mut self, target_speed: f64) -> f64 {
        if self.state == PidState::Disabled {
            return 0.0;
        }

        let now = self.clock.current_time();
        let dt = now - self.last_time_s;
        self.last_time_s = now;

        self.ramp.set_target_speed(target_speed);
        let setpoint = self.ramp.update(now);

        let error = setpoint - (self.distance)();
        let feedback = self.pid.get(error, dt);

        let output = limit(
            self.gains.k_v * self.ramp.speed()
            + self.gains.k_a * self.ramp.accel()
            + feedback
        );

        trace!(
            "PositionPid target {:.3} ramped {:.3} error {:.4} -> {:.3}",
            target_speed, self.ramp.speed(), error, output
        );

        self.probes.target.set(target_speed);
        self.probes.ramped.set(self.ramp.speed());
        self.probes.setpoint.set(setpoint);
        self.probes.error.set(error);
        self.probes.output.set(output);

        output
    }

    /// Enable the controller and restart the ramp from the measured distance
    /// at rest.
    pub fn reset(&mut self) {
        let now = self.clock.current_time();

        self.ramp.reset((self.distance)(), 0.0, now);
        self.pid.reset();
        self.last_time_s = now;
        self.state = PidState::Enabled;
    }

    /// Halt output. The ramp is kept, output only resumes after `reset`.
    pub fn disable(&mut self) {
        self.state = PidState::Disabled;
        self.probes.output.set(0.0);
    }

    pub fn state(&self) -> PidState {
        self.state
    }

    /// The jerk limited speed being tracked.
    pub fn ramped_speed(&self) -> f64 {
        self.ramp.speed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn make(max_jerk: f64, clock: &ManualClock, telem: &mut Telemetry) -> PositionPid {
        let gains = VapidGains {
            k_v: 0.1,
            k_a: 0.0,
            k_p: 0.0,
            k_i: 0.0,
            k_d: 0.0,
            integral_limit: 1.0,
        };
        PositionPid::new(
            "Test",
            gains,
            max_jerk,
            Box::new(|| 0.0),
            Rc::new(clock.clone()),
            telem,
        )
    }

    #[test]
    fn test_ramp_reaches_target_at_jerk_limit() {
        let clock = ManualClock::new();
        let mut telem = Telemetry::new(true);
        let mut pid = make(1.0, &clock, &mut telem);
        pid.reset();

        pid.motor_power(2.0);
        assert_eq!(pid.ramped_speed(), 0.0);

        for _ in 0..10 {
            clock.advance(0.1);
            pid.motor_power(2.0);
        }
        assert!((pid.ramped_speed() - 1.0).abs() < 1e-9);

        for _ in 0..10 {
            clock.advance(0.1);
            pid.motor_power(2.0);
        }
        assert!((pid.ramped_speed() - 2.0).abs() < 1e-9);

        for _ in 0..10 {
            clock.advance(0.1);
            pid.motor_power(2.0);
        }
        assert!((pid.ramped_speed() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_speed_step_bounded_by_jerk() {
        let jerk = 1.5;
        let dt = 0.1;
        let clock = ManualClock::new();
        let mut telem = Telemetry::new(false);
        let mut pid = make(jerk, &clock, &mut telem);
        pid.reset();

        let targets = [3.0, -2.0, 0.5, 0.5, 4.0, -4.0, 0.0, 1.0, -0.2, 2.2];
        let mut prev = pid.ramped_speed();
        for i in 0..200 {
            clock.advance(dt);
            pid.motor_power(targets[(i / 7) % targets.len()]);
            let speed = pid.ramped_speed();
            assert!((speed - prev).abs() <= jerk * dt + 1e-9);
            prev = speed;
        }
    }

    #[test]
    fn test_disable_zeroes_output() {
        let clock = ManualClock::new();
        let mut telem = Telemetry::new(true);
        let mut pid = make(10.0, &clock, &mut telem);

        // Disabled until reset
        clock.advance(1.0);
        assert_eq!(pid.motor_power(1.0), 0.0);

        pid.reset();
        clock.advance(1.0);
        assert!(pid.motor_power(1.0) > 0.0);

        pid.disable();
        assert_eq!(pid.state(), PidState::Disabled);
        clock.advance(1.0);
        assert_eq!(pid.motor_power(1.0), 0.0);

        // Ramp state survives the disable
        assert!((pid.ramped_speed() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_output_bounded() {
        let clock = ManualClock::new();
        let mut telem = Telemetry::new(true);
        let mut pid = make(100.0, &clock, &mut telem);
        pid.reset();
        clock.advance(1.0);
        assert_eq!(pid.motor_power(1000.0), 1.0);
        assert_eq!(pid.motor_power(-1000.0), 1.0);
        clock.advance(2.0);
        assert_eq!(pid.motor_power(-1000.0), -1.0);

        assert!(telem.names().contains(&"Drive/Test/output"));
    }
}
