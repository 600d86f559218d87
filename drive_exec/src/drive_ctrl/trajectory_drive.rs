//! # Trajectory drive
//!
//! Follows a pose trajectory. Each cycle the trajectory is sampled at the time
//! since the routine was enabled, a RAMSETE controller corrects the sampled
//! velocity for the error between the desired and actual pose, and the
//! corrected chassis speed is split into wheel speeds. Each wheel speed is
//! turned into a demand by the drivebase motor model plus a proportional
//! correction on the measured wheel speed.
//!
//! The output is in volts, the routine must be registered with
//! `ControlMode::Voltage`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, info, warn};
use std::rc::Rc;
use util::telemetry::{Probe, Telemetry};

use super::{DriveCtrlError, DriveMotion, DriveRoutine, DriveRoutineParameters, Params};
use crate::clock::Clock;
use crate::ctrl::{
    ChassisSpeeds, DifferentialDriveKinematics, PidController, RamseteController,
    SimpleMotorFeedforward, WheelSpeeds, MIN_DT_S,
};
use crate::loc::Location;
use crate::traj::Trajectory;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct TrajectoryDrive {
    location: Rc<dyn Location>,
    clock: Rc<dyn Clock>,

    ramsete: RamseteController,
    feedforward: SimpleMotorFeedforward,
    kinematics: DifferentialDriveKinematics,
    left_pid: PidController,
    right_pid: PidController,

    trajectory: Option<Rc<Trajectory>>,
    enabled: bool,

    /// Clock time at which the trajectory was started
    start_time_s: f64,

    /// Trajectory time of the previous cycle
    prev_time_s: f64,

    /// Wheel speed setpoints of the previous cycle
    prev_speeds: WheelSpeeds,

    probes: TrajProbes,
}

#[derive(Default)]
struct TrajProbes {
    start_time: Probe,
    total_time: Probe,
    target_speed: Probe,
    left_setpoint: Probe,
    right_setpoint: Probe,
    left_error: Probe,
    right_error: Probe,
    left_pid: Probe,
    right_pid: Probe,
    left_output: Probe,
    right_output: Probe,
    desired_x: Probe,
    desired_y: Probe,
    actual_x: Probe,
    actual_y: Probe,
    error_x: Probe,
    error_y: Probe,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajectoryDrive {
    pub fn new(
        params: &Params,
        location: Rc<dyn Location>,
        clock: Rc<dyn Clock>,
        telemetry: &mut Telemetry,
    ) -> Self {
        let probes = TrajProbes::default();

        let elapsed = {
            let clock = clock.clone();
            let start = probes.start_time.clone();
            move || clock.current_time() - start.get()
        };

        telemetry
            .register(true, elapsed, "Drive/Trajectory/elapsedTime")
            .register(true, probes.total_time.source(), "Drive/Trajectory/totalTime")
            .register(true, probes.target_speed.source(), "Drive/Trajectory/targetSpeed")
            .register(true, probes.left_setpoint.source(), "Drive/Trajectory/speed/leftSetpoint")
            .register(true, probes.right_setpoint.source(), "Drive/Trajectory/speed/rightSetpoint")
            .register(true, probes.left_error.source(), "Drive/Trajectory/speed/leftError")
            .register(true, probes.right_error.source(), "Drive/Trajectory/speed/rightError")
            .register(true, probes.left_pid.source(), "Drive/Trajectory/speed/leftPidResult")
            .register(true, probes.right_pid.source(), "Drive/Trajectory/speed/rightPidResult")
            .register(true, probes.left_output.source(), "Drive/Trajectory/leftOutput")
            .register(true, probes.right_output.source(), "Drive/Trajectory/rightOutput")
            .register(true, probes.desired_x.source(), "Drive/Trajectory/desired/x")
            .register(true, probes.desired_y.source(), "Drive/Trajectory/desired/y")
            .register(true, probes.actual_x.source(), "Drive/Trajectory/actual/x")
            .register(true, probes.actual_y.source(), "Drive/Trajectory/actual/y")
            .register(true, probes.error_x.source(), "Drive/Trajectory/error/x")
            .register(true, probes.error_y.source(), "Drive/Trajectory/error/y");

        Self {
            location,
            clock,
            ramsete: params.ramsete,
            feedforward: params.feedforward,
            kinematics: DifferentialDriveKinematics::new(params.track_width_m),
            left_pid: PidController::new(params.traj_vel_k_p, 0.0, 0.0),
            right_pid: PidController::new(params.traj_vel_k_p, 0.0, 0.0),
            trajectory: None,
            enabled: false,
            start_time_s: 0.0,
            prev_time_s: 0.0,
            prev_speeds: WheelSpeeds::default(),
            probes,
        }
    }

    /// Restart the loaded trajectory from its beginning.
    fn restart(&mut self, trajectory: &Trajectory) {
        let initial = trajectory.sample(0.0);

        self.prev_speeds = self.kinematics.to_wheel_speeds(&ChassisSpeeds {
            vx_ms: initial.velocity,
            omega_rads: initial.velocity * initial.curvature,
        });
        self.prev_time_s = 0.0;
        self.left_pid.reset();
        self.right_pid.reset();
        self.probes.target_speed.set(0.0);
    }

    /// Seconds since the trajectory was started.
    pub fn elapsed(&self) -> f64 {
        self.clock.current_time() - self.start_time_s
    }
}

impl DriveRoutine for TrajectoryDrive {
    /// Load the trajectory to follow. It starts when the routine is enabled.
    fn reset(&mut self, params: &DriveRoutineParameters) -> Result<(), DriveCtrlError> {
        let trajectory = match params {
            DriveRoutineParameters::Trajectory { trajectory, relative } => {
                debug!("Trajectory relative flag {} ignored", relative);
                trajectory.clone()
            }
            other => {
                return Err(DriveCtrlError::UnsupportedParameters {
                    routine: self.name().to_string(),
                    params: other.to_string(),
                })
            }
        };

        info!(
            "Loaded trajectory of {} states lasting {:.2} s",
            trajectory.states().len(),
            trajectory.total_time()
        );

        self.restart(&trajectory);
        self.probes.total_time.set(trajectory.total_time());
        self.trajectory = Some(trajectory);

        // Not started until enabled, but a fresh trajectory isn't finished
        self.start_time_s = self.clock.current_time();
        self.probes.start_time.set(self.start_time_s);

        Ok(())
    }

    fn get_motion(&mut self, left_speed: f64, right_speed: f64) -> DriveMotion {
        let trajectory = match (self.enabled, &self.trajectory) {
            (true, Some(t)) => t.clone(),
            _ => return DriveMotion::zero(),
        };

        let time = self.elapsed();
        let dt = time - self.prev_time_s;

        let desired = trajectory.sample(time);
        let actual = self.location.pose();
        let error = desired.pose.relative_to(&actual);

        let chassis = self.ramsete.calculate(
            &actual,
            &desired.pose,
            desired.velocity,
            desired.velocity * desired.curvature,
        );
        let setpoint = self.kinematics.to_wheel_speeds(&chassis);

        // Acceleration is skipped if time hasn't moved on
        let (left_accel, right_accel) = if dt > MIN_DT_S {
            (
                (setpoint.left_ms - self.prev_speeds.left_ms) / dt,
                (setpoint.right_ms - self.prev_speeds.right_ms) / dt,
            )
        } else {
            (0.0, 0.0)
        };

        let left_ff = self.feedforward.calculate(setpoint.left_ms, left_accel);
        let right_ff = self.feedforward.calculate(setpoint.right_ms, right_accel);

        let left_pid = self.left_pid.calculate(left_speed, setpoint.left_ms, dt);
        let right_pid = self.right_pid.calculate(right_speed, setpoint.right_ms, dt);

        let output = DriveMotion::new(left_ff + left_pid, right_ff + right_pid);

        self.location.set_desired_location(desired.pose.to_position());

        let p = &self.probes;
        p.target_speed.set(desired.velocity);
        p.left_setpoint.set(setpoint.left_ms);
        p.right_setpoint.set(setpoint.right_ms);
        p.left_error.set(setpoint.left_ms - left_speed);
        p.right_error.set(setpoint.right_ms - right_speed);
        p.left_pid.set(left_pid);
        p.right_pid.set(right_pid);
        p.left_output.set(output.left);
        p.right_output.set(output.right);
        p.desired_x.set(desired.pose.x());
        p.desired_y.set(desired.pose.y());
        p.actual_x.set(actual.x());
        p.actual_y.set(actual.y());
        p.error_x.set(error.x());
        p.error_y.set(error.y());

        self.prev_time_s = time;
        self.prev_speeds = setpoint;

        output
    }

    /// True once the trajectory's duration has passed, or if there's no
    /// trajectory to follow.
    fn has_finished(&self) -> bool {
        match self.trajectory {
            Some(ref t) => self.elapsed() > t.total_time(),
            None => true,
        }
    }

    fn name(&self) -> &str {
        "Trajectory"
    }

    /// Start the loaded trajectory from the beginning.
    fn enable(&mut self) {
        let trajectory = match self.trajectory {
            Some(ref t) => t.clone(),
            None => {
                warn!("Trajectory drive enabled without a trajectory, staying disabled");
                self.enabled = false;
                return;
            }
        };

        self.restart(&trajectory);
        self.start_time_s = self.clock.current_time();
        self.probes.start_time.set(self.start_time_s);
        self.enabled = true;
    }

    fn disable(&mut self) {
        self.enabled = false;
        self.probes.left_setpoint.set(0.0);
        self.probes.right_setpoint.set(0.0);
    }
}
