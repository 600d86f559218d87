//! # Simulated drivebase
//!
//! Stands in for the motor controllers and odometry so the executable can run
//! the drive routines without hardware. Each side is a first order lag from
//! the demanded speed to the actual speed, and the pose is dead reckoned from
//! the side speeds.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use std::cell::Cell;
use std::rc::Rc;
use util::{maths::clamp, raise_error};

use crate::{
    ctrl::{DifferentialDriveKinematics, Sensor, SimpleMotorFeedforward, WheelSpeeds, MIN_DT_S},
    drive_ctrl::{ControlMode, DriveMotion, Params},
    loc::{LocMgr, Pose2d},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Largest voltage a side can be driven with.
///
/// Units: volts
pub const MAX_VOLTAGE_V: f64 = 12.0;

/// Time constant of each side's speed response.
///
/// Units: seconds
pub const SIDE_TIME_CONSTANT_S: f64 = 0.1;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Encoder readings for one side, shared with the routines reading them.
#[derive(Debug, Clone, Default)]
struct SimSide {
    distance_m: Rc<Cell<f64>>,
    speed_ms: Rc<Cell<f64>>,
}

pub struct SimDrivebase {
    left: SimSide,
    right: SimSide,

    kinematics: DifferentialDriveKinematics,
    feedforward: SimpleMotorFeedforward,
    max_speed_ms: f64,

    pose: Pose2d,
    time_s: f64,

    loc_mgr: Rc<LocMgr>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimSide {
    /// Move the side towards `target_ms` over `dt_s`, returning the distance
    /// covered.
    fn step(&self, target_ms: f64, dt_s: f64) -> f64 {
        let speed = self.speed_ms.get();
        let new_speed = speed + (target_ms - speed) * (dt_s / SIDE_TIME_CONSTANT_S).min(1.0);
        let ds = 0.5 * (speed + new_speed) * dt_s;

        self.speed_ms.set(new_speed);
        self.distance_m.set(self.distance_m.get() + ds);

        ds
    }

    fn distance_sensor(&self) -> Sensor {
        let d = self.distance_m.clone();
        Box::new(move || d.get())
    }
}

impl SimDrivebase {
    /// Create a drivebase at rest at `pose`, publishing its pose to `loc_mgr`.
    ///
    /// # Panics
    /// - If the track width isn't positive.
    pub fn new(params: &Params, pose: Pose2d, loc_mgr: Rc<LocMgr>) -> Self {
        if params.track_width_m <= 0.0 {
            raise_error!("Track width must be positive, found {}", params.track_width_m);
        }

        loc_mgr.set_pose(pose, 0.0, 0.0);

        Self {
            left: SimSide::default(),
            right: SimSide::default(),
            kinematics: DifferentialDriveKinematics::new(params.track_width_m),
            feedforward: params.feedforward,
            max_speed_ms: params.max_speed_ms,
            pose,
            time_s: 0.0,
            loc_mgr,
        }
    }

    /// Apply a demand for `dt_s` seconds.
    ///
    /// Steps at or below the minimum time step are ignored.
    pub fn step(&mut self, motion: DriveMotion, mode: ControlMode, dt_s: f64) {
        if dt_s <= MIN_DT_S {
            return;
        }

        let left_ds = self.left.step(self.target_speed(motion.left, mode), dt_s);
        let right_ds = self.right.step(self.target_speed(motion.right, mode), dt_s);

        // Arc approximation, heading taken half way through the step
        let ds = 0.5 * (left_ds + right_ds);
        let dtheta = (right_ds - left_ds) / self.kinematics.track_width_m;
        let mid_heading = self.pose.heading_rad + 0.5 * dtheta;

        self.pose = Pose2d::new(
            self.pose.x() + ds * mid_heading.cos(),
            self.pose.y() + ds * mid_heading.sin(),
            self.pose.heading_rad + dtheta,
        );
        self.time_s += dt_s;

        let speeds = self.kinematics.to_chassis_speeds(&self.wheel_speeds());
        self.loc_mgr.set_pose(self.pose, speeds.vx_ms, self.time_s);

        trace!(
            "Sim pose ({:.3}, {:.3}, {:.3}) after {} {:?}",
            self.pose.x(),
            self.pose.y(),
            self.pose.heading_rad,
            motion,
            mode
        );
    }

    /// Steady state speed the side would reach under `demand`.
    fn target_speed(&self, demand: f64, mode: ControlMode) -> f64 {
        match mode {
            ControlMode::PercentOutput => clamp(demand, -1.0, 1.0) * self.max_speed_ms,
            ControlMode::Speed => clamp(demand, -self.max_speed_ms, self.max_speed_ms),
            ControlMode::Voltage => {
                let volts = clamp(demand, -MAX_VOLTAGE_V, MAX_VOLTAGE_V);

                // Static friction holds the side still below kS
                if volts.abs() <= self.feedforward.k_s || self.feedforward.k_v <= 0.0 {
                    0.0
                } else {
                    (volts - self.feedforward.k_s * volts.signum()) / self.feedforward.k_v
                }
            }
        }
    }

    pub fn pose(&self) -> Pose2d {
        self.pose
    }

    pub fn wheel_speeds(&self) -> WheelSpeeds {
        WheelSpeeds {
            left_ms: self.left.speed_ms.get(),
            right_ms: self.right.speed_ms.get(),
        }
    }

    pub fn left_distance(&self) -> Sensor {
        self.left.distance_sensor()
    }

    pub fn right_distance(&self) -> Sensor {
        self.right.distance_sensor()
    }
}
