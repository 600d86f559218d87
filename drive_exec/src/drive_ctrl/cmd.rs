//! Drive routine selection commands

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

use crate::loc::Pose2d;
use crate::traj::Trajectory;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Tags used to register and select drive routines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DriveRoutineType {
    /// Constant power to both sides
    ConstantPower,

    /// Constant speed to both sides
    ConstantSpeed,

    /// Operator arcade drive, duty cycle output
    ArcadeDutyCycle,

    /// Operator arcade drive, speed output
    ArcadeVelocity,

    /// Operator curvature drive
    Cheesy,

    /// Operator drive through the positional PID
    PositionPidArcade,

    /// Follow a pose trajectory
    Trajectory,

    /// Follow waypoints using the encoders
    Spline,
}

/// What a drive routine should do when it becomes active. The variant picks
/// the routine, the payload is whatever that routine needs.
#[derive(Debug, Clone)]
pub enum DriveRoutineParameters {
    ConstantPower(f64),

    ConstantSpeed(f64),

    ArcadeDutyCycle,

    ArcadeVelocity,

    Cheesy,

    PositionPidArcade,

    Trajectory {
        trajectory: Rc<Trajectory>,

        /// Carried through for the caller, trajectories are always followed
        /// in field coordinates
        relative: bool,
    },

    Spline {
        /// At least two waypoints, the first being the start
        waypoints: Vec<Pose2d>,
        forward: bool,
        relative: bool,
    },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveRoutineParameters {
    /// The routine these parameters select.
    pub fn routine_type(&self) -> DriveRoutineType {
        match self {
            Self::ConstantPower(_) => DriveRoutineType::ConstantPower,
            Self::ConstantSpeed(_) => DriveRoutineType::ConstantSpeed,
            Self::ArcadeDutyCycle => DriveRoutineType::ArcadeDutyCycle,
            Self::ArcadeVelocity => DriveRoutineType::ArcadeVelocity,
            Self::Cheesy => DriveRoutineType::Cheesy,
            Self::PositionPidArcade => DriveRoutineType::PositionPidArcade,
            Self::Trajectory { .. } => DriveRoutineType::Trajectory,
            Self::Spline { .. } => DriveRoutineType::Spline,
        }
    }
}

impl Default for DriveRoutineParameters {
    fn default() -> Self {
        DriveRoutineParameters::ConstantPower(0.0)
    }
}

/// Trajectories compare by identity, comparing every state each cycle isn't
/// worth it.
impl PartialEq for DriveRoutineParameters {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::ConstantPower(a), Self::ConstantPower(b)) => a == b,
            (Self::ConstantSpeed(a), Self::ConstantSpeed(b)) => a == b,
            (
                Self::Trajectory { trajectory: ta, relative: ra },
                Self::Trajectory { trajectory: tb, relative: rb },
            ) => Rc::ptr_eq(ta, tb) && ra == rb,
            (
                Self::Spline { waypoints: wa, forward: fa, relative: ra },
                Self::Spline { waypoints: wb, forward: fb, relative: rb },
            ) => wa == wb && fa == fb && ra == rb,
            // Payload-free variants
            (a, b) => a.routine_type() == b.routine_type(),
        }
    }
}

impl fmt::Display for DriveRoutineParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConstantPower(v) => write!(f, "constant power {:.1}", v),
            Self::ConstantSpeed(v) => write!(f, "constant speed {:.1}", v),
            Self::Trajectory { trajectory, .. } => {
                write!(f, "trajectory of {:.1} s", trajectory.total_time())
            }
            Self::Spline { waypoints, forward, .. } => write!(
                f,
                "spline through {} waypoints {}",
                waypoints.len(),
                if *forward { "forwards" } else { "backwards" }
            ),
            other => write!(f, "routine={:?}", other.routine_type()),
        }
    }
}
