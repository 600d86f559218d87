//! # Localisation module
//!
//! Pose types and the interface the drive routines use to find out where the
//! robot is. Localisation itself (odometry, gyro fusion) is owned elsewhere;
//! routines only read from it, apart from reporting where they wanted the
//! robot to be for diagnostics.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod pose;
mod position;

pub use pose::Pose2d;
pub use position::Position;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::cell::Cell;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Read access to the robot's location, plus a write-back of the desired
/// location for tracking error telemetry.
pub trait Location {
    /// Current pose in metres and radians.
    fn pose(&self) -> Pose2d;

    /// Current location, heading in degrees.
    fn current_location(&self) -> Position;

    /// Record where a routine wanted the robot to be.
    fn set_desired_location(&self, desired: Position);
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A location store which is updated by whoever owns the pose estimate and
/// read by the drive routines.
#[derive(Debug, Default)]
pub struct LocMgr {
    pose: Cell<Pose2d>,
    speed_ms: Cell<f64>,
    time_s: Cell<f64>,
    desired: Cell<Position>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LocMgr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the current pose estimate.
    pub fn set_pose(&self, pose: Pose2d, speed_ms: f64, time_s: f64) {
        self.pose.set(pose);
        self.speed_ms.set(speed_ms);
        self.time_s.set(time_s);
    }

    /// The last desired location reported by a routine.
    pub fn desired_location(&self) -> Position {
        self.desired.get()
    }
}

impl Location for LocMgr {
    fn pose(&self) -> Pose2d {
        self.pose.get()
    }

    fn current_location(&self) -> Position {
        let mut p = self.pose.get().to_position();
        p.speed = self.speed_ms.get();
        p.time_s = self.time_s.get();
        p
    }

    fn set_desired_location(&self, desired: Position) {
        self.desired.set(desired);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loc_mgr_round_trip() {
        let loc = LocMgr::new();
        loc.set_pose(Pose2d::new(1.0, 2.0, std::f64::consts::FRAC_PI_2), 0.5, 3.0);

        let p = loc.current_location();
        assert!((p.heading_deg - 90.0).abs() < 1e-9);
        assert_eq!((p.x, p.y, p.speed, p.time_s), (1.0, 2.0, 0.5, 3.0));

        loc.set_desired_location(Position::new(4.0, 5.0, 0.0));
        assert_eq!(loc.desired_location().x, 4.0);
    }
}
