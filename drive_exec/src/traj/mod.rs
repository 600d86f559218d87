//! # Trajectories
//!
//! A trajectory is an immutable, time ordered sequence of states, each giving
//! the pose, velocity, acceleration and curvature the robot should have at
//! that time. Routines only ever read trajectories through `sample`.
//!
//! Trajectories are stored on disk as JSON in the PathWeaver layout, an array
//! of states:
//!
//! ```json
//! [{"time": 0.0, "velocity": 0.0, "acceleration": 2.0,
//!   "pose": {"translation": {"x": 0.0, "y": 0.0}, "rotation": {"radians": 0.0}},
//!   "curvature": 0.0}]
//! ```

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod cache;
mod generator;
mod tank;

pub use cache::TrajectoryCache;
pub use generator::{StraightLineGenerator, TrajectoryGenerator, TrajectorySpec};
pub use tank::{tank_modify, Segment};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::loc::Pose2d;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single state along a trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryState {
    /// Time since the start of the trajectory
    ///
    /// Units: seconds
    pub time: f64,

    /// Units: meters/second
    pub velocity: f64,

    /// Units: meters/second^2
    pub acceleration: f64,

    pub pose: Pose2d,

    /// Units: radians/meter
    pub curvature: f64,
}

/// A non-empty sequence of states ordered by time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Trajectory {
    states: Vec<TrajectoryState>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TrajError {
    #[error("A trajectory must contain at least one state")]
    Empty,

    #[error("Trajectory states are not in time order at index {0}")]
    OutOfOrder(usize),

    #[error("Trajectory I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Trajectory JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not generate a trajectory: {0}")]
    Generation(String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajectoryState {
    /// Interpolate towards `end` by the fraction `i` of the time between them.
    ///
    /// The pose is placed where constant acceleration from this state would
    /// put the robot, rather than lerped by time, so that the pose and
    /// velocity stay consistent.
    fn interpolate(&self, end: &TrajectoryState, i: f64) -> TrajectoryState {
        let new_t = lerp(self.time, end.time, i);
        let delta_t = new_t - self.time;

        if delta_t < 0.0 {
            return end.interpolate(self, 1.0 - i);
        }

        let reversing = self.velocity < 0.0
            || (self.velocity.abs() < std::f64::EPSILON && self.acceleration < 0.0);

        let new_v = self.velocity + self.acceleration * delta_t;
        let new_s = (self.velocity * delta_t + 0.5 * self.acceleration * delta_t.powi(2))
            * if reversing { -1.0 } else { 1.0 };

        let seg_length = self.pose.distance_to(&end.pose);
        let frac = if seg_length > std::f64::EPSILON {
            new_s / seg_length
        } else {
            i
        };

        TrajectoryState {
            time: new_t,
            velocity: new_v,
            acceleration: self.acceleration,
            pose: self.pose.lerp(&end.pose, frac),
            curvature: lerp(self.curvature, end.curvature, i),
        }
    }
}

impl Trajectory {
    /// Build a trajectory from states, which must be non-empty and in time
    /// order.
    pub fn new(states: Vec<TrajectoryState>) -> Result<Self, TrajError> {
        if states.is_empty() {
            return Err(TrajError::Empty);
        }

        if let Some(i) = states.windows(2).position(|w| w[1].time < w[0].time) {
            return Err(TrajError::OutOfOrder(i + 1));
        }

        Ok(Self { states })
    }

    pub fn states(&self) -> &[TrajectoryState] {
        &self.states
    }

    /// Duration of the trajectory, the time of its final state.
    pub fn total_time(&self) -> f64 {
        self.states[self.states.len() - 1].time
    }

    pub fn initial_pose(&self) -> Pose2d {
        self.states[0].pose
    }

    /// Sample the trajectory at `time_s` seconds from its start.
    ///
    /// Times before the start or after the end give the first and last state
    /// respectively.
    pub fn sample(&self, time_s: f64) -> TrajectoryState {
        let first = &self.states[0];
        let last = &self.states[self.states.len() - 1];

        if !(time_s > first.time) {
            return *first;
        }
        if time_s >= last.time {
            return *last;
        }

        // Index of the first state after the sample time, which can't be the
        // first state given the checks above.
        let upper = self.states.partition_point(|s| s.time <= time_s);
        let prev = &self.states[upper - 1];
        let next = &self.states[upper];

        let span = next.time - prev.time;
        if span.abs() < std::f64::EPSILON {
            return *next;
        }

        prev.interpolate(next, (time_s - prev.time) / span)
    }

    /// Parse a trajectory from PathWeaver JSON.
    pub fn from_json(json: &str) -> Result<Self, TrajError> {
        let states: Vec<TrajectoryState> = serde_json::from_str(json)?;
        Self::new(states)
    }

    pub fn to_json(&self) -> Result<String, TrajError> {
        Ok(serde_json::to_string(&self.states)?)
    }

    /// Load a trajectory from a PathWeaver JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TrajError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write the trajectory to a PathWeaver JSON file, creating any missing
    /// parent directories.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), TrajError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A straight trajectory along X which accelerates at 1 m/s^2 for one
    /// second then coasts for one second.
    pub(crate) fn accel_then_coast() -> Trajectory {
        let state = |time, velocity, acceleration, x| TrajectoryState {
            time,
            velocity,
            acceleration,
            pose: Pose2d::new(x, 0.0, 0.0),
            curvature: 0.0,
        };

        Trajectory::new(vec![
            state(0.0, 0.0, 1.0, 0.0),
            state(1.0, 1.0, 0.0, 0.5),
            state(2.0, 1.0, 0.0, 1.5),
        ])
        .unwrap()
    }

    #[test]
    fn test_sample_clamps_to_ends() {
        let traj = accel_then_coast();
        assert_eq!(traj.total_time(), 2.0);
        assert_eq!(traj.sample(-1.0), traj.states()[0]);
        assert_eq!(traj.sample(0.0), traj.states()[0]);
        assert_eq!(traj.sample(2.0), traj.states()[2]);
        assert_eq!(traj.sample(100.0), traj.states()[2]);
    }

    #[test]
    fn test_sample_follows_kinematics() {
        let traj = accel_then_coast();

        let s = traj.sample(0.5);
        assert!((s.velocity - 0.5).abs() < 1e-9);
        // s = a t^2 / 2
        assert!((s.pose.x() - 0.125).abs() < 1e-9);

        let s = traj.sample(1.5);
        assert!((s.velocity - 1.0).abs() < 1e-9);
        assert!((s.pose.x() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_bad_states() {
        assert!(matches!(Trajectory::new(vec![]), Err(TrajError::Empty)));

        let mut states = accel_then_coast().states().to_vec();
        states.swap(1, 2);
        assert!(matches!(Trajectory::new(states), Err(TrajError::OutOfOrder(2))));

        assert!(matches!(Trajectory::from_json("[]"), Err(TrajError::Empty)));
        assert!(matches!(Trajectory::from_json("{"), Err(TrajError::Json(_))));
    }

    #[test]
    fn test_json_layout() {
        let traj = Trajectory::new(vec![TrajectoryState {
            time: 0.5,
            velocity: 1.0,
            acceleration: 0.0,
            pose: Pose2d::new(1.0, 2.0, 0.0),
            curvature: 0.25,
        }])
        .unwrap();

        let json = traj.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["pose"]["translation"]["y"], 2.0);
        assert_eq!(value[0]["curvature"], 0.25);

        assert_eq!(Trajectory::from_json(&json).unwrap(), traj);
    }
}
