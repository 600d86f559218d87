//! # Drive Executable Parameters
//!
//! This module provides parameters for the drive executable's demo loop.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::loc::Pose2d;
use crate::traj::TrajectorySpec;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveExecParams {
    /// Target period of one control cycle
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Power applied in the opening constant power phase
    pub constant_power: f64,

    /// Length of the constant power phase
    ///
    /// Units: seconds
    pub constant_power_duration_s: f64,

    /// Time allowed for the trajectory phase to finish before the exec stops
    ///
    /// Units: seconds
    pub max_demo_duration_s: f64,

    /// Directory, relative to the software root, holding cached trajectories
    pub traj_cache_dir: String,

    /// Time between states of generated trajectories
    ///
    /// Units: seconds
    pub traj_dt_s: f64,

    /// Trajectory driven in the demo
    pub demo_trajectory: TrajectorySpec,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Default for DriveExecParams {
    fn default() -> Self {
        Self {
            cycle_period_s: 0.02,
            constant_power: 0.3,
            constant_power_duration_s: 1.0,
            max_demo_duration_s: 15.0,
            traj_cache_dir: "traj_cache".to_string(),
            traj_dt_s: 0.02,
            demo_trajectory: TrajectorySpec {
                start: Pose2d::new(0.0, 0.0, 0.0),
                interior_m: Vec::new(),
                end: Pose2d::new(3.0, 0.0, 0.0),
                forward: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_trajectory_from_toml() {
        let p: DriveExecParams = util::params::from_str(
            r#"
            cycle_period_s = 0.05

            [demo_trajectory]
            forward = false
            start = { translation = { x = 1.0, y = 1.0 }, rotation = { radians = 0.0 } }
            end = { translation = { x = -1.0, y = 1.0 }, rotation = { radians = 0.0 } }
            "#,
        )
        .unwrap();

        assert_eq!(p.cycle_period_s, 0.05);
        assert_eq!(p.constant_power_duration_s, 1.0);
        assert!(!p.demo_trajectory.forward);
        assert!(p.demo_trajectory.interior_m.is_empty());
        assert_eq!(p.demo_trajectory.end.x(), -1.0);
    }
}
