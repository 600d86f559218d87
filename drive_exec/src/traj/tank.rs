//! Tank modifier
//!
//! Splits a trajectory for the centre of the robot into one segment list per
//! side, each referenced to that side's encoder distance.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use super::{Trajectory, TrajectoryState};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A fixed-duration step along one side's path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Segment {
    /// Duration of the segment
    ///
    /// Units: seconds
    pub dt_s: f64,

    /// Position of the wheel on the field
    ///
    /// Units: meters
    pub x_m: f64,
    pub y_m: f64,

    /// Distance the side's encoder should read, negative when reversing
    ///
    /// Units: meters
    pub position_m: f64,

    /// Units: meters/second
    pub velocity_ms: f64,

    /// Units: meters/second^2
    pub accel_mss: f64,

    pub heading_rad: f64,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Sample `trajectory` every `dt_s` seconds and produce the left and right
/// side segments for a drivebase of the given track width.
pub fn tank_modify(
    trajectory: &Trajectory,
    track_width_m: f64,
    dt_s: f64,
) -> (Vec<Segment>, Vec<Segment>) {
    let half_width = track_width_m / 2.0;

    // Small tolerance so float error in the division doesn't add an extra
    // sample past the end
    let num = if dt_s > 0.0 {
        (trajectory.total_time() / dt_s - 1e-9).ceil().max(0.0) as usize + 1
    } else {
        1
    };

    let mut left: Vec<Segment> = Vec::with_capacity(num);
    let mut right: Vec<Segment> = Vec::with_capacity(num);

    for i in 0..num {
        let state = trajectory.sample(i as f64 * dt_s);
        let omega = state.velocity * state.curvature;

        // Left is +y in the robot frame
        push_side(&mut left, &state, half_width, state.velocity - omega * half_width, dt_s);
        push_side(&mut right, &state, -half_width, state.velocity + omega * half_width, dt_s);
    }

    (left, right)
}

fn push_side(
    segs: &mut Vec<Segment>,
    state: &TrajectoryState,
    offset_m: f64,
    velocity: f64,
    dt_s: f64,
) {
    let (position, accel) = match segs.last() {
        Some(prev) if dt_s > 0.0 => (
            prev.position_m + dt_s * (prev.velocity_ms + velocity) / 2.0,
            (velocity - prev.velocity_ms) / dt_s,
        ),
        _ => (0.0, 0.0),
    };

    let (sin, cos) = state.pose.heading_rad.sin_cos();

    segs.push(Segment {
        dt_s,
        x_m: state.pose.x() - offset_m * sin,
        y_m: state.pose.y() + offset_m * cos,
        position_m: position,
        velocity_ms: velocity,
        accel_mss: accel,
        heading_rad: state.pose.heading_rad,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loc::Pose2d;

    #[test]
    fn test_straight_line_sides_match() {
        let traj = crate::traj::tests::accel_then_coast();
        let (left, right) = tank_modify(&traj, 0.5, 0.1);

        assert_eq!(left.len(), 21);
        assert_eq!(left.len(), right.len());

        for (l, r) in left.iter().zip(right.iter()) {
            assert!((l.position_m - r.position_m).abs() < 1e-9);
            assert!((l.y_m - 0.25).abs() < 1e-9);
            assert!((r.y_m + 0.25).abs() < 1e-9);
        }

        let last = left.last().unwrap();
        assert!((last.position_m - 1.5).abs() < 1e-3);
    }

    #[test]
    fn test_turning_left_slows_left_side() {
        // Arc of radius 2 m at 1 m/s
        let state = |time: f64| TrajectoryState {
            time,
            velocity: 1.0,
            acceleration: 0.0,
            pose: Pose2d::new(2.0 * (time / 2.0).sin(), 2.0 - 2.0 * (time / 2.0).cos(), time / 2.0),
            curvature: 0.5,
        };
        let traj = Trajectory::new((0..=10).map(|i| state(i as f64 * 0.1)).collect()).unwrap();

        let (left, right) = tank_modify(&traj, 0.5, 0.1);
        assert!((left[3].velocity_ms - 0.875).abs() < 1e-9);
        assert!((right[3].velocity_ms - 1.125).abs() < 1e-9);
        assert!(left[10].position_m < right[10].position_m);
    }
}
