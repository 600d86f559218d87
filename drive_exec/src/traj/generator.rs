//! Trajectory generation

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use super::{TrajError, Trajectory, TrajectoryState};
use crate::loc::Pose2d;
use util::maths::wrap_pi;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Something that can turn a set of waypoints into a trajectory.
///
/// Generators must be deterministic, the same spec always gives the same
/// trajectory.
pub trait TrajectoryGenerator {
    fn generate(&self, spec: &TrajectorySpec) -> Result<Trajectory, TrajError>;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The waypoints defining a trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySpec {
    pub start: Pose2d,

    /// Points to pass through between the start and end
    #[serde(default)]
    pub interior_m: Vec<Vector2<f64>>,

    pub end: Pose2d,

    /// If false the robot drives the trajectory backwards
    #[serde(default = "default_forward")]
    pub forward: bool,
}

/// Generates a straight line from the start to the end translation with a
/// trapezoidal speed profile. The robot faces along the line, backwards if the
/// spec isn't forward. Interior points and the end heading are ignored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StraightLineGenerator {
    pub max_speed_ms: f64,
    pub max_accel_mss: f64,

    /// Time between generated states
    pub dt_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

fn default_forward() -> bool {
    true
}

impl TrajectorySpec {
    /// Stable key identifying the trajectory this spec describes, used to name
    /// cache files. Computed with 64 bit FNV-1a over the bits of every value,
    /// so it doesn't change between builds.
    pub fn cache_key(&self) -> u64 {
        const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
        const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

        let mut values = vec![self.start.x(), self.start.y(), self.start.heading_rad];
        for p in self.interior_m.iter() {
            values.push(p[0]);
            values.push(p[1]);
        }
        values.extend_from_slice(&[self.end.x(), self.end.y(), self.end.heading_rad]);

        // Normalise negative zero so that it hashes like zero
        let words = values
            .iter()
            .map(|v| if *v == 0.0 { 0u64 } else { v.to_bits() })
            .chain(std::iter::once(self.interior_m.len() as u64))
            .chain(std::iter::once(self.forward as u64));

        let mut hash = FNV_OFFSET;
        for word in words {
            for byte in word.to_le_bytes().iter() {
                hash ^= *byte as u64;
                hash = hash.wrapping_mul(FNV_PRIME);
            }
        }
        hash
    }
}

impl StraightLineGenerator {
    pub fn new(max_speed_ms: f64, max_accel_mss: f64, dt_s: f64) -> Self {
        Self {
            max_speed_ms,
            max_accel_mss,
            dt_s,
        }
    }
}

impl TrajectoryGenerator for StraightLineGenerator {
    fn generate(&self, spec: &TrajectorySpec) -> Result<Trajectory, TrajError> {
        if !(self.max_speed_ms > 0.0 && self.max_accel_mss > 0.0 && self.dt_s > 0.0) {
            return Err(TrajError::Generation(format!(
                "speed, acceleration and dt limits must be positive, got {:?}",
                self
            )));
        }

        if !spec.interior_m.is_empty() {
            debug!(
                "Straight line generator ignoring {} interior waypoints",
                spec.interior_m.len()
            );
        }

        let delta = spec.end.translation_m - spec.start.translation_m;
        let distance = delta.norm();

        let direction = if distance > std::f64::EPSILON {
            delta / distance
        } else {
            Vector2::new(spec.start.heading_rad.cos(), spec.start.heading_rad.sin())
        };

        let (heading, sign) = if spec.forward {
            (direction[1].atan2(direction[0]), 1.0)
        } else {
            (wrap_pi(direction[1].atan2(direction[0]) + PI), -1.0)
        };

        // Trapezoid, or a triangle if there isn't room to reach full speed
        let accel = self.max_accel_mss;
        let peak_speed = self.max_speed_ms.min((distance * accel).sqrt());
        let accel_time = peak_speed / accel;
        let accel_dist = 0.5 * accel * accel_time.powi(2);
        let cruise_time = if peak_speed > 0.0 {
            (distance - 2.0 * accel_dist).max(0.0) / peak_speed
        } else {
            0.0
        };
        let total_time = 2.0 * accel_time + cruise_time;

        let profile = |t: f64| -> (f64, f64, f64) {
            if t < accel_time {
                (0.5 * accel * t.powi(2), accel * t, accel)
            } else if t < accel_time + cruise_time {
                (accel_dist + peak_speed * (t - accel_time), peak_speed, 0.0)
            } else if t < total_time {
                let td = t - accel_time - cruise_time;
                (
                    accel_dist + peak_speed * cruise_time + peak_speed * td - 0.5 * accel * td.powi(2),
                    peak_speed - accel * td,
                    -accel,
                )
            } else {
                (distance, 0.0, 0.0)
            }
        };

        let num_steps = (total_time / self.dt_s).ceil() as usize;
        let mut states = Vec::with_capacity(num_steps + 1);

        for i in 0..=num_steps {
            let t = (i as f64 * self.dt_s).min(total_time);
            let (s, v, a) = profile(t);
            let xy = spec.start.translation_m + direction * s;

            states.push(TrajectoryState {
                time: t,
                velocity: sign * v,
                acceleration: sign * a,
                pose: Pose2d::new(xy[0], xy[1], heading),
                curvature: 0.0,
            });
        }

        Trajectory::new(states)
    }
}
