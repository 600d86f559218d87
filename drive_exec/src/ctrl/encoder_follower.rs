//! # Encoder follower
//!
//! Follows one side's segment list using that side's encoder distance as
//! feedback. The follower advances one segment per call and assumes it is
//! called once per segment period.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::traj::Segment;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Gains for an `EncoderFollower`. `k_i` is accepted for completeness but the
/// follower has no integral term.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FollowerGains {
    pub k_p: f64,
    pub k_i: f64,
    pub k_d: f64,
    pub k_v: f64,
    pub k_a: f64,
}

#[derive(Debug, Clone)]
pub struct EncoderFollower {
    segments: Vec<Segment>,
    gains: FollowerGains,

    /// Encoder reading when the follower was created
    initial_distance_m: f64,

    /// Index of the next segment
    index: usize,

    last_error: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for FollowerGains {
    fn default() -> Self {
        Self {
            k_p: 0.13,
            k_i: 0.0,
            k_d: 0.015,
            k_v: 0.017,
            k_a: 0.016,
        }
    }
}

impl EncoderFollower {
    pub fn new(segments: Vec<Segment>, gains: FollowerGains, initial_distance_m: f64) -> Self {
        Self {
            segments,
            gains,
            initial_distance_m,
            index: 0,
            last_error: 0.0,
        }
    }

    /// Calculate the output for the current segment given the side's encoder
    /// distance, then move to the next segment. Returns zero once every
    /// segment has been followed.
    pub fn calculate(&mut self, distance_m: f64) -> f64 {
        let seg = match self.segments.get(self.index) {
            Some(s) => *s,
            None => return 0.0,
        };

        let covered = distance_m - self.initial_distance_m;
        let error = seg.position_m - covered;

        let deriv = if seg.dt_s > 0.0 {
            (error - self.last_error) / seg.dt_s - seg.velocity_ms
        } else {
            0.0
        };

        let out = self.gains.k_p * error
            + self.gains.k_d * deriv
            + self.gains.k_v * seg.velocity_ms
            + self.gains.k_a * seg.accel_mss;

        self.last_error = error;
        self.index += 1;

        out
    }

    /// The segment currently being followed, or the final segment once
    /// finished.
    pub fn segment(&self) -> Option<&Segment> {
        self.segments
            .get(self.index)
            .or_else(|| self.segments.last())
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.segments.len()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
