//! RAMSETE nonlinear pose tracking controller.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use util::maths::sinc;

use super::ChassisSpeeds;
use crate::loc::Pose2d;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Corrects a reference chassis velocity so that the robot converges back
/// onto the desired pose.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RamseteController {
    /// Convergence gain, larger values converge more aggressively. Must be
    /// greater than zero.
    pub b: f64,

    /// Damping, between zero and one.
    pub zeta: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RamseteController {
    pub fn new(b: f64, zeta: f64) -> Self {
        Self { b, zeta }
    }

    /// Calculate the chassis speeds needed to follow `desired`, which is
    /// moving at `v_ref` m/s and turning at `omega_ref` rad/s.
    pub fn calculate(
        &self,
        current: &Pose2d,
        desired: &Pose2d,
        v_ref: f64,
        omega_ref: f64,
    ) -> ChassisSpeeds {
        // Error in the robot frame
        let err = desired.relative_to(current);
        let (e_x, e_y, e_theta) = (err.x(), err.y(), err.heading_rad);

        let k = 2.0 * self.zeta * (omega_ref.powi(2) + self.b * v_ref.powi(2)).sqrt();

        ChassisSpeeds {
            vx_ms: v_ref * e_theta.cos() + k * e_x,
            omega_rads: omega_ref + k * e_theta + self.b * v_ref * sinc(e_theta) * e_y,
        }
    }
}

impl Default for RamseteController {
    fn default() -> Self {
        Self::new(2.0, 0.7)
    }
}
