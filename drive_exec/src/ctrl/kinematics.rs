//! Differential drive kinematics.

use serde::Serialize;

/// Velocity of the robot body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ChassisSpeeds {
    /// Forward speed
    ///
    /// Units: meters/second
    pub vx_ms: f64,

    /// Turn rate, positive anticlockwise
    ///
    /// Units: radians/second
    pub omega_rads: f64,
}

/// Speeds of the left and right sides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WheelSpeeds {
    pub left_ms: f64,
    pub right_ms: f64,
}

/// Converts between body and wheel speeds for a drivebase with the given
/// track width.
#[derive(Debug, Clone, Copy)]
pub struct DifferentialDriveKinematics {
    pub track_width_m: f64,
}

impl DifferentialDriveKinematics {
    pub fn new(track_width_m: f64) -> Self {
        Self { track_width_m }
    }

    pub fn to_wheel_speeds(&self, speeds: &ChassisSpeeds) -> WheelSpeeds {
        let half = speeds.omega_rads * self.track_width_m / 2.0;
        WheelSpeeds {
            left_ms: speeds.vx_ms - half,
            right_ms: speeds.vx_ms + half,
        }
    }

    pub fn to_chassis_speeds(&self, wheels: &WheelSpeeds) -> ChassisSpeeds {
        ChassisSpeeds {
            vx_ms: (wheels.left_ms + wheels.right_ms) / 2.0,
            omega_rads: (wheels.right_ms - wheels.left_ms) / self.track_width_m,
        }
    }
}
