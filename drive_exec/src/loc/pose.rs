//! Metric poses used by trajectories.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Rotation2, Vector2};
use serde::{Deserialize, Serialize};
use util::maths::{rad_to_deg, wrap_pi};

use super::Position;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A 2D pose: position in metres and heading in radians (anticlockwise from
/// the field X axis).
///
/// Serialises in the PathWeaver layout,
/// `{"translation": {"x", "y"}, "rotation": {"radians"}}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "PoseRepr", into = "PoseRepr")]
pub struct Pose2d {
    pub translation_m: Vector2<f64>,
    pub heading_rad: f64,
}

#[derive(Serialize, Deserialize)]
struct PoseRepr {
    translation: TranslationRepr,
    rotation: RotationRepr,
}

#[derive(Serialize, Deserialize)]
struct TranslationRepr {
    x: f64,
    y: f64,
}

#[derive(Serialize, Deserialize)]
struct RotationRepr {
    radians: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose2d {
    pub fn new(x_m: f64, y_m: f64, heading_rad: f64) -> Self {
        Self {
            translation_m: Vector2::new(x_m, y_m),
            heading_rad,
        }
    }

    pub fn x(&self) -> f64 {
        self.translation_m[0]
    }

    pub fn y(&self) -> f64 {
        self.translation_m[1]
    }

    /// Express this pose in the frame of `origin`.
    pub fn relative_to(&self, origin: &Pose2d) -> Pose2d {
        let offset = Rotation2::new(-origin.heading_rad)
            * (self.translation_m - origin.translation_m);

        Pose2d {
            translation_m: offset,
            heading_rad: wrap_pi(self.heading_rad - origin.heading_rad),
        }
    }

    pub fn distance_to(&self, other: &Pose2d) -> f64 {
        (other.translation_m - self.translation_m).norm()
    }

    /// Linear interpolation towards `end`, taking the short way round for the
    /// heading.
    pub fn lerp(&self, end: &Pose2d, t: f64) -> Pose2d {
        let t = t.max(0.0).min(1.0);
        let dh = wrap_pi(end.heading_rad - self.heading_rad);

        Pose2d {
            translation_m: self.translation_m + (end.translation_m - self.translation_m) * t,
            heading_rad: wrap_pi(self.heading_rad + dh * t),
        }
    }

    /// Convert into a `Position` with the heading in degrees.
    pub fn to_position(&self) -> Position {
        Position::new(self.x(), self.y(), rad_to_deg(self.heading_rad))
    }
}

impl Default for Pose2d {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

impl From<PoseRepr> for Pose2d {
    fn from(r: PoseRepr) -> Self {
        Pose2d::new(r.translation.x, r.translation.y, r.rotation.radians)
    }
}

impl From<Pose2d> for PoseRepr {
    fn from(p: Pose2d) -> Self {
        PoseRepr {
            translation: TranslationRepr { x: p.x(), y: p.y() },
            rotation: RotationRepr { radians: p.heading_rad },
        }
    }
}
