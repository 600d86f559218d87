//! Drive demands

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The demand to give to the motors on each side of the robot. The units
/// depend on the `ControlMode` of the routine which produced it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DriveMotion {
    pub left: f64,
    pub right: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Which sides of the drivebase to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriveSide {
    Both,
    Left,
    Right,
}

/// How the drivebase interprets a `DriveMotion`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlMode {
    /// Duty cycle in `[-1, 1]`
    PercentOutput,

    /// Wheel speed in meters/second
    Speed,

    /// Motor voltage
    Voltage,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveMotion {
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_finite(&self) -> bool {
        self.left.is_finite() && self.right.is_finite()
    }
}

impl Hash for DriveMotion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Equal values must hash equally, and -0.0 == 0.0
        let bits = |v: f64| if v == 0.0 { 0u64 } else { v.to_bits() };
        bits(self.left).hash(state);
        bits(self.right).hash(state);
    }
}

impl fmt::Display for DriveMotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Left: {}, Right: {}", self.left, self.right)
    }
}

impl Default for DriveSide {
    fn default() -> Self {
        DriveSide::Both
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(m: DriveMotion) -> u64 {
        let mut h = DefaultHasher::new();
        m.hash(&mut h);
        h.finish()
    }

    #[test]
    fn test_value_equality_and_hash() {
        let a = DriveMotion::new(0.5, -0.5);
        let b = DriveMotion::new(0.5, -0.5);
        assert_eq!(a, b);
        assert_eq!(hash_of(a), hash_of(b));

        let z = DriveMotion::new(-0.0, 0.0);
        assert_eq!(z, DriveMotion::zero());
        assert_eq!(hash_of(z), hash_of(DriveMotion::zero()));

        assert_ne!(a, DriveMotion::new(-0.5, 0.5));
    }
}
