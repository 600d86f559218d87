//! Field positions with headings in degrees.
//!
//! X is positive forwards, Y positive to the left, and headings are positive
//! anticlockwise. All operations return new values, a `Position` is never
//! edited in place once handed to someone else.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt;
use util::maths::{
    normalise, rad_to_deg, rotate_vector, FULL_CIRCLE_DEG, HALF_CIRCLE_DEG,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Tolerance used by `approx_eq`.
const POSITION_TOLERANCE: f64 = 0.1;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A position on the field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,

    pub y: f64,

    /// Heading from the initial direction. May be outside `[-180, 180]`, use
    /// the bearing helpers to compare headings.
    ///
    /// Units: degrees
    pub heading_deg: f64,

    pub speed: f64,

    /// Time at which the position was measured.
    ///
    /// Units: seconds
    pub time_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Position {
    pub fn new(x: f64, y: f64, heading_deg: f64) -> Self {
        Self {
            x,
            y,
            heading_deg,
            speed: 0.0,
            time_s: 0.0,
        }
    }

    /// Express this position relative to `origin`.
    ///
    /// The returned heading is the bearing from `origin` to this position,
    /// relative to the origin's heading. Normally used to find where something
    /// is relative to the robot.
    pub fn relative_to(&self, origin: &Position) -> Position {
        let dx = self.x - origin.x;
        let dy = self.y - origin.y;
        let angle_deg = rad_to_deg(dy.atan2(dx));
        let (x, y) = rotate_vector(dx, dy, -origin.heading_deg);

        Position::new(x, y, angle_deg - origin.heading_deg)
    }

    /// Add a relative position on to this one. The inverse of `relative_to`.
    pub fn add(&self, other: &Position) -> Position {
        let (x, y) = rotate_vector(other.x, other.y, self.heading_deg);
        Position::new(self.x + x, self.y + y, self.heading_deg - other.heading_deg)
    }

    /// Move `distance` in the direction `angle_deg` relative to the current
    /// heading. The heading is unchanged.
    pub fn add_vector(&self, distance: f64, angle_deg: f64) -> Position {
        let (x, y) = rotate_vector(distance, 0.0, angle_deg + self.heading_deg);
        Position::new(self.x + x, self.y + y, self.heading_deg)
    }

    /// Bearing from this position to `target` in `[-180, 180]`, relative to
    /// this heading.
    ///
    /// If the two positions coincide the target's normalised heading is
    /// returned.
    pub fn bearing_to(&self, target: &Position) -> f64 {
        let dx = target.x - self.x;
        let dy = target.y - self.y;

        if dx == 0.0 && dy == 0.0 {
            return normalise(target.heading_deg, FULL_CIRCLE_DEG);
        }

        normalise(rad_to_deg(dy.atan2(dx)) - self.heading_deg, FULL_CIRCLE_DEG)
    }

    pub fn distance_to(&self, target: &Position) -> f64 {
        (target.x - self.x).hypot(target.y - self.y)
    }

    /// Absolute angle between the two headings, in `[0, 180]`.
    pub fn angle_between_bearings(&self, target: &Position) -> f64 {
        normalise(target.heading_deg - self.heading_deg, FULL_CIRCLE_DEG).abs()
    }

    /// The same position facing the other way.
    pub fn reversed(&self) -> Position {
        Position {
            heading_deg: normalise(self.heading_deg + HALF_CIRCLE_DEG, FULL_CIRCLE_DEG),
            ..*self
        }
    }

    /// Loose equality on position, heading and speed.
    pub fn approx_eq(&self, other: &Position) -> bool {
        let close = |a: f64, b: f64| (a - b).abs() < POSITION_TOLERANCE;

        close(self.x, other.x)
            && close(self.y, other.y)
            && close(self.heading_deg, other.heading_deg)
            && close(self.speed, other.speed)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "X({:.3}),Y({:.3}),H({:.3}),S({:.3})",
            self.x, self.y, self.heading_deg, self.speed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_position(x: f64, y: f64, h: f64, actual: Position) {
        assert!((actual.x - x).abs() < 0.01, "x: expected {} got {}", x, actual);
        assert!((actual.y - y).abs() < 0.01, "y: expected {} got {}", y, actual);
        assert!((actual.heading_deg - h).abs() < 0.01, "h: expected {} got {}", h, actual);
    }

    // Robot at (2, 4) facing +Y, target at (10, 4) to its right.
    fn robot_and_target() -> (Position, Position) {
        (Position::new(2.0, 4.0, 90.0), Position::new(10.0, 4.0, 180.0))
    }

    #[test]
    fn test_relative_to() {
        let (robot, target) = robot_and_target();
        assert_position(0.0, -8.0, -90.0, target.relative_to(&robot));
    }

    #[test]
    fn test_add_inverts_relative_to() {
        let (robot, target) = robot_and_target();
        let relative = target.relative_to(&robot);
        assert_position(target.x, target.y, target.heading_deg, robot.add(&relative));
    }

    #[test]
    fn test_add_vector() {
        let robot = Position::new(2.0, 4.0, 90.0);
        assert_position(2.0, 5.0, 90.0, robot.add_vector(1.0, 0.0));
        assert_position(1.0, 4.0, 90.0, robot.add_vector(1.0, 90.0));
        assert_position(3.0, 4.0, 90.0, robot.add_vector(1.0, -90.0));
        assert_position(2.0, 3.0, 90.0, robot.add_vector(1.0, 180.0));
    }

    #[test]
    fn test_bearing_to() {
        let (robot, target) = robot_and_target();
        assert!((robot.bearing_to(&target) + 90.0).abs() < 0.01);
        assert!(robot.bearing_to(&Position::new(2.0, 8.0, 180.0)).abs() < 0.01);
        assert!((robot.bearing_to(&Position::new(0.0, 4.0, 180.0)) - 90.0).abs() < 0.01);

        // Same point gives the target's heading
        assert!((robot.bearing_to(&Position::new(2.0, 4.0, 270.0)) + 90.0).abs() < 0.01);
    }

    #[test]
    fn test_distance_to() {
        let robot = Position::new(2.0, 4.0, -90.0);
        let target = Position::new(5.0, 8.0, 180.0);
        assert!((robot.distance_to(&target) - 5.0).abs() < 0.01);
    }

    #[test]
    fn test_reversed_is_pure() {
        let robot = Position::new(1.0, 1.0, 170.0);
        let rev = robot.reversed();
        assert_position(1.0, 1.0, -10.0, rev);
        assert_eq!(robot.heading_deg, 170.0);
        assert!((robot.angle_between_bearings(&rev) - 180.0).abs() < 0.01);
    }
}
