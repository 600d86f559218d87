//! Arcade drive
//!
//! Arcade drive mixes a move (forward/back) and turn input into left and right
//! demands, so one stick can drive the robot.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use util::{
    maths::{clamp, square_signed},
    telemetry::{Probe, Telemetry},
};

use super::{DriveMotion, DriveRoutine, DriveSide};
use crate::inputs::ContinuousRange;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Operator arcade drive.
pub struct ArcadeDrive {
    name: String,
    scale: f64,
    squared_inputs: bool,
    side: DriveSide,
    move_input: Box<dyn ContinuousRange>,
    turn_input: Box<dyn ContinuousRange>,
    move_probe: Probe,
    turn_probe: Probe,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert arcade move and turn values into left and right demands, each in
/// `[-scale, scale]`.
///
/// Inputs are clamped to `[-1, 1]` and, if `squared_inputs` is set, squared
/// keeping their sign. Driving only the left side subtracts the right demand
/// from it and zeroes the right. Driving only the right side zeroes the left
/// before subtracting it, so the right demand passes through unchanged.
pub fn arcade_to_tank(
    move_value: f64,
    turn_value: f64,
    scale: f64,
    squared_inputs: bool,
    side: DriveSide,
) -> DriveMotion {
    let mut m = clamp(move_value, -1.0, 1.0);
    let mut t = clamp(turn_value, -1.0, 1.0);

    if squared_inputs {
        m = square_signed(m);
        t = square_signed(t);
    }

    let (mut left, mut right) = if m > 0.0 {
        if t > 0.0 {
            (m - t, m.max(t))
        } else {
            (m.max(-t), m + t)
        }
    } else if t > 0.0 {
        (-(-m).max(t), m + t)
    } else {
        (m - t, -(-m).max(-t))
    };

    match side {
        DriveSide::Both => (),
        DriveSide::Left => {
            left -= right;
            right = 0.0;
        }
        DriveSide::Right => {
            left = 0.0;
            right -= left;
        }
    }

    DriveMotion::new(
        scale * clamp(left, -1.0, 1.0),
        scale * clamp(right, -1.0, 1.0),
    )
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ArcadeDrive {
    /// Create a new arcade routine. The name distinguishes duty cycle and
    /// speed variants in logs and telemetry.
    pub fn new(
        name: &str,
        scale: f64,
        squared_inputs: bool,
        move_input: Box<dyn ContinuousRange>,
        turn_input: Box<dyn ContinuousRange>,
        telemetry: &mut Telemetry,
    ) -> Self {
        let move_probe = Probe::new();
        let turn_probe = Probe::new();

        telemetry
            .register(true, move_probe.source(), format!("Drive/{}/move", name))
            .register(true, turn_probe.source(), format!("Drive/{}/turn", name));

        Self {
            name: name.to_string(),
            scale,
            squared_inputs,
            side: DriveSide::Both,
            move_input,
            turn_input,
            move_probe,
            turn_probe,
        }
    }

    /// Only drive one side of the drivebase.
    pub fn with_side(mut self, side: DriveSide) -> Self {
        self.side = side;
        self
    }
}

impl DriveRoutine for ArcadeDrive {
    fn get_motion(&mut self, _left_speed: f64, _right_speed: f64) -> DriveMotion {
        let m = self.move_input.read();
        let t = self.turn_input.read();

        self.move_probe.set(m);
        self.turn_probe.set(t);
        trace!("{}: move {:.3}, turn {:.3}", self.name, m, t);

        arcade_to_tank(m, t, self.scale, self.squared_inputs, self.side)
    }

    fn has_finished(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(m: f64, t: f64, expected: (f64, f64)) {
        let out = arcade_to_tank(m, t, 1.0, false, DriveSide::Both);
        assert!(
            (out.left - expected.0).abs() < 1e-9 && (out.right - expected.1).abs() < 1e-9,
            "arcade_to_tank({}, {}) = {}, expected {:?}",
            m, t, out, expected
        );
    }

    #[test]
    fn test_mixing_law() {
        check(0.5, 0.0, (0.5, 0.5));
        check(0.0, 0.5, (-0.5, 0.5));
        check(0.0, -0.5, (0.5, -0.5));
        check(-0.5, 0.0, (-0.5, -0.5));
        check(0.8, 0.3, (0.5, 0.8));
        check(0.8, -0.3, (0.8, 0.5));
        check(-0.8, 0.3, (-0.8, -0.5));
        check(-0.8, -0.3, (-0.5, -0.8));
    }

    #[test]
    fn test_zero_in_zero_out() {
        for &sq in [true, false].iter() {
            for &scale in [0.0, 0.5, 1.0, 3.0].iter() {
                let out = arcade_to_tank(0.0, 0.0, scale, sq, DriveSide::Both);
                assert_eq!(out, DriveMotion::new(0.0, 0.0));
            }
        }
    }

    #[test]
    fn test_output_within_scale() {
        let values = [-1e6, -3.0, -1.0, -0.7, -0.2, 0.0, 0.1, 0.5, 1.0, 2.5, 1e6];
        for &scale in [0.5, 1.0, 4.0].iter() {
            for &m in values.iter() {
                for &t in values.iter() {
                    for &sq in [true, false].iter() {
                        for &side in [DriveSide::Both, DriveSide::Left, DriveSide::Right].iter() {
                            let out = arcade_to_tank(m, t, scale, sq, side);
                            assert!(out.left.abs() <= scale + 1e-12);
                            assert!(out.right.abs() <= scale + 1e-12);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_squaring_keeps_sign() {
        for i in -10..=10 {
            let x = i as f64 / 10.0;
            let sq = square_signed(x);
            assert_eq!(sq == 0.0, x == 0.0);
            assert!(sq * x >= 0.0);

            // Only moving, so the squared move appears on both sides
            let out = arcade_to_tank(x, 0.0, 1.0, true, DriveSide::Both);
            assert!((out.left - sq).abs() < 1e-12);
        }
    }

    #[test]
    fn test_single_side_folding() {
        // Pivot right: left -0.5, right 0.5
        let l = arcade_to_tank(0.0, 0.5, 1.0, false, DriveSide::Left);
        assert_eq!(l, DriveMotion::new(-1.0, 0.0));

        // Left is zeroed before it is folded in, right is left as mixed
        let r = arcade_to_tank(0.0, 0.5, 1.0, false, DriveSide::Right);
        assert_eq!(r, DriveMotion::new(0.0, 0.5));

        let r = arcade_to_tank(0.8, -0.3, 1.0, false, DriveSide::Right);
        assert_eq!(r, DriveMotion::new(0.0, 0.8 - 0.3));

        // Scale is applied after folding
        let l = arcade_to_tank(-0.8, 0.8, 0.5, false, DriveSide::Left);
        assert_eq!(l, DriveMotion::new(-0.4, 0.0));
    }

    #[test]
    fn test_arcade_routine_reads_inputs() {
        let mut telem = Telemetry::new(true);
        let mut drive = ArcadeDrive::new(
            "Arcade",
            1.0,
            false,
            Box::new(|| 0.5),
            Box::new(|| 0.0),
            &mut telem,
        );

        assert_eq!(drive.get_motion(0.0, 0.0), DriveMotion::new(0.5, 0.5));
        assert!(drive.has_finished());
        assert_eq!(drive.name(), "Arcade");

        telem.sample(0.0).unwrap();
        assert_eq!(telem.latest("Drive/Arcade/move"), Some(0.5));
    }
}
