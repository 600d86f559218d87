//! Deadband wrapper

use super::{DriveCtrlError, DriveMotion, DriveRoutine, DriveRoutineParameters};

/// Wraps another routine and zeroes any side whose demand is smaller than the
/// deadband, so that motors aren't driven at levels too small to move them.
pub struct Deadband {
    inner: Box<dyn DriveRoutine>,
    deadband: f64,
}

impl Deadband {
    pub fn new(inner: Box<dyn DriveRoutine>, deadband: f64) -> Self {
        Self {
            inner,
            deadband: deadband.abs(),
        }
    }

    fn apply(&self, value: f64) -> f64 {
        if value.abs() < self.deadband {
            0.0
        } else {
            value
        }
    }
}

impl DriveRoutine for Deadband {
    fn reset(&mut self, params: &DriveRoutineParameters) -> Result<(), DriveCtrlError> {
        self.inner.reset(params)
    }

    fn get_motion(&mut self, left_speed: f64, right_speed: f64) -> DriveMotion {
        let m = self.inner.get_motion(left_speed, right_speed);
        DriveMotion::new(self.apply(m.left), self.apply(m.right))
    }

    fn has_finished(&self) -> bool {
        self.inner.has_finished()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn enable(&mut self) {
        self.inner.enable()
    }

    fn disable(&mut self) {
        self.inner.disable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive_ctrl::ConstantDrive;

    #[test]
    fn test_small_demands_zeroed() {
        let mut drive = Deadband::new(Box::new(ConstantDrive::new()), 0.02);
        assert_eq!(drive.name(), "ConstantDrive");

        drive.reset(&DriveRoutineParameters::ConstantPower(0.019)).unwrap();
        assert_eq!(drive.get_motion(0.0, 0.0), DriveMotion::zero());

        drive.reset(&DriveRoutineParameters::ConstantPower(-0.02)).unwrap();
        assert_eq!(drive.get_motion(0.0, 0.0), DriveMotion::new(-0.02, -0.02));

        drive.reset(&DriveRoutineParameters::ConstantPower(0.5)).unwrap();
        assert_eq!(drive.get_motion(0.0, 0.0), DriveMotion::new(0.5, 0.5));
        assert!(drive.has_finished());
    }
}
