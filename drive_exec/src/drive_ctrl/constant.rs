//! Constant drive

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;

use super::{DriveCtrlError, DriveMotion, DriveRoutine, DriveRoutineParameters};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drives both sides at the value given in the parameters. Registered once for
/// constant power and once for constant speed, the registry's control mode
/// decides which it is.
#[derive(Debug, Default)]
pub struct ConstantDrive {
    motion: DriveMotion,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ConstantDrive {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DriveRoutine for ConstantDrive {
    fn reset(&mut self, params: &DriveRoutineParameters) -> Result<(), DriveCtrlError> {
        let value = match params {
            DriveRoutineParameters::ConstantPower(v) | DriveRoutineParameters::ConstantSpeed(v) => *v,
            other => {
                return Err(DriveCtrlError::UnsupportedParameters {
                    routine: self.name().to_string(),
                    params: other.to_string(),
                })
            }
        };

        debug!("ConstantDrive set to {}", value);
        self.motion = DriveMotion::new(value, value);
        Ok(())
    }

    fn get_motion(&mut self, _left_speed: f64, _right_speed: f64) -> DriveMotion {
        self.motion
    }

    fn has_finished(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "ConstantDrive"
    }
}
