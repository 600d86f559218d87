//! # Drive routine registry
//!
//! Holds every drive routine against the tag which selects it, along with the
//! control mode the drivebase must use for the routine's output. Switching
//! routines is the only way to cancel one, and the registry guarantees that a
//! routine which has been disabled is not polled again until it is next
//! selected.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, error, info, warn};
use std::collections::BTreeMap;
use util::telemetry::{Probe, Telemetry};

use super::{
    ControlMode, DriveCtrlError, DriveMotion, DriveRoutine, DriveRoutineParameters,
    DriveRoutineType,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A routine and the control mode its output is in.
struct DriveMode {
    routine: Box<dyn DriveRoutine>,
    control_mode: ControlMode,
}

pub struct DriveRoutineRegistry {
    modes: BTreeMap<DriveRoutineType, DriveMode>,

    /// The routine currently being polled
    active: Option<DriveRoutineType>,

    /// Parameters last applied, `None` if the last switch failed
    parameters: Option<DriveRoutineParameters>,

    control_mode: ControlMode,

    /// While disabled no routine is polled and the output is zero
    enabled: bool,

    current_motion: DriveMotion,

    left_probe: Probe,
    right_probe: Probe,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveRoutineRegistry {
    /// Create an empty registry. It starts disabled.
    pub fn new(telemetry: &mut Telemetry) -> Self {
        let left_probe = Probe::new();
        let right_probe = Probe::new();

        telemetry
            .register(true, left_probe.source(), "Drive/setpoint/Left")
            .register(true, right_probe.source(), "Drive/setpoint/Right");

        Self {
            modes: BTreeMap::new(),
            active: None,
            parameters: None,
            control_mode: ControlMode::PercentOutput,
            enabled: false,
            current_motion: DriveMotion::zero(),
            left_probe,
            right_probe,
        }
    }

    /// Register the routine to run when `tag` is selected. Replacing the
    /// active routine deactivates it.
    pub fn register_drive_routine(
        &mut self,
        tag: DriveRoutineType,
        routine: Box<dyn DriveRoutine>,
        control_mode: ControlMode,
    ) -> &mut Self {
        debug!("Registered {} drive routine for {:?}", routine.name(), tag);

        let old = self.modes.insert(tag, DriveMode { routine, control_mode });

        if old.is_some() {
            warn!("Drive routine for {:?} replaced", tag);

            if self.active == Some(tag) {
                self.deactivate();
            }
        }

        self
    }

    /// Switch to the routine selected by `params`.
    ///
    /// The outgoing routine is disabled, then the incoming routine is reset
    /// with the parameters and enabled. Parameters identical to those last
    /// applied are ignored. An unregistered tag is an error and leaves the
    /// active routine running. If the incoming routine rejects the parameters
    /// no routine is active and the output is zero until the next successful
    /// switch.
    pub fn set_drive_routine(&mut self, params: DriveRoutineParameters) -> Result<(), DriveCtrlError> {
        if self.parameters.as_ref() == Some(&params) {
            debug!("Drive parameters are identical, not applying");
            return Ok(());
        }

        let tag = params.routine_type();
        if !self.modes.contains_key(&tag) {
            error!("No drive routine registered for {:?}", tag);
            return Err(DriveCtrlError::UnregisteredRoutine(tag));
        }

        if let Some(old) = self.active.take() {
            if let Some(mode) = self.modes.get_mut(&old) {
                mode.routine.disable();
            }
        }
        self.control_mode = ControlMode::PercentOutput;
        self.set_motion(DriveMotion::zero());
        self.parameters = None;

        let mode = match self.modes.get_mut(&tag) {
            Some(m) => m,
            None => return Err(DriveCtrlError::UnregisteredRoutine(tag)),
        };

        if let Err(e) = mode.routine.reset(&params) {
            error!("{} drive routine rejected {}: {}", mode.routine.name(), params, e);
            return Err(e);
        }

        info!(
            "Switching to {} drive routine ({}) using {:?}",
            mode.routine.name(),
            params,
            mode.control_mode
        );

        mode.routine.enable();

        self.active = Some(tag);
        self.control_mode = mode.control_mode;
        self.parameters = Some(params);

        Ok(())
    }

    /// Poll the active routine with the current wheel speeds, getting the
    /// demand and the mode to apply it in.
    ///
    /// A non-finite demand is replaced with zero.
    pub fn update(&mut self, left_speed: f64, right_speed: f64) -> (DriveMotion, ControlMode) {
        let mode = match (self.enabled, self.active) {
            (true, Some(tag)) => self.modes.get_mut(&tag),
            _ => None,
        };

        let motion = match mode {
            Some(m) => {
                let motion = m.routine.get_motion(left_speed, right_speed);
                if motion.is_finite() {
                    motion
                } else {
                    warn!("{} drive routine produced {}, stopping", m.routine.name(), motion);
                    DriveMotion::zero()
                }
            }
            None => DriveMotion::zero(),
        };

        self.set_motion(motion);

        (motion, self.control_mode)
    }

    /// True if the active routine has nothing more to do, or if there is no
    /// active routine.
    pub fn has_finished(&self) -> bool {
        self.active_mode()
            .map(|m| m.routine.has_finished())
            .unwrap_or(true)
    }

    /// Resume polling the active routine.
    pub fn enable(&mut self) {
        self.enabled = true;

        if let Some(tag) = self.active {
            if let Some(mode) = self.modes.get_mut(&tag) {
                mode.routine.enable();
            }
        }
    }

    /// Stop polling and disable the active routine. It stays selected.
    pub fn disable(&mut self) {
        self.enabled = false;

        if let Some(tag) = self.active {
            if let Some(mode) = self.modes.get_mut(&tag) {
                mode.routine.disable();
            }
        }

        self.set_motion(DriveMotion::zero());
    }

    /// Parameters applied by the last successful switch.
    pub fn parameters(&self) -> Option<&DriveRoutineParameters> {
        self.parameters.as_ref()
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active_mode().map(|m| m.routine.name())
    }

    pub fn control_mode(&self) -> ControlMode {
        self.control_mode
    }

    /// The demand from the last update.
    pub fn current_motion(&self) -> DriveMotion {
        self.current_motion
    }

    fn active_mode(&self) -> Option<&DriveMode> {
        self.active.and_then(|tag| self.modes.get(&tag))
    }

    fn deactivate(&mut self) {
        self.active = None;
        self.parameters = None;
        self.control_mode = ControlMode::PercentOutput;
        self.set_motion(DriveMotion::zero());
    }

    fn set_motion(&mut self, motion: DriveMotion) {
        self.current_motion = motion;
        self.left_probe.set(motion.left);
        self.right_probe.set(motion.right);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Events = Rc<RefCell<Vec<String>>>;

    /// Records every call made to it.
    struct Recorder {
        name: String,
        events: Events,
        output: f64,
        fail_reset: bool,
    }

    impl Recorder {
        fn boxed(name: &str, events: &Events, output: f64) -> Box<dyn DriveRoutine> {
            Box::new(Self {
                name: name.to_string(),
                events: events.clone(),
                output,
                fail_reset: false,
            })
        }

        fn log(&self, what: &str) {
            self.events.borrow_mut().push(format!("{}.{}", self.name, what));
        }
    }

    impl DriveRoutine for Recorder {
        fn reset(&mut self, params: &DriveRoutineParameters) -> Result<(), DriveCtrlError> {
            self.log("reset");
            if self.fail_reset {
                return Err(DriveCtrlError::UnsupportedParameters {
                    routine: self.name.clone(),
                    params: params.to_string(),
                });
            }
            Ok(())
        }

        fn get_motion(&mut self, _l: f64, _r: f64) -> DriveMotion {
            self.log("get");
            DriveMotion::new(self.output, self.output)
        }

        fn has_finished(&self) -> bool {
            false
        }

        fn name(&self) -> &str {
            &self.name
        }

        fn enable(&mut self) {
            self.log("enable");
        }

        fn disable(&mut self) {
            self.log("disable");
        }
    }

    fn registry(events: &Events) -> DriveRoutineRegistry {
        let mut reg = DriveRoutineRegistry::new(&mut Telemetry::new(true));
        reg.register_drive_routine(
            DriveRoutineType::ConstantPower,
            Recorder::boxed("A", events, 0.1),
            ControlMode::PercentOutput,
        )
        .register_drive_routine(
            DriveRoutineType::Cheesy,
            Recorder::boxed("B", events, 0.2),
            ControlMode::Voltage,
        );
        reg.enable();
        reg
    }

    fn take(events: &Events) -> Vec<String> {
        events.borrow_mut().drain(..).collect()
    }

    #[test]
    fn test_switch_order() {
        let events = Events::default();
        let mut reg = registry(&events);

        // Nothing selected yet
        assert_eq!(reg.update(0.0, 0.0), (DriveMotion::zero(), ControlMode::PercentOutput));
        assert!(reg.has_finished());

        reg.set_drive_routine(DriveRoutineParameters::ConstantPower(0.1)).unwrap();
        assert_eq!(reg.update(0.0, 0.0), (DriveMotion::new(0.1, 0.1), ControlMode::PercentOutput));
        assert_eq!(take(&events), vec!["A.reset", "A.enable", "A.get"]);

        reg.set_drive_routine(DriveRoutineParameters::Cheesy).unwrap();
        assert_eq!(reg.update(0.0, 0.0), (DriveMotion::new(0.2, 0.2), ControlMode::Voltage));
        assert_eq!(take(&events), vec!["A.disable", "B.reset", "B.enable", "B.get"]);

        // The outgoing routine is never polled again
        for _ in 0..5 {
            reg.update(0.0, 0.0);
        }
        assert!(take(&events).iter().all(|e| e == "B.get"));
        assert_eq!(reg.active_name(), Some("B"));
        assert!(!reg.has_finished());
    }

    #[test]
    fn test_identical_parameters_ignored() {
        let events = Events::default();
        let mut reg = registry(&events);

        reg.set_drive_routine(DriveRoutineParameters::ConstantPower(0.1)).unwrap();
        take(&events);

        reg.set_drive_routine(DriveRoutineParameters::ConstantPower(0.1)).unwrap();
        assert!(take(&events).is_empty());

        // New value for the same routine is applied
        reg.set_drive_routine(DriveRoutineParameters::ConstantPower(0.3)).unwrap();
        assert_eq!(take(&events), vec!["A.disable", "A.reset", "A.enable"]);
        assert_eq!(reg.parameters(), Some(&DriveRoutineParameters::ConstantPower(0.3)));
    }

    #[test]
    fn test_unregistered_tag_is_error() {
        let events = Events::default();
        let mut reg = registry(&events);
        reg.set_drive_routine(DriveRoutineParameters::Cheesy).unwrap();
        take(&events);

        let res = reg.set_drive_routine(DriveRoutineParameters::ArcadeDutyCycle);
        assert!(matches!(
            res,
            Err(DriveCtrlError::UnregisteredRoutine(DriveRoutineType::ArcadeDutyCycle))
        ));

        // The active routine carries on
        assert!(take(&events).is_empty());
        assert_eq!(reg.update(0.0, 0.0).0, DriveMotion::new(0.2, 0.2));
    }

    #[test]
    fn test_failed_reset_leaves_nothing_active() {
        let events = Events::default();
        let mut reg = registry(&events);
        reg.register_drive_routine(
            DriveRoutineType::Spline,
            Box::new(Recorder {
                name: "C".to_string(),
                events: events.clone(),
                output: 0.5,
                fail_reset: true,
            }),
            ControlMode::PercentOutput,
        );

        reg.set_drive_routine(DriveRoutineParameters::Cheesy).unwrap();
        take(&events);

        let params = DriveRoutineParameters::Spline {
            waypoints: vec![],
            forward: true,
            relative: true,
        };
        assert!(reg.set_drive_routine(params.clone()).is_err());
        assert_eq!(take(&events), vec!["B.disable", "C.reset"]);

        assert_eq!(reg.update(0.0, 0.0), (DriveMotion::zero(), ControlMode::PercentOutput));
        assert!(take(&events).is_empty());
        assert!(reg.has_finished());
        assert_eq!(reg.parameters(), None);

        // Retrying the same parameters tries again
        assert!(reg.set_drive_routine(params).is_err());
        assert_eq!(take(&events), vec!["C.reset"]);
    }

    #[test]
    fn test_disable_stops_polling() {
        let events = Events::default();
        let mut reg = registry(&events);
        reg.set_drive_routine(DriveRoutineParameters::Cheesy).unwrap();
        reg.update(0.0, 0.0);
        take(&events);

        reg.disable();
        assert_eq!(reg.update(0.0, 0.0).0, DriveMotion::zero());
        assert_eq!(reg.current_motion(), DriveMotion::zero());
        assert_eq!(take(&events), vec!["B.disable"]);

        reg.enable();
        assert_eq!(reg.update(0.0, 0.0).0, DriveMotion::new(0.2, 0.2));
        assert_eq!(take(&events), vec!["B.enable", "B.get"]);
    }

    #[test]
    fn test_non_finite_output_zeroed() {
        let events = Events::default();
        let mut reg = registry(&events);
        reg.register_drive_routine(
            DriveRoutineType::Trajectory,
            Recorder::boxed("NaN", &events, std::f64::NAN),
            ControlMode::Voltage,
        );

        let traj = Rc::new(crate::traj::tests::accel_then_coast());
        reg.set_drive_routine(DriveRoutineParameters::Trajectory { trajectory: traj, relative: false })
            .unwrap();

        assert_eq!(reg.update(0.0, 0.0), (DriveMotion::zero(), ControlMode::Voltage));
    }
}
