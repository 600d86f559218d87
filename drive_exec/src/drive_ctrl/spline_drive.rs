//! # Spline drive
//!
//! Walks the drivebase through a list of waypoints. The waypoints are turned
//! into a trajectory, split into a segment list per side, and each side
//! follows its list with an `EncoderFollower` using its encoder distance as
//! feedback.
//!
//! The followers advance one segment per call, so the routine must be polled
//! at the segment period. Driving in reverse follows the mirrored segments
//! and negates the output.
//!
//! The shape of the path is whatever the injected `TrajectoryGenerator` makes
//! of the waypoints. With `StraightLineGenerator`, as the executable wires it,
//! interior waypoints and the end heading are dropped and the robot drives a
//! straight line from the first waypoint to the last.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, info};
use std::rc::Rc;
use util::{maths::rad_to_deg, telemetry::{Probe, Telemetry}};

use super::{DriveCtrlError, DriveMotion, DriveRoutine, DriveRoutineParameters, Params};
use crate::clock::Clock;
use crate::ctrl::{EncoderFollower, FollowerGains, Sensor};
use crate::loc::{Location, Pose2d, Position};
use crate::traj::{tank_modify, Segment, TrajectoryGenerator, TrajectorySpec};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Width of the progress bar written to the log.
const PROGRESS_LENGTH: usize = 50;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct SplineDrive {
    generator: Box<dyn TrajectoryGenerator>,
    left_distance: Sensor,
    right_distance: Sensor,
    location: Rc<dyn Location>,
    clock: Rc<dyn Clock>,

    gains: FollowerGains,
    track_width_m: f64,
    segment_dt_s: f64,
    progress_period_s: f64,

    // Everything below changes with the waypoints
    followers: Option<(EncoderFollower, EncoderFollower)>,

    /// 1 forwards, -1 in reverse
    scale: f64,

    enabled: bool,
    initial_position: Position,
    start_pose: Pose2d,
    final_pose: Pose2d,
    segment_num: usize,
    next_update_s: f64,
    final_position_logged: bool,

    progress_probe: Probe,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SplineDrive {
    pub fn new(
        params: &Params,
        generator: Box<dyn TrajectoryGenerator>,
        left_distance: Sensor,
        right_distance: Sensor,
        location: Rc<dyn Location>,
        clock: Rc<dyn Clock>,
        telemetry: &mut Telemetry,
    ) -> Self {
        let progress_probe = Probe::new();
        telemetry.register(true, progress_probe.source(), "Drive/Spline/segment");

        Self {
            generator,
            left_distance,
            right_distance,
            location,
            clock,
            gains: params.follower_gains,
            track_width_m: params.track_width_m,
            segment_dt_s: params.spline_dt_s,
            progress_period_s: params.spline_progress_period_s,
            followers: None,
            scale: 1.0,
            enabled: false,
            initial_position: Position::default(),
            start_pose: Pose2d::default(),
            final_pose: Pose2d::default(),
            segment_num: 0,
            next_update_s: 0.0,
            final_position_logged: false,
            progress_probe,
        }
    }

    /// Tell the location where we should be so that it can be plotted against
    /// where we are.
    fn update_location(&self) {
        let (left, right) = match self.followers {
            Some((ref l, ref r)) => (l.segment(), r.segment()),
            None => return,
        };

        if let (Some(l), Some(r)) = (left, right) {
            let desired = Position::new(
                (l.x_m + r.x_m) / 2.0,
                (l.y_m + r.y_m) / 2.0,
                rad_to_deg(l.heading_rad),
            );
            self.location.set_desired_location(desired);
            debug!(
                "Desired position (left/right): {:.2}, {:.2} and {:.2}, {:.2}, velocity {:.2} and {:.2}",
                l.x_m, l.y_m, r.x_m, r.y_m, l.velocity_ms, r.velocity_ms
            );
        }
    }

    fn num_segments(&self) -> usize {
        self.followers.as_ref().map(|(l, _)| l.len()).unwrap_or(0)
    }

    fn maybe_log_progress(&mut self) {
        let now = self.clock.current_time();
        if now < self.next_update_s {
            return;
        }
        self.next_update_s = now + self.progress_period_s;
        info!("{}", progress_bar(self.segment_num, self.num_segments()));
    }

    /// Log the final position and how it compares to where the robot was
    /// meant to end up. Only done once per set of waypoints.
    fn maybe_log_final_position(&mut self) {
        if self.final_position_logged {
            return;
        }
        self.final_position_logged = true;

        info!("{}", progress_bar(self.segment_num, self.num_segments()));

        let final_pos = self.location.current_location();
        let expected_diff = self.final_pose.relative_to(&self.start_pose).to_position();
        let actual_diff = final_pos.relative_to(&self.initial_position);

        let expected_dist = expected_diff.distance_to(&Position::default());
        let actual_dist = final_pos.distance_to(&self.initial_position);
        let percentage = if expected_dist != 0.0 {
            100.0 * actual_dist / expected_dist
        } else {
            100.0
        };

        info!(
            "Finished driving, expected to be at {} but got to {}",
            expected_diff, actual_diff
        );
        info!(
            "Travelled {:.1}% of the expected {:.2} m",
            percentage, expected_dist
        );
    }
}

impl DriveRoutine for SplineDrive {
    fn reset(&mut self, params: &DriveRoutineParameters) -> Result<(), DriveCtrlError> {
        let (waypoints, forward, relative) = match params {
            DriveRoutineParameters::Spline { waypoints, forward, relative } => {
                (waypoints, *forward, *relative)
            }
            other => {
                return Err(DriveCtrlError::UnsupportedParameters {
                    routine: self.name().to_string(),
                    params: other.to_string(),
                })
            }
        };

        if waypoints.len() < 2 {
            return Err(DriveCtrlError::TooFewWaypoints(self.name().to_string()));
        }

        info!("Starting to drive spline through {} waypoints", waypoints.len());
        // Only encoder distances are followed, so the frame of the waypoints
        // makes no difference.
        debug!("Spline relative flag {} ignored", relative);

        let n = waypoints.len();
        let spec = TrajectorySpec {
            start: waypoints[0],
            interior_m: waypoints[1..n - 1].iter().map(|p| p.translation_m).collect(),
            end: waypoints[n - 1],
            forward,
        };
        let trajectory = self.generator.generate(&spec)?;

        let (mut left, mut right) = tank_modify(&trajectory, self.track_width_m, self.segment_dt_s);

        // In reverse, follow the mirrored segments with negated distances
        self.scale = if forward { 1.0 } else { -1.0 };
        if !forward {
            left.iter_mut().chain(right.iter_mut()).for_each(mirror);
        }

        self.initial_position = self.location.current_location();
        if !forward {
            self.initial_position = self.initial_position.reversed();
        }

        self.followers = Some((
            EncoderFollower::new(left, self.gains, self.scale * (self.left_distance)()),
            EncoderFollower::new(right, self.gains, self.scale * (self.right_distance)()),
        ));

        self.start_pose = waypoints[0];
        self.final_pose = waypoints[n - 1];
        self.segment_num = 0;
        self.next_update_s = 0.0;
        self.final_position_logged = false;
        self.enabled = true;

        Ok(())
    }

    fn get_motion(&mut self, _left_speed: f64, _right_speed: f64) -> DriveMotion {
        self.segment_num += 1;
        self.progress_probe.set(self.segment_num as f64);
        self.update_location();

        let running = self.enabled && !self.has_finished();
        if !running {
            self.maybe_log_final_position();
            return DriveMotion::zero();
        }

        self.maybe_log_progress();

        let left_dist = self.scale * (self.left_distance)();
        let right_dist = self.scale * (self.right_distance)();

        let (left, right, finished) = match self.followers {
            Some((ref mut l, ref mut r)) => (l.calculate(left_dist), r.calculate(right_dist), l.is_finished()),
            None => return DriveMotion::zero(),
        };

        if finished {
            info!("Finished driving trajectory");
        }

        DriveMotion::new(self.scale * left, self.scale * right)
    }

    fn has_finished(&self) -> bool {
        match self.followers {
            Some((ref l, _)) => l.is_finished(),
            None => true,
        }
    }

    fn name(&self) -> &str {
        "Spline"
    }

    /// Nothing to do, driving starts on the next `reset`.
    fn enable(&mut self) {}

    fn disable(&mut self) {
        self.enabled = false;
    }
}

fn mirror(seg: &mut Segment) {
    seg.position_m = -seg.position_m;
    seg.velocity_ms = -seg.velocity_ms;
    seg.accel_mss = -seg.accel_mss;
}

/// Progress indicator like `|=======================>      |`.
fn progress_bar(done: usize, total: usize) -> String {
    let progress = if total > 0 {
        ((PROGRESS_LENGTH - 2) * done.min(total)) / total
    } else {
        PROGRESS_LENGTH - 2
    };

    let mut bar = String::with_capacity(PROGRESS_LENGTH);
    bar.push('|');
    bar.extend(std::iter::repeat('=').take(progress));
    if bar.len() < PROGRESS_LENGTH - 1 {
        bar.push('>');
    }
    while bar.len() < PROGRESS_LENGTH - 1 {
        bar.push(' ');
    }
    bar.push('|');
    bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::loc::LocMgr;
    use crate::traj::{StraightLineGenerator, TrajError, Trajectory};
    use std::cell::Cell;

    struct Rig {
        clock: ManualClock,
        loc: Rc<LocMgr>,
        left: Rc<Cell<f64>>,
        right: Rc<Cell<f64>>,
        drive: SplineDrive,
    }

    fn rig_with(generator: Box<dyn TrajectoryGenerator>) -> Rig {
        let clock = ManualClock::new();
        let loc = Rc::new(LocMgr::new());
        let left = Rc::new(Cell::new(0.0));
        let right = Rc::new(Cell::new(0.0));
        let (l, r) = (left.clone(), right.clone());

        let drive = SplineDrive::new(
            &Params::default(),
            generator,
            Box::new(move || l.get()),
            Box::new(move || r.get()),
            loc.clone(),
            Rc::new(clock.clone()),
            &mut Telemetry::new(true),
        );
        Rig { clock, loc, left, right, drive }
    }

    fn rig() -> Rig {
        rig_with(Box::new(StraightLineGenerator::new(1.0, 1.0, 0.02)))
    }

    fn spline(end_x: f64, forward: bool) -> DriveRoutineParameters {
        DriveRoutineParameters::Spline {
            waypoints: vec![Pose2d::new(0.0, 0.0, 0.0), Pose2d::new(end_x, 0.0, 0.0)],
            forward,
            relative: true,
        }
    }

    #[test]
    fn test_forward_runs_to_completion() {
        let mut r = rig();
        assert!(r.drive.has_finished());

        r.drive.reset(&spline(1.0, true)).unwrap();
        r.drive.enable();
        assert!(!r.drive.has_finished());

        // 2 s of segments at 0.02 s, plus the initial one
        let mut calls = 0;
        while !r.drive.has_finished() {
            let m = r.drive.get_motion(0.0, 0.0);
            if calls > 0 {
                assert!(m.left > 0.0 && m.right > 0.0);
            }
            calls += 1;
            r.clock.advance(0.02);
            assert!(calls <= 101);
        }
        assert_eq!(calls, 101);

        assert_eq!(r.drive.get_motion(0.0, 0.0), DriveMotion::zero());

        // Desired position tracks the end of the line
        assert!((r.loc.desired_location().x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_reverse_negates_output() {
        let mut r = rig();
        r.left.set(5.0);
        r.right.set(5.0);

        r.drive.reset(&spline(-1.0, false)).unwrap();
        r.drive.get_motion(0.0, 0.0);

        let m = r.drive.get_motion(0.0, 0.0);
        assert!(m.left < 0.0 && m.right < 0.0);

        // Encoders left behind the target pushes harder in reverse
        for _ in 0..10 {
            r.drive.get_motion(0.0, 0.0);
        }
        let behind = r.drive.get_motion(0.0, 0.0);
        assert!(behind.left < m.left);
    }

    #[test]
    fn test_disable_stops_output() {
        let mut r = rig();
        r.drive.reset(&spline(1.0, true)).unwrap();
        r.drive.get_motion(0.0, 0.0);
        r.drive.disable();
        assert_eq!(r.drive.get_motion(0.0, 0.0), DriveMotion::zero());
    }

    #[test]
    fn test_bad_parameters() {
        let mut r = rig();

        let one = DriveRoutineParameters::Spline {
            waypoints: vec![Pose2d::default()],
            forward: true,
            relative: true,
        };
        assert!(matches!(r.drive.reset(&one), Err(DriveCtrlError::TooFewWaypoints(_))));
        assert!(matches!(
            r.drive.reset(&DriveRoutineParameters::Cheesy),
            Err(DriveCtrlError::UnsupportedParameters { .. })
        ));

        struct Failing;
        impl TrajectoryGenerator for Failing {
            fn generate(&self, _spec: &TrajectorySpec) -> Result<Trajectory, TrajError> {
                Err(TrajError::Generation("no".into()))
            }
        }

        let mut r = rig_with(Box::new(Failing));
        assert!(matches!(
            r.drive.reset(&spline(1.0, true)),
            Err(DriveCtrlError::TrajError(_))
        ));
        assert!(r.drive.has_finished());
    }

    #[test]
    fn test_waypoints_passed_to_generator() {
        use std::cell::RefCell;

        struct Recording {
            last: Rc<RefCell<Option<TrajectorySpec>>>,
        }
        impl TrajectoryGenerator for Recording {
            fn generate(&self, spec: &TrajectorySpec) -> Result<Trajectory, TrajError> {
                *self.last.borrow_mut() = Some(spec.clone());
                StraightLineGenerator::new(1.0, 1.0, 0.02).generate(spec)
            }
        }

        let last = Rc::new(RefCell::new(None));
        let mut r = rig_with(Box::new(Recording { last: last.clone() }));

        let waypoints = vec![
            Pose2d::new(0.0, 0.0, 0.0),
            Pose2d::new(1.0, 0.5, 0.3),
            Pose2d::new(2.0, 1.0, 0.0),
            Pose2d::new(3.0, 1.0, 1.2),
        ];
        r.drive
            .reset(&DriveRoutineParameters::Spline {
                waypoints: waypoints.clone(),
                forward: false,
                relative: false,
            })
            .unwrap();

        let spec = last.borrow().clone().unwrap();
        assert_eq!(spec.start, waypoints[0]);
        assert_eq!(spec.end, waypoints[3]);
        assert_eq!(
            spec.interior_m,
            vec![waypoints[1].translation_m, waypoints[2].translation_m]
        );
        assert!(!spec.forward);
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0, 10).len(), PROGRESS_LENGTH);
        assert!(progress_bar(0, 10).starts_with("|>"));
        assert!(progress_bar(5, 10).starts_with(&format!("|{}>", "=".repeat(24))));
        assert_eq!(progress_bar(10, 10), format!("|{}|", "=".repeat(48)));
        assert_eq!(progress_bar(20, 10), format!("|{}|", "=".repeat(48)));
    }
}
