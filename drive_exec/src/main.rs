//! Main drive executable entry point.
//!
//! # Architecture
//!
//! The executable runs the drive routines against a simulated drivebase:
//!
//!     - Initialise the session, logging and parameters
//!     - Register every drive routine with the registry
//!     - Main loop:
//!         - Step the simulation with the last demand
//!         - Sequence the demo, switching routines as each phase ends
//!         - Drive routine processing
//!         - Telemetry sampling
//!
//! The demo drives at constant power for a short spell, then follows a
//! trajectory from wherever the robot ended up to the demo end pose.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{info, warn};
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use drive_lib::{
    clock::{Clock, SystemClock},
    drive_ctrl::*,
    loc::{LocMgr, Location},
    params::DriveExecParams,
    sim::SimDrivebase,
    traj::{StraightLineGenerator, TrajectoryCache, TrajectoryGenerator, TrajectorySpec},
};
use util::{
    archive::Archiver,
    host,
    logger::{logger_init, LevelFilter},
    session::Session,
    telemetry::Telemetry,
};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Phases of the demo.
#[derive(Debug, Clone, Copy, PartialEq)]
enum DemoPhase {
    ConstantPower,
    Trajectory,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    let session = Session::new("drive_exec", "sessions").wrap_err("Failed to create the session")?;

    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    info!("Drive Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let drive_params: Params =
        util::params::load("drive_ctrl.toml").wrap_err("Could not load drive params")?;
    let exec_params: DriveExecParams =
        util::params::load("drive_exec.toml").wrap_err("Could not load exec params")?;

    info!("Parameters loaded");

    // ---- INITIALISE MODULES ----

    let archiver = Archiver::from_path(&session, "drive_telemetry.csv")
        .wrap_err("Failed to create the telemetry archive")?;
    let mut telemetry = Telemetry::new(false).with_archive(archiver);

    let clock = Rc::new(SystemClock::new());
    let loc_mgr = Rc::new(LocMgr::new());
    let mut sim = SimDrivebase::new(&drive_params, exec_params.demo_trajectory.start, loc_mgr.clone());

    let cache_dir = host::get_sw_root()
        .wrap_err("The DRIVE_SW_ROOT environment variable is not set")?
        .join(&exec_params.traj_cache_dir);
    let generator = StraightLineGenerator::new(
        drive_params.max_speed_ms,
        drive_params.max_accel_mss,
        exec_params.traj_dt_s,
    );
    let traj_cache = TrajectoryCache::new(&cache_dir, Box::new(generator));

    let mut registry = DriveRoutineRegistry::new(&mut telemetry);

    // No driver station in simulation, operator inputs are held at rest
    registry
        .register_drive_routine(
            DriveRoutineType::ConstantPower,
            Box::new(ConstantDrive::new()),
            ControlMode::PercentOutput,
        )
        .register_drive_routine(
            DriveRoutineType::ConstantSpeed,
            Box::new(ConstantDrive::new()),
            ControlMode::Speed,
        )
        .register_drive_routine(
            DriveRoutineType::ArcadeDutyCycle,
            Box::new(Deadband::new(
                Box::new(ArcadeDrive::new(
                    "ArcadeDutyCycle",
                    drive_params.arcade_scale,
                    drive_params.arcade_squared_inputs,
                    Box::new(|| 0.0),
                    Box::new(|| 0.0),
                    &mut telemetry,
                )),
                drive_params.deadband,
            )),
            ControlMode::PercentOutput,
        )
        .register_drive_routine(
            DriveRoutineType::ArcadeVelocity,
            Box::new(Deadband::new(
                Box::new(ArcadeDrive::new(
                    "ArcadeVelocity",
                    drive_params.max_speed_ms,
                    drive_params.arcade_squared_inputs,
                    Box::new(|| 0.0),
                    Box::new(|| 0.0),
                    &mut telemetry,
                )),
                drive_params.deadband,
            )),
            ControlMode::Speed,
        )
        .register_drive_routine(
            DriveRoutineType::Cheesy,
            Box::new(CurvatureDrive::new(
                Box::new(|| 0.0),
                Box::new(|| 0.0),
                Box::new(|| false),
                drive_params.curvature_min_speed,
                &mut telemetry,
            )),
            ControlMode::PercentOutput,
        )
        .register_drive_routine(
            DriveRoutineType::PositionPidArcade,
            Box::new(PositionalPidDrive::new(
                "PositionPid",
                PositionalPidConfig::from_params(&drive_params),
                PositionalPidInputs {
                    finished: Box::new(|| true),
                    target_speed: Box::new(|| 0.0),
                    target_turn: Box::new(|| 0.0),
                    left_distance: sim.left_distance(),
                    right_distance: sim.right_distance(),
                },
                clock.clone(),
                &mut telemetry,
            )),
            ControlMode::PercentOutput,
        )
        .register_drive_routine(
            DriveRoutineType::Trajectory,
            Box::new(TrajectoryDrive::new(
                &drive_params,
                loc_mgr.clone(),
                clock.clone(),
                &mut telemetry,
            )),
            ControlMode::Voltage,
        )
        .register_drive_routine(
            DriveRoutineType::Spline,
            Box::new(SplineDrive::new(
                &drive_params,
                Box::new(TrajectoryCache::new(&cache_dir, Box::new(generator))),
                sim.left_distance(),
                sim.right_distance(),
                loc_mgr.clone(),
                clock.clone(),
                &mut telemetry,
            )),
            ControlMode::PercentOutput,
        );

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    registry.enable();
    registry
        .set_drive_routine(DriveRoutineParameters::ConstantPower(exec_params.constant_power))
        .wrap_err("Failed to start the constant power phase")?;

    let mut phase = DemoPhase::ConstantPower;
    let mut phase_start_s = clock.current_time();
    let mut last_time_s = phase_start_s;
    let cycle_period = Duration::from_secs_f64(exec_params.cycle_period_s);

    info!("Beginning main loop\n");

    loop {
        let cycle_start_instant = Instant::now();
        let now_s = clock.current_time();

        // ---- SIMULATION ----

        sim.step(registry.current_motion(), registry.control_mode(), now_s - last_time_s);
        last_time_s = now_s;

        // ---- DEMO SEQUENCING ----

        match phase {
            DemoPhase::ConstantPower => {
                if now_s - phase_start_s > exec_params.constant_power_duration_s {
                    let spec = TrajectorySpec {
                        start: loc_mgr.pose(),
                        ..exec_params.demo_trajectory.clone()
                    };
                    let trajectory = traj_cache
                        .generate(&spec)
                        .wrap_err("Failed to get the demo trajectory")?;

                    info!(
                        "Following {:.2} s trajectory from {}",
                        trajectory.total_time(),
                        loc_mgr.current_location()
                    );

                    registry
                        .set_drive_routine(DriveRoutineParameters::Trajectory {
                            trajectory: Rc::new(trajectory),
                            relative: false,
                        })
                        .wrap_err("Failed to start the trajectory phase")?;

                    phase = DemoPhase::Trajectory;
                    phase_start_s = now_s;
                }
            }
            DemoPhase::Trajectory => {
                if registry.has_finished() {
                    info!("Trajectory complete");
                    break;
                }
                if now_s - phase_start_s > exec_params.max_demo_duration_s {
                    warn!("Trajectory did not finish in {} s", exec_params.max_demo_duration_s);
                    break;
                }
            }
        }

        // ---- DRIVE PROCESSING ----

        let speeds = sim.wheel_speeds();
        registry.update(speeds.left_ms, speeds.right_ms);

        // ---- TELEMETRY ----

        if let Err(e) = telemetry.sample(now_s) {
            warn!("Telemetry error: {}", e);
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Cycle overran by {:.06} s",
                cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
            ),
        }
    }

    // ---- SHUTDOWN ----

    registry.disable();

    let end = exec_params.demo_trajectory.end;
    info!(
        "Final pose {}, {:.3} m from the demo end, last desired {}",
        loc_mgr.current_location(),
        sim.pose().distance_to(&end),
        loc_mgr.desired_location()
    );
    session.save("final_pose.json", &sim.pose());

    info!("End of execution");

    session.exit();

    Ok(())
}
