//! # Drive Routine Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::rc::Rc;

use drive_lib::{
    clock::ManualClock,
    drive_ctrl::{arcade_to_tank, DriveRoutine, DriveRoutineParameters, DriveSide, Params, TrajectoryDrive},
    loc::{LocMgr, Pose2d},
    traj::{StraightLineGenerator, TrajectoryGenerator, TrajectorySpec},
};
use util::telemetry::Telemetry;

fn arcade_benchmark(c: &mut Criterion) {
    c.bench_function("arcade_to_tank", |b| {
        b.iter(|| {
            arcade_to_tank(
                black_box(0.6),
                black_box(-0.3),
                1.0,
                true,
                DriveSide::Both,
            )
        })
    });
}

fn trajectory_benchmark(c: &mut Criterion) {
    // ---- Build a trajectory and a routine following it ----

    let params = Params::default();

    let trajectory = StraightLineGenerator::new(params.max_speed_ms, params.max_accel_mss, 0.02)
        .generate(&TrajectorySpec {
            start: Pose2d::new(0.0, 0.0, 0.0),
            interior_m: Vec::new(),
            end: Pose2d::new(5.0, 0.0, 0.0),
            forward: true,
        })
        .unwrap();
    let total_time = trajectory.total_time();

    let clock = ManualClock::new();
    let loc_mgr = Rc::new(LocMgr::new());
    let mut telemetry = Telemetry::new(true);

    let mut drive = TrajectoryDrive::new(&params, loc_mgr.clone(), Rc::new(clock.clone()), &mut telemetry);
    drive
        .reset(&DriveRoutineParameters::Trajectory {
            trajectory: Rc::new(trajectory),
            relative: false,
        })
        .unwrap();
    drive.enable();

    // Bench one control cycle, looping over the trajectory
    c.bench_function("TrajectoryDrive::get_motion", |b| {
        b.iter(|| {
            clock.advance(0.02);
            if drive.elapsed() > total_time {
                drive.enable();
            }
            drive.get_motion(black_box(1.0), black_box(1.0))
        })
    });

    c.bench_function("Telemetry::sample", |b| b.iter(|| telemetry.sample(0.0).unwrap()));
}

criterion_group!(benches, arcade_benchmark, trajectory_benchmark);
criterion_main!(benches);
