use std::f64::consts::FRAC_PI_2;
use std::sync::atomic::AtomicBool;

use rstest::rstest;
use teleop_core::{RunParams, ShapingCfg, StopReason, build_teleop};
use teleop_sim::{
    Arena, AxisMap, KinematicRobot, MappedGamepad, Scenario, ScriptedPad,
};
use teleop_traits::ManualClock;

const RATE: f64 = 30.0;

fn drive(scenario: Scenario, map: AxisMap, ticks: u64) -> (KinematicRobot, StopReason) {
    let clock = ManualClock::new();
    let pad = ScriptedPad::new(scenario.keyframes(), map, Box::new(clock.clone())).unwrap();
    let mut core = build_teleop(
        MappedGamepad::new(pad, map),
        KinematicRobot::new(Arena::default()),
        &ShapingCfg::default(),
        None,
        RATE,
        Some(Box::new(clock)),
        Some(100),
    )
    .unwrap();
    let params = RunParams {
        max_ticks: Some(ticks),
        ..RunParams::new(RATE)
    };
    let summary = core.run(&params, &AtomicBool::new(false)).unwrap();
    (core.sink().clone(), summary.stopped_by)
}

#[rstest]
#[case(AxisMap::LINUX)]
#[case(AxisMap::MACOS)]
#[case(AxisMap::WINDOWS)]
fn full_throttle_drives_straight_ahead(#[case] map: AxisMap) {
    let (robot, reason) = drive(Scenario::FullThrottle, map, 150);
    assert_eq!(reason, StopReason::MaxTicks);
    let start = KinematicRobot::default().pose();
    let p = robot.pose();
    // Heading -π/2: forward is toward smaller y
    assert!(p.y_m < start.y_m - 1.0, "pose {p:?}");
    assert!((p.x_m - start.x_m).abs() < 1e-6);
    assert!((p.yaw_rad + FRAC_PI_2).abs() < 1e-12);
    assert_eq!(robot.commands(), 150);
    assert_eq!(robot.stops(), 1);
}

#[test]
fn idle_leaves_the_robot_in_place() {
    let (robot, _) = drive(Scenario::Idle, AxisMap::LINUX, 60);
    assert_eq!(robot.pose(), KinematicRobot::default().pose());
    assert_eq!(robot.distance_m(), 0.0);
}

#[test]
fn step_turn_changes_heading() {
    let (robot, _) = drive(Scenario::StepTurn, AxisMap::LINUX, 390);
    assert!(robot.pose().yaw_rad > -FRAC_PI_2 + 0.5, "pose {:?}", robot.pose());
}

#[test]
fn mismatched_layout_swaps_the_sticks() {
    // Encoded for macOS, read with the Linux layout: forward lands on the
    // lateral axis and the forward axis is missing.
    let clock = ManualClock::new();
    let pad = ScriptedPad::new(
        Scenario::FullThrottle.keyframes(),
        AxisMap::MACOS,
        Box::new(clock.clone()),
    )
    .unwrap();
    let mut src = MappedGamepad::new(pad, AxisMap::LINUX);
    clock.advance(std::time::Duration::from_secs(1));
    let frame = teleop_traits::AxisSource::read_frame(&mut src).unwrap();
    assert_eq!(frame.forward, 0.0);
    assert_eq!(frame.lateral, -1.0);
}
