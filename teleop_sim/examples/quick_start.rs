//! Quick Start Example
//!
//! Drives the simulated robot through the `slalom` stick script with the
//! default shaping, printing the shaped command twice a second.
//!
//! Run with `cargo run -p teleop_sim --example quick_start`.

use teleop_core::{ShapingCfg, Teleop};
use teleop_sim::{Arena, AxisMap, KinematicRobot, MappedGamepad, Scenario, ScriptedPad};
use teleop_traits::{Clock, MonotonicClock};
use std::time::Duration;

fn main() -> Result<(), eyre::Report> {
    // Real-time pacing; both the script and the loop read this clock
    let clock = MonotonicClock::new();
    let map = AxisMap::host();
    let pad = ScriptedPad::new(Scenario::Slalom.keyframes(), map, Box::new(clock))?;

    let mut teleop = Teleop::builder()
        .with_source(MappedGamepad::new(pad, map))
        .with_sink(KinematicRobot::new(Arena::default()))
        .with_shaping(ShapingCfg::default())
        .with_rate_hz(30.0)
        .with_clock(Box::new(clock))
        .build()?;

    teleop.begin();
    let tick = Duration::from_secs_f64(1.0 / 30.0);
    let start = clock.now();
    let mut last_print = start;

    while clock.secs_since(start) < 6.0 {
        let report = teleop.step()?;
        if clock.ms_since(last_print) >= 500 {
            println!(
                "t={:5.2}s  xd={:6.3} m/s  yd={:6.3} m/s  rzd={:6.3} rad/s",
                clock.secs_since(start),
                report.command.xd,
                report.command.yd,
                report.command.rzd
            );
            last_print = clock.now();
        }
        clock.sleep(tick);
    }
    teleop.stop()?;
    println!("stopped at {:?}", teleop.last_command());

    Ok(())
}
