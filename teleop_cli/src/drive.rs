//! `drive`, `filter` and `self-check` commands.

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;

use eyre::WrapErr;
use serde_json::json;
use teleop_config::Config;
use teleop_core::error::TeleopError;
use teleop_core::{
    DEFAULT_QUALITY, InputCfg, RunParams, SecondOrderLowPass, ShapingCfg, TelemetryHistory,
    build_teleop,
};
use teleop_sim::{Arena, AxisMap, Keyframe, KinematicRobot, MappedGamepad, Scenario, ScriptedPad};
use teleop_traits::clock::Clock;
use teleop_traits::{ManualClock, MonotonicClock};

/// Options of the `drive` subcommand.
#[derive(Debug, Clone, Default)]
pub struct DriveArgs {
    pub scenario: Option<String>,
    pub script: Option<PathBuf>,
    pub duration_s: Option<f64>,
    pub realtime: bool,
    pub telemetry_csv: Option<PathBuf>,
    pub platform: Option<String>,
}

/// Options of the `filter` subcommand.
#[derive(Debug, Clone, Copy)]
pub struct FilterArgs {
    pub cutoff_hz: f64,
    pub quality: Option<f64>,
    pub rate_hz: Option<f64>,
    pub samples: usize,
    pub step: f64,
}

pub fn config_error(e: impl std::fmt::Display) -> eyre::Report {
    eyre::Report::new(TeleopError::Config(e.to_string()))
}

/// `--platform` wins, then `[joystick]` from the config, then the host layout.
fn axis_map(cfg: &Config, platform: Option<&str>) -> AxisMap {
    match (platform, cfg.joystick.as_ref()) {
        (Some(os), _) => AxisMap::for_platform(os),
        (None, Some(js)) => AxisMap::from(js),
        (None, None) => AxisMap::host(),
    }
}

/// Keyframes, a label for reports, and the run length that covers them.
fn load_script(args: &DriveArgs) -> eyre::Result<(Vec<Keyframe>, String, f64)> {
    if let Some(path) = &args.script {
        let rows = teleop_config::load_script_csv(path).map_err(config_error)?;
        let frames: Vec<Keyframe> = rows.iter().map(Keyframe::from).collect();
        // Hold the last frame for one more second
        let len = frames.last().map_or(0.0, |k| k.t_s) + 1.0;
        return Ok((frames, path.display().to_string(), len));
    }
    let scenario: Scenario = args.scenario.as_deref().unwrap_or("full-throttle").parse()?;
    Ok((
        scenario.keyframes(),
        scenario.name().to_string(),
        scenario.default_duration_s(),
    ))
}

fn clocks(realtime: bool) -> (Box<dyn Clock + Send + Sync>, Box<dyn Clock + Send + Sync>) {
    if realtime {
        (Box::new(MonotonicClock::new()), Box::new(MonotonicClock::new()))
    } else {
        let c = ManualClock::new();
        (Box::new(c.clone()), Box::new(c))
    }
}

pub fn run_drive(
    cfg: &Config,
    args: &DriveArgs,
    json_out: bool,
    shutdown: &AtomicBool,
) -> eyre::Result<()> {
    let map = axis_map(cfg, args.platform.as_deref());
    let (frames, label, script_len) = load_script(args)?;
    let duration_s = args.duration_s.unwrap_or(script_len);
    let rate_hz = cfg.control_loop.rate_hz;

    let (pad_clock, loop_clock) = clocks(args.realtime);
    let pad = ScriptedPad::new(frames, map, pad_clock)?;
    let mut core = build_teleop(
        MappedGamepad::new(pad, map),
        KinematicRobot::new(Arena::from(&cfg.arena)),
        &ShapingCfg::from(cfg),
        Some(InputCfg::from(&cfg.input)),
        rate_hz,
        Some(loop_clock),
        Some(cfg.telemetry.history),
    )?;

    tracing::info!(
        script = %label,
        duration_s,
        rate_hz,
        realtime = args.realtime,
        "driving"
    );
    let params = RunParams {
        duration_s: Some(duration_s),
        ..RunParams::new(rate_hz)
    };
    let summary = core.run(&params, shutdown)?;

    if let (Some(path), Some(history)) = (&args.telemetry_csv, core.telemetry()) {
        write_telemetry_csv(path, history)?;
    }

    let robot = core.sink();
    let pose = robot.pose();
    if json_out {
        let obj = json!({
            "script": label,
            "ticks": summary.ticks,
            "elapsed_s": summary.elapsed_s,
            "stopped_by": summary.stopped_by.as_str(),
            "pose": { "x_m": pose.x_m, "y_m": pose.y_m, "yaw_rad": pose.yaw_rad },
            "distance_m": robot.distance_m(),
            "peak_xd": summary.peak_xd,
            "peak_rzd": summary.peak_rzd,
            "last_command": {
                "xd": summary.last_command.xd,
                "yd": summary.last_command.yd,
                "rzd": summary.last_command.rzd,
            },
        });
        println!("{obj}");
    } else {
        println!(
            "drive complete: script={label} ticks={} elapsed={:.2}s stopped_by={}",
            summary.ticks,
            summary.elapsed_s,
            summary.stopped_by.as_str()
        );
        println!(
            "final pose: x={:.2} m y={:.2} m yaw={:.3} rad (travelled {:.2} m)",
            pose.x_m,
            pose.y_m,
            pose.yaw_rad,
            robot.distance_m()
        );
        println!(
            "peaks: xd={:.3} m/s rzd={:.3} rad/s",
            summary.peak_xd, summary.peak_rzd
        );
    }
    Ok(())
}

pub fn write_telemetry_csv(path: &Path, history: &TelemetryHistory) -> eyre::Result<()> {
    let mut w = csv::Writer::from_path(path)
        .wrap_err_with(|| format!("create telemetry CSV {}", path.display()))?;
    for sample in history.iter() {
        w.serialize(sample)?;
    }
    w.flush()?;
    tracing::debug!(rows = history.len(), path = %path.display(), "telemetry written");
    Ok(())
}

pub fn run_filter(cfg: &Config, args: &FilterArgs, json_out: bool) -> eyre::Result<()> {
    let rate_hz = args.rate_hz.unwrap_or(cfg.control_loop.rate_hz);
    if !(rate_hz.is_finite() && rate_hz > 0.0) {
        return Err(config_error("filter rate_hz must be > 0"));
    }
    let dt = 1.0 / rate_hz;
    let quality = args.quality.unwrap_or(DEFAULT_QUALITY);
    let mut f = SecondOrderLowPass::configure(dt, args.cutoff_hz, 1.0, quality)?;

    // Settle at zero, then apply the step
    f.filter_val(0.0);
    let response: Vec<f64> = (0..args.samples).map(|_| f.filter_val(args.step)).collect();
    let peak = response.iter().copied().fold(0.0_f64, |a, y| {
        if y.abs() > a.abs() { y } else { a }
    });
    let c = *f.coefficients();

    if json_out {
        let poles: Vec<[f64; 2]> = f.discrete_poles().iter().map(|p| [p.re, p.im]).collect();
        let obj = json!({
            "cutoff_hz": args.cutoff_hz,
            "quality": quality,
            "rate_hz": rate_hz,
            "coefficients": {
                "cxn": c.cxn, "cx0": c.cx0, "cx1": c.cx1, "cy0": c.cy0, "cy1": c.cy1,
            },
            "poles": poles,
            "discrete_gain": f.discrete_gain(),
            "peak": peak,
            "response": response,
        });
        println!("{obj}");
    } else {
        println!(
            "low-pass fc={} Hz q={quality:.4} rate={rate_hz} Hz",
            args.cutoff_hz
        );
        println!(
            "b = [{:.9}, {:.9}, {:.9}]  a = [1, {:.9}, {:.9}]  k = {:.9}",
            c.cxn,
            c.cx0,
            c.cx1,
            c.cy0,
            c.cy1,
            f.discrete_gain()
        );
        for (n, y) in response.iter().enumerate() {
            println!("{n}\t{:.4}\t{y:.6}", (n as f64) * dt);
        }
        println!("peak: {peak:.6}");
    }
    Ok(())
}

/// Build the configured pipeline against an idle pad and tick it once.
pub fn self_check(cfg: &Config) -> eyre::Result<()> {
    let map = axis_map(cfg, None);
    let clock = ManualClock::new();
    let pad = ScriptedPad::new(Scenario::Idle.keyframes(), map, Box::new(clock.clone()))?;
    let mut core = build_teleop(
        MappedGamepad::new(pad, map),
        KinematicRobot::new(Arena::from(&cfg.arena)),
        &ShapingCfg::from(cfg),
        Some(InputCfg::from(&cfg.input)),
        cfg.control_loop.rate_hz,
        Some(Box::new(clock)),
        None,
    )?;
    core.begin();
    let report = core.step()?;
    core.stop()?;
    tracing::debug!(tick = report.tick, "self-check tick");
    Ok(())
}
