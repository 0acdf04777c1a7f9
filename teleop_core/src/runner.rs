//! Paced drive loop on top of `TeleopCore::step`.

use std::sync::atomic::{AtomicBool, Ordering};

use teleop_traits::{AxisSource, CommandSink, VelocityCommand};

use crate::drive::TeleopCore;
use crate::error::{BuildError, Result};
use crate::util::tick_period;

/// Pacing and termination for `run`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunParams {
    /// Tick rate; each tick sleeps out the remainder of `1 / rate_hz` on the core's clock.
    pub rate_hz: f64,
    /// Stop once this much clock time has elapsed since `begin`.
    pub duration_s: Option<f64>,
    /// Stop after this many ticks.
    pub max_ticks: Option<u64>,
}

impl RunParams {
    pub fn new(rate_hz: f64) -> Self {
        Self {
            rate_hz,
            duration_s: None,
            max_ticks: None,
        }
    }
}

/// Why the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Duration,
    MaxTicks,
    Shutdown,
}

impl StopReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Duration => "duration",
            Self::MaxTicks => "max_ticks",
            Self::Shutdown => "shutdown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveSummary {
    pub ticks: u64,
    /// Clock time from `begin` until the loop ended.
    pub elapsed_s: f64,
    /// Last command sent before the stop.
    pub last_command: VelocityCommand,
    pub peak_xd: f64,
    pub peak_rzd: f64,
    pub stopped_by: StopReason,
}

/// Run the core until a limit or the shutdown flag, then stop it.
///
/// At least one of `duration_s`, `max_ticks` must be set unless the caller
/// owns the shutdown flag. Step errors stop the sink (best effort) and are
/// returned unchanged.
pub fn run<S, K>(
    core: &mut TeleopCore<S, K>,
    params: &RunParams,
    shutdown: &AtomicBool,
) -> Result<DriveSummary>
where
    S: AxisSource,
    K: CommandSink,
{
    if !(params.rate_hz.is_finite() && params.rate_hz > 0.0) {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "run rate_hz must be > 0",
        )));
    }
    if let Some(d) = params.duration_s
        && !(d.is_finite() && d >= 0.0)
    {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "duration_s must be >= 0",
        )));
    }

    let period = tick_period(params.rate_hz).ok_or_else(|| {
        eyre::Report::new(BuildError::InvalidConfig(
            "run rate_hz too low for a tick period",
        ))
    })?;
    let clock = core.clock().clone();

    core.begin();
    let mut peak_xd = 0.0_f64;
    let mut peak_rzd = 0.0_f64;
    let mut last_command = VelocityCommand::ZERO;

    let stopped_by = loop {
        if shutdown.load(Ordering::Relaxed) {
            break StopReason::Shutdown;
        }
        if params.max_ticks.is_some_and(|n| core.ticks() >= n) {
            break StopReason::MaxTicks;
        }
        if params.duration_s.is_some_and(|d| core.elapsed_s() >= d) {
            break StopReason::Duration;
        }

        let tick_start = clock.now();
        match core.step() {
            Ok(report) => {
                last_command = report.command;
                peak_xd = peak_xd.max(report.command.xd.abs());
                peak_rzd = peak_rzd.max(report.command.rzd.abs());
            }
            Err(e) => {
                tracing::error!(error = %e, tick = core.ticks(), "drive step failed");
                if let Err(stop_err) = core.stop() {
                    tracing::warn!(error = %stop_err, "stop failed after step error");
                }
                return Err(e);
            }
        }

        let spent = clock.now().saturating_duration_since(tick_start);
        if let Some(rest) = period.checked_sub(spent) {
            clock.sleep(rest);
        } else {
            tracing::debug!(
                overrun_us = u64::try_from((spent - period).as_micros()).unwrap_or(u64::MAX),
                "tick overran period"
            );
        }
    };

    let summary = DriveSummary {
        ticks: core.ticks(),
        elapsed_s: core.elapsed_s(),
        last_command,
        peak_xd,
        peak_rzd,
        stopped_by,
    };
    if let Err(e) = core.stop() {
        tracing::warn!(error = %e, "sink stop failed");
    }
    tracing::info!(
        ticks = summary.ticks,
        elapsed_s = summary.elapsed_s,
        peak_xd = summary.peak_xd,
        peak_rzd = summary.peak_rzd,
        reason = stopped_by.as_str(),
        "drive finished"
    );
    Ok(summary)
}
