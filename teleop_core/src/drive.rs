//! The drive loop core (`TeleopCore`).
//!
//! One `step` reads the operator frame, measures the tick period from the
//! clock, shapes the request, and hands the command to the sink.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use eyre::WrapErr;
use teleop_traits::clock::Clock;
use teleop_traits::{AxisSource, CommandSink, StickFrame, VelocityCommand};

use crate::error::{Result, TeleopError};
use crate::input::{InputCfg, VelocityRequest};
use crate::runner::{self, DriveSummary, RunParams};
use crate::shaper::Shaper;
use crate::telemetry::{ChannelSample, TelemetryHistory, TickSample};

/// Everything observed during one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// 1-based tick index since `begin`.
    pub tick: u64,
    pub dt_s: f64,
    pub frame: StickFrame,
    pub request: VelocityRequest,
    pub command: VelocityCommand,
    pub xd: ChannelSample,
    pub yd: ChannelSample,
    pub rzd: ChannelSample,
}

/// Generic core over an input source and a command sink.
pub struct TeleopCore<S: AxisSource, K: CommandSink> {
    pub(crate) source: S,
    pub(crate) sink: K,
    pub(crate) shaper: Shaper,
    pub(crate) input: InputCfg,
    pub(crate) rate_hz: f64,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) epoch: Instant,
    pub(crate) last_tick_at: Option<Instant>,
    pub(crate) t_s: f64,
    pub(crate) ticks: u64,
    pub(crate) telemetry: Option<TelemetryHistory>,
}

impl<S: AxisSource, K: CommandSink> core::fmt::Debug for TeleopCore<S, K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TeleopCore")
            .field("rate_hz", &self.rate_hz)
            .field("ticks", &self.ticks)
            .field("command", &self.shaper.command())
            .finish()
    }
}

impl<S: AxisSource, K: CommandSink> TeleopCore<S, K> {
    /// Nominal loop rate the filters were designed for.
    pub fn rate_hz(&self) -> f64 {
        self.rate_hz
    }

    pub fn shaper(&self) -> &Shaper {
        &self.shaper
    }

    pub fn input_cfg(&self) -> &InputCfg {
        &self.input
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }

    pub fn clock(&self) -> &Arc<dyn Clock + Send + Sync> {
        &self.clock
    }

    pub fn telemetry(&self) -> Option<&TelemetryHistory> {
        self.telemetry.as_ref()
    }

    /// Ticks since `begin`.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Sum of tick periods since `begin`, in seconds.
    pub fn shaped_time_s(&self) -> f64 {
        self.t_s
    }

    /// Clock time since `begin`, in seconds.
    pub fn elapsed_s(&self) -> f64 {
        self.clock.secs_since(self.epoch)
    }

    pub fn last_command(&self) -> VelocityCommand {
        self.shaper.command()
    }

    /// Reset per-run state. Call before a new drive.
    pub fn begin(&mut self) {
        self.shaper.reset(&VelocityCommand::ZERO);
        self.epoch = self.clock.now();
        self.last_tick_at = None;
        self.t_s = 0.0;
        self.ticks = 0;
        if let Some(h) = self.telemetry.as_mut() {
            h.clear();
        }
        tracing::info!(rate_hz = self.rate_hz, "drive start");
    }

    /// One iteration: read the source, measure `dt`, shape, send.
    ///
    /// The first tick after `begin` has `dt = 0`, which holds every channel.
    pub fn step(&mut self) -> Result<TickReport> {
        let frame = self
            .source
            .read_frame()
            .map_err(|e| eyre::Report::new(TeleopError::Input(e.to_string())))
            .wrap_err("reading axis source")?;

        let now = self.clock.now();
        let dt = self
            .last_tick_at
            .map_or(0.0, |prev| now.saturating_duration_since(prev).as_secs_f64());
        self.last_tick_at = Some(now);

        self.step_with(frame, dt)
    }

    /// Shape an externally supplied frame over `dt` seconds and send it.
    pub fn step_with(&mut self, frame: StickFrame, dt: f64) -> Result<TickReport> {
        let request = self.input.request_from_stick(&frame);
        let command = self.shaper.update(&request, dt);

        self.sink
            .send(&command, dt)
            .map_err(|e| eyre::Report::new(TeleopError::Sink(e.to_string())))
            .wrap_err("sending command")?;

        if dt > 0.0 {
            self.t_s += dt;
        }
        self.ticks += 1;

        let (xd, yd, rzd) = self.shaper.samples();
        if let Some(h) = self.telemetry.as_mut() {
            h.push(TickSample::from_channels(self.t_s, dt, xd, yd, rzd));
        }

        tracing::trace!(
            tick = self.ticks,
            dt,
            xd = command.xd,
            yd = command.yd,
            rzd = command.rzd,
            "tick"
        );
        Ok(TickReport {
            tick: self.ticks,
            dt_s: dt,
            frame,
            request,
            command,
            xd,
            yd,
            rzd,
        })
    }

    /// Zero every channel and ask the sink to stop.
    ///
    /// Channels are zeroed even when the sink reports an error.
    pub fn stop(&mut self) -> Result<()> {
        self.shaper.reset(&VelocityCommand::ZERO);
        self.last_tick_at = None;
        tracing::info!(ticks = self.ticks, t_s = self.t_s, "drive stop");
        self.sink
            .stop()
            .map_err(|e| eyre::Report::new(TeleopError::Sink(e.to_string())))
            .wrap_err("stopping sink")
    }

    /// Paced run until a limit or `shutdown`; see `runner::run`.
    pub fn run(&mut self, params: &RunParams, shutdown: &AtomicBool) -> Result<DriveSummary> {
        runner::run(self, params, shutdown)
    }
}
