//! Type-state builder for `Teleop` and generic `build_teleop` constructor.
//!
//! The builder enforces at compile time that a source, a sink and a shaping
//! config are provided before `build()` is available. `try_build()` is always
//! available for dynamic checks.

use std::marker::PhantomData;
use std::sync::{Arc, atomic::AtomicBool};

use teleop_traits::clock::{Clock, MonotonicClock};
use teleop_traits::{AxisSource, CommandSink, StickFrame, VelocityCommand};

use crate::config::ShapingCfg;
use crate::drive::{TeleopCore, TickReport};
use crate::error::{BuildError, Result};
use crate::input::InputCfg;
use crate::runner::{DriveSummary, RunParams};
use crate::shaper::Shaper;
use crate::telemetry::TelemetryHistory;

/// Loop rate used when none is given.
pub const DEFAULT_RATE_HZ: f64 = 30.0;

// ── Public dynamic-dispatch wrapper ──────────────────────────────────────────

type DynCore = TeleopCore<Box<dyn AxisSource>, Box<dyn CommandSink>>;

/// Public dynamic (boxed) drive loop.
pub struct Teleop {
    pub(crate) inner: DynCore,
}

impl core::fmt::Debug for Teleop {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Teleop")
            .field("rate_hz", &self.inner.rate_hz)
            .field("ticks", &self.inner.ticks)
            .field("command", &self.inner.shaper.command())
            .finish()
    }
}

impl Teleop {
    /// Start building a Teleop.
    pub fn builder() -> TeleopBuilder<Missing, Missing, Missing> {
        TeleopBuilder::default()
    }

    pub fn shaper(&self) -> &Shaper {
        self.inner.shaper()
    }

    pub fn telemetry(&self) -> Option<&TelemetryHistory> {
        self.inner.telemetry()
    }

    pub fn last_command(&self) -> VelocityCommand {
        self.inner.last_command()
    }

    /// Reset per-run state. Call before a new drive.
    pub fn begin(&mut self) {
        self.inner.begin();
    }

    /// One iteration of the drive loop.
    pub fn step(&mut self) -> Result<TickReport> {
        self.inner.step()
    }

    pub fn step_with(&mut self, frame: StickFrame, dt: f64) -> Result<TickReport> {
        self.inner.step_with(frame, dt)
    }

    /// Zero the channels and stop the sink.
    pub fn stop(&mut self) -> Result<()> {
        self.inner.stop()
    }

    /// Paced run until a limit or `shutdown`.
    pub fn run(&mut self, params: &RunParams, shutdown: &AtomicBool) -> Result<DriveSummary> {
        self.inner.run(params, shutdown)
    }
}

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Builder for `Teleop`. All fields are validated on `build()`.
pub struct TeleopBuilder<S, K, C> {
    source: Option<Box<dyn AxisSource>>,
    sink: Option<Box<dyn CommandSink>>,
    shaping: Option<ShapingCfg>,
    input: Option<InputCfg>,
    rate_hz: Option<f64>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
    telemetry: Option<usize>,
    _s: PhantomData<S>,
    _k: PhantomData<K>,
    _c: PhantomData<C>,
}

impl Default for TeleopBuilder<Missing, Missing, Missing> {
    fn default() -> Self {
        Self {
            source: None,
            sink: None,
            shaping: None,
            input: None,
            rate_hz: None,
            clock: None,
            telemetry: None,
            _s: PhantomData,
            _k: PhantomData,
            _c: PhantomData,
        }
    }
}

/// Validate configuration and construct a `TeleopCore` with designed filters.
///
/// Shared by `TeleopBuilder::try_build()` and `build_teleop()`.
fn validate_and_build<S: AxisSource, K: CommandSink>(
    source: S,
    sink: K,
    shaping: &ShapingCfg,
    input: InputCfg,
    rate_hz: f64,
    clock: Option<Box<dyn Clock + Send + Sync>>,
    telemetry: Option<usize>,
) -> Result<TeleopCore<S, K>> {
    // ── Validation ───────────────────────────────────────────────────────────
    if !(rate_hz.is_finite() && rate_hz > 0.0) {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "rate_hz must be > 0",
        )));
    }
    if crate::util::tick_period(rate_hz).is_none() {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "rate_hz too low for a tick period",
        )));
    }
    if !(0.0..1.0).contains(&input.deadband) || !(0.0..1.0).contains(&input.lateral_deadband) {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "deadband must be in [0, 1)",
        )));
    }
    if telemetry == Some(0) {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "telemetry capacity must be >= 1",
        )));
    }
    for slew in [
        shaping.forward.slew_limit,
        shaping.forward.min_slew_limit,
        shaping.lateral.slew_limit,
        shaping.yaw.slew_limit,
    ] {
        if slew.is_nan() || slew < 0.0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "slew limits must be >= 0",
            )));
        }
    }

    // ── Construction ─────────────────────────────────────────────────────────
    let shaper = Shaper::new(shaping, crate::util::period_s(rate_hz))?;
    let clock: Arc<dyn Clock + Send + Sync> = match clock {
        Some(c) => Arc::from(c),
        None => Arc::new(MonotonicClock::new()),
    };
    let epoch = clock.now();

    Ok(TeleopCore {
        source,
        sink,
        shaper,
        input,
        rate_hz,
        clock,
        epoch,
        last_tick_at: None,
        t_s: 0.0,
        ticks: 0,
        telemetry: telemetry.map(TelemetryHistory::with_capacity),
    })
}

impl<S, K, C> TeleopBuilder<S, K, C> {
    /// Fallible build available in any type-state; returns detailed error for missing pieces.
    pub fn try_build(self) -> Result<Teleop> {
        let source = self
            .source
            .ok_or_else(|| eyre::Report::new(BuildError::MissingSource))?;
        let sink = self
            .sink
            .ok_or_else(|| eyre::Report::new(BuildError::MissingSink))?;
        let shaping = self
            .shaping
            .ok_or_else(|| eyre::Report::new(BuildError::MissingShaping))?;

        let inner = validate_and_build(
            source,
            sink,
            &shaping,
            self.input.unwrap_or_default(),
            self.rate_hz.unwrap_or(DEFAULT_RATE_HZ),
            self.clock,
            self.telemetry,
        )?;

        Ok(Teleop { inner })
    }
}

/// Chainable setters that do not affect type-state.
impl<S, K, C> TeleopBuilder<S, K, C> {
    pub fn with_input(mut self, input: InputCfg) -> Self {
        self.input = Some(input);
        self
    }
    /// Nominal loop rate; filters are designed for `1 / rate_hz`.
    pub fn with_rate_hz(mut self, rate_hz: f64) -> Self {
        self.rate_hz = Some(rate_hz);
        self
    }
    /// Provide a custom clock implementation; defaults to `MonotonicClock` when not provided.
    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }
    /// Keep the last `capacity` ticks in a telemetry history.
    pub fn with_telemetry(mut self, capacity: usize) -> Self {
        self.telemetry = Some(capacity);
        self
    }
}

// Setters that advance type-state
impl<K, C> TeleopBuilder<Missing, K, C> {
    pub fn with_source(self, source: impl AxisSource + 'static) -> TeleopBuilder<Set, K, C> {
        TeleopBuilder {
            source: Some(Box::new(source)),
            sink: self.sink,
            shaping: self.shaping,
            input: self.input,
            rate_hz: self.rate_hz,
            clock: self.clock,
            telemetry: self.telemetry,
            _s: PhantomData,
            _k: PhantomData,
            _c: PhantomData,
        }
    }
}

impl<S, C> TeleopBuilder<S, Missing, C> {
    pub fn with_sink(self, sink: impl CommandSink + 'static) -> TeleopBuilder<S, Set, C> {
        TeleopBuilder {
            source: self.source,
            sink: Some(Box::new(sink)),
            shaping: self.shaping,
            input: self.input,
            rate_hz: self.rate_hz,
            clock: self.clock,
            telemetry: self.telemetry,
            _s: PhantomData,
            _k: PhantomData,
            _c: PhantomData,
        }
    }
}

impl<S, K> TeleopBuilder<S, K, Missing> {
    pub fn with_shaping(self, shaping: ShapingCfg) -> TeleopBuilder<S, K, Set> {
        TeleopBuilder {
            source: self.source,
            sink: self.sink,
            shaping: Some(shaping),
            input: self.input,
            rate_hz: self.rate_hz,
            clock: self.clock,
            telemetry: self.telemetry,
            _s: PhantomData,
            _k: PhantomData,
            _c: PhantomData,
        }
    }
}

impl TeleopBuilder<Set, Set, Set> {
    /// Validate and build. Only available when source, sink and shaping are set.
    pub fn build(self) -> Result<Teleop> {
        self.try_build()
    }
}

/// Build a statically-dispatched `TeleopCore` from a concrete source and sink.
///
/// Delegates to the shared `validate_and_build`.
pub fn build_teleop<S, K>(
    source: S,
    sink: K,
    shaping: &ShapingCfg,
    input: Option<InputCfg>,
    rate_hz: f64,
    clock: Option<Box<dyn Clock + Send + Sync>>,
    telemetry: Option<usize>,
) -> Result<TeleopCore<S, K>>
where
    S: AxisSource,
    K: CommandSink,
{
    validate_and_build(
        source,
        sink,
        shaping,
        input.unwrap_or_default(),
        rate_hz,
        clock,
        telemetry,
    )
}
