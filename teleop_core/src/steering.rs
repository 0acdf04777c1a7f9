//! Per-axis steering processors.
//!
//! Every processor owns a `SteeringChannel` (static limits plus the three
//! running values) and applies its own policy in `update`:
//!
//! - `XdSteering`: saturation, speed-derated slew limit, optional low-pass.
//! - `YdSteering`: saturation and a fixed slew limit.
//! - `RzdSteering`: saturation, a ceiling from forward speed and the roll
//!   limit, fixed slew limit, optional low-pass.
//!
//! The filter output is not clamped; a peaking filter may briefly leave
//! `[min, max]`.

use crate::error::FilterError;
use crate::filter::{DEFAULT_QUALITY, SecondOrderLowPass};
use crate::telemetry::ChannelSample;
use crate::util::{saturate, slew_rate_limit};

/// Gravitational acceleration used by the coordinated-turn ceiling (m/s²).
pub const GRAVITY: f64 = 9.81;

/// Below this forward speed (m/s) the yaw ceiling is the static `max`.
pub const YAW_CEILING_MIN_SPEED: f64 = 0.25;

/// Static limits and running values of one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct SteeringChannel {
    min: f64,
    max: f64,
    slew_limit: f64,
    cmd_req: f64,
    cmd_d_unfilt: f64,
    cmd_d: f64,
}

impl SteeringChannel {
    pub fn new(min: f64, max: f64, slew_limit: f64) -> Self {
        Self {
            min,
            max,
            slew_limit,
            cmd_req: 0.0,
            cmd_d_unfilt: 0.0,
            cmd_d: 0.0,
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn slew_limit(&self) -> f64 {
        self.slew_limit
    }

    #[inline]
    pub fn saturate(&self, v: f64) -> f64 {
        saturate(v, self.min, self.max)
    }

    pub fn cmd_req(&self) -> f64 {
        self.cmd_req
    }

    pub fn cmd_d_unfilt(&self) -> f64 {
        self.cmd_d_unfilt
    }

    pub fn cmd_d(&self) -> f64 {
        self.cmd_d
    }

    /// Set all three running values to `v`. Not clamped.
    pub fn reset(&mut self, v: f64) {
        self.cmd_req = v;
        self.cmd_d_unfilt = v;
        self.cmd_d = v;
    }

    pub fn sample(&self) -> ChannelSample {
        ChannelSample {
            cmd_req: self.cmd_req,
            cmd_d_unfilt: self.cmd_d_unfilt,
            cmd_d: self.cmd_d,
        }
    }

    /// Slew `cmd_d_unfilt` toward `target`, then pass it through `filter`.
    fn advance(
        &mut self,
        target: f64,
        limit: f64,
        dt: f64,
        filter: Option<&mut SecondOrderLowPass>,
    ) -> f64 {
        self.cmd_d_unfilt = slew_rate_limit(self.cmd_d_unfilt, target, limit, dt);
        self.cmd_d = match filter {
            Some(f) => f.filter_val(self.cmd_d_unfilt),
            None => self.cmd_d_unfilt,
        };
        self.cmd_d
    }
}

/// Read and reset access shared by the three processors.
pub trait SteeringProcessor {
    fn channel(&self) -> &SteeringChannel;
    fn channel_mut(&mut self) -> &mut SteeringChannel;

    /// Reset the running values and forget any filter memory.
    fn reset(&mut self, v: f64) {
        self.channel_mut().reset(v);
    }

    fn cmd_req(&self) -> f64 {
        self.channel().cmd_req()
    }

    fn cmd_d_unfilt(&self) -> f64 {
        self.channel().cmd_d_unfilt()
    }

    fn cmd_d(&self) -> f64 {
        self.channel().cmd_d()
    }

    fn sample(&self) -> ChannelSample {
        self.channel().sample()
    }
}

fn design_filter(dt: f64, fc: f64, q: Option<f64>) -> Result<SecondOrderLowPass, FilterError> {
    SecondOrderLowPass::configure(dt, fc, 1.0, q.unwrap_or(DEFAULT_QUALITY))
}

// ── Forward velocity ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct XdSteering {
    channel: SteeringChannel,
    min_slew_limit: f64,
    min_slew_vel: f64,
    filter: Option<SecondOrderLowPass>,
}

impl XdSteering {
    pub fn new(min: f64, max: f64, slew_limit: f64, min_slew_limit: f64, min_slew_vel: f64) -> Self {
        Self {
            channel: SteeringChannel::new(min, max, slew_limit),
            min_slew_limit,
            min_slew_vel,
            filter: None,
        }
    }

    /// Attach (or replace) the low-pass stage. `q = None` selects Butterworth.
    pub fn set_filter_params(&mut self, dt: f64, fc: f64, q: Option<f64>) -> Result<(), FilterError> {
        self.filter = Some(design_filter(dt, fc, q)?);
        Ok(())
    }

    pub fn clear_filter(&mut self) {
        self.filter = None;
    }

    pub fn filter(&self) -> Option<&SecondOrderLowPass> {
        self.filter.as_ref()
    }

    pub fn min_slew_limit(&self) -> f64 {
        self.min_slew_limit
    }

    pub fn min_slew_vel(&self) -> f64 {
        self.min_slew_vel
    }

    /// Slew-limit reduction per m/s of current speed.
    pub fn derate_factor(&self) -> f64 {
        if self.min_slew_vel > 0.0 {
            (-(self.min_slew_limit - self.channel.slew_limit) / self.min_slew_vel).max(0.0)
        } else {
            0.0
        }
    }

    /// Slew limit that the next `update` will apply.
    pub fn effective_slew_limit(&self) -> f64 {
        let derated =
            self.channel.slew_limit - self.channel.cmd_d_unfilt.abs() * self.derate_factor();
        self.min_slew_limit.max(derated)
    }

    pub fn update(&mut self, request: f64, dt: f64) -> f64 {
        self.channel.cmd_req = self.channel.saturate(request);
        let limit = self.effective_slew_limit();
        let target = self.channel.cmd_req;
        self.channel
            .advance(target, limit, dt, self.filter.as_mut())
    }
}

impl SteeringProcessor for XdSteering {
    fn channel(&self) -> &SteeringChannel {
        &self.channel
    }

    fn channel_mut(&mut self) -> &mut SteeringChannel {
        &mut self.channel
    }

    fn reset(&mut self, v: f64) {
        self.channel.reset(v);
        if let Some(f) = self.filter.as_mut() {
            f.reset();
        }
    }
}

// ── Lateral velocity ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct YdSteering {
    channel: SteeringChannel,
}

impl YdSteering {
    pub fn new(min: f64, max: f64, slew_limit: f64) -> Self {
        Self {
            channel: SteeringChannel::new(min, max, slew_limit),
        }
    }

    pub fn update(&mut self, request: f64, dt: f64) -> f64 {
        self.channel.cmd_req = self.channel.saturate(request);
        let target = self.channel.cmd_req;
        let limit = self.channel.slew_limit;
        self.channel.advance(target, limit, dt, None)
    }
}

impl SteeringProcessor for YdSteering {
    fn channel(&self) -> &SteeringChannel {
        &self.channel
    }

    fn channel_mut(&mut self) -> &mut SteeringChannel {
        &mut self.channel
    }
}

// ── Yaw rate ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RzdSteering {
    channel: SteeringChannel,
    roll_limit: f64,
    filter: Option<SecondOrderLowPass>,
}

impl RzdSteering {
    pub fn new(min: f64, max: f64, slew_limit: f64, roll_limit: f64) -> Self {
        Self {
            channel: SteeringChannel::new(min, max, slew_limit),
            roll_limit,
            filter: None,
        }
    }

    /// Attach (or replace) the low-pass stage. `q = None` selects Butterworth.
    pub fn set_filter_params(&mut self, dt: f64, fc: f64, q: Option<f64>) -> Result<(), FilterError> {
        self.filter = Some(design_filter(dt, fc, q)?);
        Ok(())
    }

    pub fn clear_filter(&mut self) {
        self.filter = None;
    }

    pub fn filter(&self) -> Option<&SecondOrderLowPass> {
        self.filter.as_ref()
    }

    pub fn roll_limit(&self) -> f64 {
        self.roll_limit
    }

    /// Largest yaw-rate magnitude allowed at `forward_velocity`.
    ///
    /// Above walking pace this is the coordinated-turn rate `g·tan(roll) / |v|`.
    pub fn yaw_rate_ceiling(&self, forward_velocity: f64) -> f64 {
        let speed = forward_velocity.abs();
        if speed < YAW_CEILING_MIN_SPEED {
            self.channel.max
        } else {
            (GRAVITY / speed) * self.roll_limit.tan()
        }
    }

    /// `cmd_req` keeps the statically saturated request; the speed ceiling
    /// only shapes the slew target.
    pub fn update(&mut self, request: f64, forward_velocity: f64, dt: f64) -> f64 {
        let ceiling = self.yaw_rate_ceiling(forward_velocity);
        self.channel.cmd_req = self.channel.saturate(request);
        let target = saturate(self.channel.cmd_req, -ceiling, ceiling);
        let limit = self.channel.slew_limit;
        self.channel
            .advance(target, limit, dt, self.filter.as_mut())
    }
}

impl SteeringProcessor for RzdSteering {
    fn channel(&self) -> &SteeringChannel {
        &self.channel
    }

    fn channel_mut(&mut self) -> &mut SteeringChannel {
        &mut self.channel
    }

    fn reset(&mut self, v: f64) {
        self.channel.reset(v);
        if let Some(f) = self.filter.as_mut() {
            f.reset();
        }
    }
}
