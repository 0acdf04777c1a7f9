//! The three steering processors run in dependency order.

use teleop_traits::VelocityCommand;

use crate::config::{FilterSpec, ShapingCfg};
use crate::error::Result;
use crate::input::VelocityRequest;
use crate::steering::{RzdSteering, SteeringProcessor, XdSteering, YdSteering};
use crate::telemetry::ChannelSample;

/// Forward, lateral and yaw processors sharing one update cadence.
///
/// Forward velocity is always shaped first; the yaw ceiling reads the shaped
/// (filtered) forward velocity from the same tick.
#[derive(Debug, Clone)]
pub struct Shaper {
    pub xd: XdSteering,
    pub yd: YdSteering,
    pub rzd: RzdSteering,
}

impl Shaper {
    /// Build the processors and design their filters for the nominal `dt`.
    pub fn new(cfg: &ShapingCfg, dt: f64) -> Result<Self> {
        let f = &cfg.forward;
        let mut xd = XdSteering::new(f.min, f.max, f.slew_limit, f.min_slew_limit, f.min_slew_vel);
        if let Some(FilterSpec { cutoff_hz, quality }) = f.filter {
            xd.set_filter_params(dt, cutoff_hz, quality)?;
        }

        let l = &cfg.lateral;
        let yd = YdSteering::new(l.min, l.max, l.slew_limit);

        let y = &cfg.yaw;
        let mut rzd = RzdSteering::new(y.min, y.max, y.slew_limit, y.roll_limit_rad);
        if let Some(FilterSpec { cutoff_hz, quality }) = y.filter {
            rzd.set_filter_params(dt, cutoff_hz, quality)?;
        }

        tracing::debug!(
            dt,
            xd_filtered = xd.filter().is_some(),
            rzd_filtered = rzd.filter().is_some(),
            "shaper built"
        );
        Ok(Self { xd, yd, rzd })
    }

    /// Advance all channels by one tick of length `dt`.
    pub fn update(&mut self, request: &VelocityRequest, dt: f64) -> VelocityCommand {
        let xd = self.xd.update(request.xd, dt);
        let yd = self.yd.update(request.yd, dt);
        let rzd = self.rzd.update(request.rzd, xd, dt);
        VelocityCommand { xd, yd, rzd }
    }

    pub fn reset(&mut self, cmd: &VelocityCommand) {
        self.xd.reset(cmd.xd);
        self.yd.reset(cmd.yd);
        self.rzd.reset(cmd.rzd);
    }

    /// Current shaped output without advancing.
    pub fn command(&self) -> VelocityCommand {
        VelocityCommand {
            xd: self.xd.cmd_d(),
            yd: self.yd.cmd_d(),
            rzd: self.rzd.cmd_d(),
        }
    }

    /// `(xd, yd, rzd)` channel snapshots.
    pub fn samples(&self) -> (ChannelSample, ChannelSample, ChannelSample) {
        (self.xd.sample(), self.yd.sample(), self.rzd.sample())
    }
}
