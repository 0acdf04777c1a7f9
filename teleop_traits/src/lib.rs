pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// Logical stick deflections after platform axis mapping and sign inversion.
///
/// Each axis is nominally in `[-1, 1]`; positive `forward` drives ahead,
/// positive `yaw` turns counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StickFrame {
    pub forward: f64,
    pub lateral: f64,
    pub yaw: f64,
}

impl StickFrame {
    pub const NEUTRAL: Self = Self {
        forward: 0.0,
        lateral: 0.0,
        yaw: 0.0,
    };

    pub fn new(forward: f64, lateral: f64, yaw: f64) -> Self {
        Self {
            forward,
            lateral,
            yaw,
        }
    }
}

/// Shaped body-frame velocity command: m/s forward, m/s lateral, rad/s yaw.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VelocityCommand {
    pub xd: f64,
    pub yd: f64,
    pub rzd: f64,
}

impl VelocityCommand {
    pub const ZERO: Self = Self {
        xd: 0.0,
        yd: 0.0,
        rzd: 0.0,
    };
}

/// Operator input polled once per control tick.
pub trait AxisSource {
    fn read_frame(&mut self) -> Result<StickFrame, Box<dyn std::error::Error + Send + Sync>>;
}

/// Consumer of shaped commands (locomotion controller, simulator, logger).
pub trait CommandSink {
    /// Deliver one command; `dt_s` is the tick period it was shaped over.
    fn send(
        &mut self,
        cmd: &VelocityCommand,
        dt_s: f64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

impl<T: AxisSource + ?Sized> AxisSource for Box<T> {
    fn read_frame(&mut self) -> Result<StickFrame, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read_frame()
    }
}

impl<T: CommandSink + ?Sized> CommandSink for Box<T> {
    fn send(
        &mut self,
        cmd: &VelocityCommand,
        dt_s: f64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).send(cmd, dt_s)
    }
    fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).stop()
    }
}
