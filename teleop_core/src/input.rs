//! Stick-to-request mapping: deadband, then linear scaling to full scale.

use teleop_traits::StickFrame;

use crate::util::deadband;

/// Physical-unit request handed to the shaper.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VelocityRequest {
    pub xd: f64,
    pub yd: f64,
    pub rzd: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputCfg {
    /// Symmetric deadband on the forward and yaw sticks.
    pub deadband: f64,
    pub lateral_deadband: f64,
    /// Request at full forward deflection (m/s).
    pub xd_full_scale: f64,
    pub yd_full_scale: f64,
    pub rzd_full_scale: f64,
}

impl Default for InputCfg {
    fn default() -> Self {
        Self {
            deadband: 0.1,
            lateral_deadband: 0.1,
            xd_full_scale: 9.0,
            yd_full_scale: 0.5,
            rzd_full_scale: 1.0,
        }
    }
}

impl InputCfg {
    /// Map a stick frame to a request.
    ///
    /// Rescaled so the edge of the deadband reads 0 and full deflection
    /// reads exactly the full-scale value.
    pub fn request_from_stick(&self, frame: &StickFrame) -> VelocityRequest {
        VelocityRequest {
            xd: scaled(frame.forward, self.deadband, self.xd_full_scale),
            yd: scaled(frame.lateral, self.lateral_deadband, self.yd_full_scale),
            rzd: scaled(frame.yaw, self.deadband, self.rzd_full_scale),
        }
    }
}

#[inline]
fn scaled(v: f64, band: f64, full_scale: f64) -> f64 {
    full_scale / (1.0 - band) * deadband(v, -band, band)
}
