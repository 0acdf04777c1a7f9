//! Physical gamepad axis layout per host platform.

use teleop_core::saturate;
use teleop_traits::StickFrame;

use crate::error::{Result, SimError};

/// Which raw axis drives which logical stick, and whether it is inverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisMap {
    /// Forward stick.
    pub x_axis: usize,
    /// Lateral stick.
    pub y_axis: usize,
    /// Yaw stick.
    pub rz_axis: usize,
    pub lbump: usize,
    pub rbump: usize,
    pub x_inv: bool,
    pub y_inv: bool,
    pub rz_inv: bool,
}

impl AxisMap {
    const fn layout(x_axis: usize, y_axis: usize, rz_axis: usize, lbump: usize, rbump: usize) -> Self {
        Self {
            x_axis,
            y_axis,
            rz_axis,
            lbump,
            rbump,
            x_inv: true,
            y_inv: false,
            rz_inv: true,
        }
    }

    pub const MACOS: Self = Self::layout(3, 2, 0, 6, 7);
    pub const LINUX: Self = Self::layout(4, 3, 0, 4, 5);
    pub const WINDOWS: Self = Self::layout(3, 2, 0, 4, 5);

    /// Layout for a `std::env::consts::OS` value.
    ///
    /// Unknown platforms get the Linux layout.
    pub fn for_platform(os: &str) -> Self {
        match os {
            "macos" => Self::MACOS,
            "linux" => Self::LINUX,
            "windows" => Self::WINDOWS,
            other => {
                tracing::warn!(os = other, "no joystick layout for platform; using linux layout");
                Self::LINUX
            }
        }
    }

    /// Layout for the platform this binary runs on.
    pub fn host() -> Self {
        Self::for_platform(std::env::consts::OS)
    }

    /// Smallest axis count that covers every mapped stick.
    pub fn min_axes(&self) -> usize {
        self.x_axis.max(self.y_axis).max(self.rz_axis) + 1
    }

    /// Smallest button count that covers both bumpers.
    pub fn min_buttons(&self) -> usize {
        self.lbump.max(self.rbump) + 1
    }

    /// Logical frame from raw axis values. Missing axes read 0.
    pub fn apply(&self, raw: &[f64]) -> StickFrame {
        let read = |idx: usize, inv: bool| {
            let v = saturate(raw.get(idx).copied().unwrap_or(0.0), -1.0, 1.0);
            if inv { -v } else { v }
        };
        StickFrame {
            forward: read(self.x_axis, self.x_inv),
            lateral: read(self.y_axis, self.y_inv),
            yaw: read(self.rz_axis, self.rz_inv),
        }
    }

    /// Raw axis values that `apply` maps back to `frame`.
    pub fn encode(&self, frame: &StickFrame, n_axes: usize) -> Result<Vec<f64>> {
        let mut raw = vec![0.0; n_axes];
        for (axis, value, inv) in [
            (self.x_axis, frame.forward, self.x_inv),
            (self.y_axis, frame.lateral, self.y_inv),
            (self.rz_axis, frame.yaw, self.rz_inv),
        ] {
            let slot = raw
                .get_mut(axis)
                .ok_or(SimError::AxisOutOfRange { axis, n_axes })?;
            let v = saturate(value, -1.0, 1.0);
            *slot = if inv { -v } else { v };
        }
        Ok(raw)
    }

    /// `(left, right)` bumper state. Missing buttons read released.
    pub fn bumpers(&self, buttons: &[bool]) -> (bool, bool) {
        let pressed = |idx: usize| buttons.get(idx).copied().unwrap_or(false);
        (pressed(self.lbump), pressed(self.rbump))
    }
}

impl Default for AxisMap {
    fn default() -> Self {
        Self::host()
    }
}

impl From<&teleop_config::JoystickCfg> for AxisMap {
    fn from(c: &teleop_config::JoystickCfg) -> Self {
        Self {
            x_axis: c.x_axis,
            y_axis: c.y_axis,
            rz_axis: c.rz_axis,
            lbump: c.lbump,
            rbump: c.rbump,
            x_inv: c.x_inv,
            y_inv: c.y_inv,
            rz_inv: c.rz_inv,
        }
    }
}
