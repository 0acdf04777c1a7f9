//! Configuration types for the shaping pipeline.
//!
//! These are the runtime configuration structs used by `Shaper` and
//! `TeleopCore`. They are separate from the TOML-deserialized config in
//! `teleop_config`; see `conversions` for the mapping.

/// Low-pass stage attached to a steering channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSpec {
    pub cutoff_hz: f64,
    /// `None` selects the Butterworth quality factor.
    pub quality: Option<f64>,
}

/// Forward velocity channel (m/s).
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardCfg {
    pub min: f64,
    pub max: f64,
    /// Slew limit at standstill (m/s²).
    pub slew_limit: f64,
    /// Floor the derated slew limit never drops below.
    pub min_slew_limit: f64,
    /// Speed at which the derated limit reaches `min_slew_limit`; 0 disables derating.
    pub min_slew_vel: f64,
    pub filter: Option<FilterSpec>,
}

impl Default for ForwardCfg {
    fn default() -> Self {
        Self {
            min: -3.0,
            max: 9.5,
            slew_limit: 1.5,
            min_slew_limit: 0.5,
            min_slew_vel: 7.0,
            filter: Some(FilterSpec {
                cutoff_hz: 0.9,
                quality: Some(0.5),
            }),
        }
    }
}

/// Lateral velocity channel (m/s).
#[derive(Debug, Clone, PartialEq)]
pub struct LateralCfg {
    pub min: f64,
    pub max: f64,
    pub slew_limit: f64,
}

impl Default for LateralCfg {
    fn default() -> Self {
        Self {
            min: -0.5,
            max: 0.5,
            slew_limit: 0.75,
        }
    }
}

/// Yaw rate channel (rad/s).
#[derive(Debug, Clone, PartialEq)]
pub struct YawCfg {
    pub min: f64,
    pub max: f64,
    pub slew_limit: f64,
    /// Bank angle bounding the coordinated-turn yaw rate.
    pub roll_limit_rad: f64,
    pub filter: Option<FilterSpec>,
}

impl Default for YawCfg {
    fn default() -> Self {
        Self {
            min: -1.0,
            max: 1.0,
            slew_limit: 0.4 / 0.33,
            roll_limit_rad: 0.39,
            filter: Some(FilterSpec {
                cutoff_hz: 3.0,
                quality: Some(0.5),
            }),
        }
    }
}

/// All three channels.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShapingCfg {
    pub forward: ForwardCfg,
    pub lateral: LateralCfg,
    pub yaw: YawCfg,
}
