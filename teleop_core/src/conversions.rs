//! `From` implementations bridging `teleop_config` types to `teleop_core` types.

use crate::config::{FilterSpec, ForwardCfg, LateralCfg, ShapingCfg, YawCfg};
use crate::input::InputCfg;

// ── FilterSpec ───────────────────────────────────────────────────────────────

/// A disabled filter section maps to "no filter".
fn filter_from(spec: Option<&teleop_config::FilterSpec>) -> Option<FilterSpec> {
    spec.filter(|s| s.enabled).map(|s| FilterSpec {
        cutoff_hz: s.cutoff_hz,
        quality: s.quality,
    })
}

// ── Channels ─────────────────────────────────────────────────────────────────

impl From<&teleop_config::ForwardCfg> for ForwardCfg {
    fn from(c: &teleop_config::ForwardCfg) -> Self {
        Self {
            min: c.min,
            max: c.max,
            slew_limit: c.slew_limit,
            min_slew_limit: c.min_slew_limit,
            min_slew_vel: c.min_slew_vel,
            filter: filter_from(c.filter.as_ref()),
        }
    }
}

impl From<&teleop_config::LateralCfg> for LateralCfg {
    fn from(c: &teleop_config::LateralCfg) -> Self {
        Self {
            min: c.min,
            max: c.max,
            slew_limit: c.slew_limit,
        }
    }
}

impl From<&teleop_config::YawCfg> for YawCfg {
    fn from(c: &teleop_config::YawCfg) -> Self {
        Self {
            min: c.min,
            max: c.max,
            slew_limit: c.slew_limit,
            roll_limit_rad: c.roll_limit_rad,
            filter: filter_from(c.filter.as_ref()),
        }
    }
}

// ── ShapingCfg ───────────────────────────────────────────────────────────────

impl From<&teleop_config::Config> for ShapingCfg {
    fn from(c: &teleop_config::Config) -> Self {
        Self {
            forward: (&c.forward).into(),
            lateral: (&c.lateral).into(),
            yaw: (&c.yaw).into(),
        }
    }
}

// ── InputCfg ─────────────────────────────────────────────────────────────────

impl From<&teleop_config::InputCfg> for InputCfg {
    fn from(c: &teleop_config::InputCfg) -> Self {
        Self {
            deadband: c.deadband,
            lateral_deadband: c.lateral_deadband,
            xd_full_scale: c.xd_full_scale,
            yd_full_scale: c.yd_full_scale,
            rzd_full_scale: c.rzd_full_scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_agree_across_crates() {
        let cfg = teleop_config::Config::default();
        assert_eq!(ShapingCfg::from(&cfg), ShapingCfg::default());
        assert_eq!(InputCfg::from(&cfg.input), InputCfg::default());
    }

    #[test]
    fn disabled_filter_is_dropped() {
        let cfg = teleop_config::load_toml(
            "[forward.filter]\nenabled = false\ncutoff_hz = 1.0\n",
        )
        .unwrap();
        let shaping = ShapingCfg::from(&cfg);
        assert!(shaping.forward.filter.is_none());
        assert!(shaping.yaw.filter.is_some());
    }
}
