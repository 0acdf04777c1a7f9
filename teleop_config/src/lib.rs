#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and stick-script parsing for the teleop stack.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Every section is optional; an empty file yields the tuned defaults.
//! - The stick-script CSV loader enforces headers and time ordering.
use serde::Deserialize;

/// Stick-script CSV schema.
///
/// Expected headers:
/// t_s,forward,lateral,yaw
///
/// Example:
/// t_s,forward,lateral,yaw
/// 0.0,0.0,0.0,0.0
/// 1.5,1.0,0.0,0.2
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct ScriptRow {
    pub t_s: f64,
    pub forward: f64,
    pub lateral: f64,
    pub yaw: f64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoopCfg {
    /// Nominal control rate; filters are designed for `1 / rate_hz`.
    pub rate_hz: f64,
}

impl Default for LoopCfg {
    fn default() -> Self {
        Self { rate_hz: 30.0 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct InputCfg {
    /// Symmetric deadband applied to the forward and yaw sticks.
    pub deadband: f64,
    pub lateral_deadband: f64,
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

/// Low-pass stage for a steering channel.
///
/// Accepts either an inline table `filter = { cutoff_hz = 0.9, quality = 0.5 }`
/// or a `[forward.filter]` section. Set `enabled = false` to bypass it.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct FilterSpec {
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub cutoff_hz: f64,
    /// Quality factor; absent means the Butterworth value (√2/2).
    #[serde(default)]
    pub quality: Option<f64>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ForwardCfg {
    pub min: f64,
    pub max: f64,
    pub slew_limit: f64,
    pub min_slew_limit: f64,
    /// Speed at which the slew limit has derated down to `min_slew_limit` (0 disables).
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
                enabled: true,
                cutoff_hz: 0.9,
                quality: Some(0.5),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
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

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct YawCfg {
    pub min: f64,
    pub max: f64,
    pub slew_limit: f64,
    /// Bank angle the yaw-rate ceiling is derived from, in radians.
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
                enabled: true,
                cutoff_hz: 3.0,
                quality: Some(0.5),
            }),
        }
    }
}

/// Full gamepad layout override; when absent the host platform table is used.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct JoystickCfg {
    pub x_axis: usize,
    pub y_axis: usize,
    pub rz_axis: usize,
    pub lbump: usize,
    pub rbump: usize,
    #[serde(default = "default_true")]
    pub x_inv: bool,
    #[serde(default)]
    pub y_inv: bool,
    #[serde(default = "default_true")]
    pub rz_inv: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ArenaCfg {
    pub width_m: f64,
    pub height_m: f64,
}

impl Default for ArenaCfg {
    fn default() -> Self {
        // 1000 x 800 px at 15 px per metre
        Self {
            width_m: 1000.0 / 15.0,
            height_m: 800.0 / 15.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TelemetryCfg {
    /// Number of ticks kept in the rolling history.
    pub history: usize,
}

impl Default for TelemetryCfg {
    fn default() -> Self {
        Self { history: 1000 }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    #[serde(rename = "loop")]
    pub control_loop: LoopCfg,
    pub input: InputCfg,
    pub forward: ForwardCfg,
    pub lateral: LateralCfg,
    pub yaw: YawCfg,
    pub joystick: Option<JoystickCfg>,
    pub arena: ArenaCfg,
    pub telemetry: TelemetryCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

pub fn load_script_csv(path: &std::path::Path) -> eyre::Result<Vec<ScriptRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open stick script CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["t_s", "forward", "lateral", "yaw"];
    let actual: Vec<String> = headers.iter().map(ToString::to_string).collect();
    if actual != expected {
        eyre::bail!(
            "stick script CSV must have headers 't_s,forward,lateral,yaw', got: {}",
            actual.join(",")
        );
    }

    let mut rows: Vec<ScriptRow> = Vec::new();
    for (idx, rec) in rdr.deserialize::<ScriptRow>().enumerate() {
        let line = idx + 2;
        let row = rec.map_err(|e| eyre::eyre!("invalid CSV row {line}: {e}"))?;
        if ![row.t_s, row.forward, row.lateral, row.yaw]
            .iter()
            .all(|v| v.is_finite())
        {
            eyre::bail!("CSV row {line} contains a non-finite value");
        }
        if row.t_s < 0.0 {
            eyre::bail!("CSV row {line}: t_s must be >= 0");
        }
        if let Some(prev) = rows.last()
            && row.t_s < prev.t_s
        {
            eyre::bail!(
                "CSV row {line}: t_s must be non-decreasing ({} after {})",
                row.t_s,
                prev.t_s
            );
        }
        rows.push(row);
    }

    if rows.is_empty() {
        eyre::bail!("stick script CSV {:?} has no rows", path);
    }
    Ok(rows)
}

fn check_filter(section: &str, spec: Option<&FilterSpec>) -> eyre::Result<()> {
    let Some(f) = spec else {
        return Ok(());
    };
    if !(f.cutoff_hz.is_finite() && f.cutoff_hz > 0.0) {
        eyre::bail!("{section}.filter.cutoff_hz must be > 0");
    }
    if let Some(q) = f.quality
        && !(q.is_finite() && q > 0.0)
    {
        eyre::bail!("{section}.filter.quality must be > 0");
    }
    Ok(())
}

fn check_slew(key: &str, v: f64) -> eyre::Result<()> {
    if !(v.is_finite() && v >= 0.0) {
        eyre::bail!("{key} must be >= 0");
    }
    Ok(())
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Loop
        let rate = self.control_loop.rate_hz;
        if !(rate.is_finite() && rate > 0.0) {
            eyre::bail!("loop.rate_hz must be > 0");
        }
        if std::time::Duration::try_from_secs_f64(1.0 / rate).is_err() {
            eyre::bail!("loop.rate_hz is too low for a tick period");
        }

        // Input
        for (key, db) in [
            ("input.deadband", self.input.deadband),
            ("input.lateral_deadband", self.input.lateral_deadband),
        ] {
            if !(0.0..1.0).contains(&db) {
                eyre::bail!("{key} must be in [0.0, 1.0)");
            }
        }
        for (key, fs) in [
            ("input.xd_full_scale", self.input.xd_full_scale),
            ("input.yd_full_scale", self.input.yd_full_scale),
            ("input.rzd_full_scale", self.input.rzd_full_scale),
        ] {
            if !fs.is_finite() {
                eyre::bail!("{key} must be finite");
            }
        }

        // Channels: min < max is deliberately left to the caller
        check_slew("forward.slew_limit", self.forward.slew_limit)?;
        check_slew("forward.min_slew_limit", self.forward.min_slew_limit)?;
        if !(self.forward.min_slew_vel.is_finite() && self.forward.min_slew_vel >= 0.0) {
            eyre::bail!("forward.min_slew_vel must be >= 0");
        }
        check_filter("forward", self.forward.filter.as_ref())?;
        check_slew("lateral.slew_limit", self.lateral.slew_limit)?;
        check_slew("yaw.slew_limit", self.yaw.slew_limit)?;
        if !self.yaw.roll_limit_rad.is_finite() {
            eyre::bail!("yaw.roll_limit_rad must be finite");
        }
        check_filter("yaw", self.yaw.filter.as_ref())?;

        // Joystick
        if let Some(js) = &self.joystick
            && (js.x_axis == js.y_axis || js.x_axis == js.rz_axis || js.y_axis == js.rz_axis)
        {
            eyre::bail!("joystick.x_axis, y_axis and rz_axis must be distinct");
        }

        // Arena
        if !(self.arena.width_m.is_finite() && self.arena.width_m > 0.0) {
            eyre::bail!("arena.width_m must be > 0");
        }
        if !(self.arena.height_m.is_finite() && self.arena.height_m > 0.0) {
            eyre::bail!("arena.height_m must be > 0");
        }

        // Telemetry
        if self.telemetry.history == 0 {
            eyre::bail!("telemetry.history must be >= 1");
        }

        // Logging
        if let Some(r) = self.logging.rotation.as_deref()
            && !matches!(r, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never, daily, hourly");
        }

        Ok(())
    }
}
