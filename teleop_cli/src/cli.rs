//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

/// Keeps the non-blocking file writer alive; dropping it flushes pending lines.
pub static FILE_GUARD: Mutex<Option<tracing_appender::non_blocking::WorkerGuard>> =
    Mutex::new(None);
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "teleop", version, about = "Teleop command shaping CLI")]
pub struct Cli {
    /// Path to config TOML; built-in defaults when omitted
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print results and errors as JSON, log as JSON lines
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Drive the simulated robot from a scripted stick
    Drive {
        /// Built-in stick script: full-throttle, slalom, step-turn, idle
        #[arg(long, value_name = "NAME", conflicts_with = "script")]
        scenario: Option<String>,
        /// Stick script CSV (t_s,forward,lateral,yaw)
        #[arg(long, value_name = "CSV")]
        script: Option<PathBuf>,
        /// Run length in seconds; defaults to the scenario length
        #[arg(long, value_name = "S", allow_negative_numbers = true)]
        duration_s: Option<f64>,
        /// Pace ticks on the wall clock instead of simulated time
        #[arg(long, action = ArgAction::SetTrue)]
        realtime: bool,
        /// Write the telemetry history to this CSV file
        #[arg(long, value_name = "FILE")]
        telemetry_csv: Option<PathBuf>,
        /// Joystick layout to use (macos, linux, windows); host layout by default
        #[arg(long, value_name = "OS")]
        platform: Option<String>,
    },
    /// Print the step response of a low-pass design
    Filter {
        /// Cutoff frequency in Hz
        #[arg(long, value_name = "HZ")]
        cutoff_hz: f64,
        /// Quality factor; Butterworth when omitted
        #[arg(long, value_name = "Q")]
        quality: Option<f64>,
        /// Sample rate in Hz; defaults to loop.rate_hz from the config
        #[arg(long, value_name = "HZ")]
        rate_hz: Option<f64>,
        /// Number of samples after the step
        #[arg(long, default_value_t = 60)]
        samples: usize,
        /// Step height
        #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
        step: f64,
    },
    /// Build the configured pipeline and run one idle tick
    SelfCheck,
    /// Health check for operational monitoring
    Health,
}
