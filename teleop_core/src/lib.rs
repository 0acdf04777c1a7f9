#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Teleop command shaping (hardware-agnostic).
//!
//! This crate turns raw operator stick input into bounded, rate-limited,
//! low-pass filtered velocity commands. All I/O goes through
//! `teleop_traits::AxisSource` and `teleop_traits::CommandSink`.
//!
//! ## Architecture
//!
//! - **Helpers**: saturation, deadband, slew limiting, planar rotation (`util`)
//! - **Filtering**: bilinear-transform second-order low-pass (`filter`)
//! - **Steering**: forward, lateral and yaw processors (`steering`)
//! - **Shaping**: the three processors in dependency order (`shaper`)
//! - **Drive loop**: `TeleopCore`, its builder, and a paced runner
//!
//! ## Ordering
//!
//! The yaw ceiling depends on the shaped forward velocity of the same tick,
//! so `Shaper::update` always runs forward before yaw.

// Module declarations
pub mod builder;
pub mod config;
pub mod conversions;
pub mod drive;
pub mod error;
pub mod filter;
pub mod input;
pub mod mocks;
pub mod runner;
pub mod shaper;
pub mod steering;
pub mod telemetry;
pub mod util;

// Re-exports for a compact public API
pub use builder::{DEFAULT_RATE_HZ, Missing, Set, Teleop, TeleopBuilder, build_teleop};
pub use config::{FilterSpec, ForwardCfg, LateralCfg, ShapingCfg, YawCfg};
pub use drive::{TeleopCore, TickReport};
pub use error::{BuildError, FilterError, Result, TeleopError};
pub use filter::{
    Coefficients, DEFAULT_QUALITY, FilterDesign, FilterMemory, SecondOrderLowPass, expand_monic,
};
pub use input::{InputCfg, VelocityRequest};
pub use runner::{DriveSummary, RunParams, StopReason};
pub use shaper::Shaper;
pub use steering::{RzdSteering, SteeringChannel, SteeringProcessor, XdSteering, YdSteering};
pub use telemetry::{ChannelSample, DEFAULT_HISTORY, TelemetryHistory, TickSample};
pub use util::{deadband, rot2d, saturate, slew_rate_limit};

pub use teleop_traits::{StickFrame, VelocityCommand};
