//! Simulation collaborators for the teleop core.
//!
//! - `AxisMap`: platform joystick layouts and raw-to-logical mapping
//! - `ScriptedPad` / `MappedGamepad`: clock-driven stick scripts as an `AxisSource`
//! - `Scenario`: built-in scripts
//! - `KinematicRobot`: a planar robot as a `CommandSink`

pub mod axis_map;
pub mod error;
pub mod gamepad;
pub mod robot;
pub mod scenario;

pub use axis_map::AxisMap;
pub use error::{Result, SimError};
pub use gamepad::{Keyframe, MappedGamepad, RawGamepad, RawState, ScriptedPad};
pub use robot::{Arena, KinematicRobot, Pose};
pub use scenario::Scenario;
