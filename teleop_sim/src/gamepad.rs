//! Raw gamepads and the adapter that turns them into an `AxisSource`.

use std::time::Instant;

use teleop_traits::clock::Clock;
use teleop_traits::{AxisSource, StickFrame};

use crate::axis_map::AxisMap;
use crate::error::{Result, SimError};

/// One poll of a physical pad.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawState {
    pub axes: Vec<f64>,
    pub buttons: Vec<bool>,
}

/// Anything that can be polled for raw axis and button values.
pub trait RawGamepad {
    fn poll(&mut self) -> Result<RawState>;
}

impl<T: RawGamepad + ?Sized> RawGamepad for Box<T> {
    fn poll(&mut self) -> Result<RawState> {
        (**self).poll()
    }
}

/// A logical stick frame that takes effect at `t_s`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub t_s: f64,
    pub frame: StickFrame,
}

impl Keyframe {
    pub fn new(t_s: f64, forward: f64, lateral: f64, yaw: f64) -> Self {
        Self {
            t_s,
            frame: StickFrame::new(forward, lateral, yaw),
        }
    }
}

impl From<&teleop_config::ScriptRow> for Keyframe {
    fn from(r: &teleop_config::ScriptRow) -> Self {
        Self::new(r.t_s, r.forward, r.lateral, r.yaw)
    }
}

/// Replays keyframes with zero-order hold on a clock.
///
/// Before the first keyframe the sticks are neutral; after the last one its
/// frame is held. Frames are encoded through `map`, so a `MappedGamepad`
/// with the same map reads them back unchanged.
pub struct ScriptedPad {
    keyframes: Vec<Keyframe>,
    map: AxisMap,
    clock: Box<dyn Clock + Send + Sync>,
    epoch: Instant,
}

impl core::fmt::Debug for ScriptedPad {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScriptedPad")
            .field("keyframes", &self.keyframes.len())
            .field("map", &self.map)
            .field("elapsed_s", &self.elapsed_s())
            .finish()
    }
}

impl ScriptedPad {
    pub fn new(
        keyframes: Vec<Keyframe>,
        map: AxisMap,
        clock: Box<dyn Clock + Send + Sync>,
    ) -> Result<Self> {
        if keyframes.is_empty() {
            return Err(SimError::EmptyScript);
        }
        let mut prev = f64::NEG_INFINITY;
        for (index, k) in keyframes.iter().enumerate() {
            let f = k.frame;
            if ![k.t_s, f.forward, f.lateral, f.yaw].iter().all(|v| v.is_finite()) {
                return Err(SimError::NonFiniteKeyframe { index });
            }
            if k.t_s < prev {
                return Err(SimError::UnsortedScript { index });
            }
            prev = k.t_s;
        }
        let epoch = clock.now();
        tracing::debug!(keyframes = keyframes.len(), "scripted pad loaded");
        Ok(Self {
            keyframes,
            map,
            clock,
            epoch,
        })
    }

    pub fn from_rows(
        rows: &[teleop_config::ScriptRow],
        map: AxisMap,
        clock: Box<dyn Clock + Send + Sync>,
    ) -> Result<Self> {
        Self::new(rows.iter().map(Keyframe::from).collect(), map, clock)
    }

    /// Restart playback from the first keyframe.
    pub fn restart(&mut self) {
        self.epoch = self.clock.now();
    }

    pub fn elapsed_s(&self) -> f64 {
        self.clock.secs_since(self.epoch)
    }

    /// Time of the last keyframe.
    pub fn duration_s(&self) -> f64 {
        self.keyframes.last().map_or(0.0, |k| k.t_s)
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Logical frame held at script time `t_s`.
    pub fn frame_at(&self, t_s: f64) -> StickFrame {
        let idx = self.keyframes.partition_point(|k| k.t_s <= t_s);
        match idx {
            0 => StickFrame::NEUTRAL,
            i => self.keyframes[i - 1].frame,
        }
    }
}

impl RawGamepad for ScriptedPad {
    fn poll(&mut self) -> Result<RawState> {
        let frame = self.frame_at(self.elapsed_s());
        Ok(RawState {
            axes: self.map.encode(&frame, self.map.min_axes())?,
            buttons: vec![false; self.map.min_buttons()],
        })
    }
}

/// `AxisSource` over any raw pad.
#[derive(Debug)]
pub struct MappedGamepad<G: RawGamepad> {
    pad: G,
    map: AxisMap,
    bumpers: (bool, bool),
}

impl<G: RawGamepad> MappedGamepad<G> {
    pub fn new(pad: G, map: AxisMap) -> Self {
        Self {
            pad,
            map,
            bumpers: (false, false),
        }
    }

    pub fn map(&self) -> &AxisMap {
        &self.map
    }

    pub fn pad(&self) -> &G {
        &self.pad
    }

    pub fn pad_mut(&mut self) -> &mut G {
        &mut self.pad
    }

    /// Bumper state from the last read.
    pub fn bumpers(&self) -> (bool, bool) {
        self.bumpers
    }
}

impl<G: RawGamepad> AxisSource for MappedGamepad<G> {
    fn read_frame(&mut self) -> std::result::Result<StickFrame, Box<dyn std::error::Error + Send + Sync>> {
        let raw = self.pad.poll()?;
        let pressed = self.map.bumpers(&raw.buttons);
        if pressed != self.bumpers && (pressed.0 || pressed.1) {
            tracing::debug!(lbump = pressed.0, rbump = pressed.1, "bumper pressed");
        }
        self.bumpers = pressed;
        Ok(self.map.apply(&raw.axes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use teleop_traits::ManualClock;

    fn script() -> Vec<Keyframe> {
        vec![
            Keyframe::new(0.5, 1.0, 0.0, 0.0),
            Keyframe::new(2.0, 0.5, 0.0, -1.0),
        ]
    }

    #[test]
    fn zero_order_hold() {
        let pad = ScriptedPad::new(script(), AxisMap::LINUX, Box::new(ManualClock::new())).unwrap();
        assert_eq!(pad.frame_at(0.0), StickFrame::NEUTRAL);
        assert_eq!(pad.frame_at(0.5).forward, 1.0);
        assert_eq!(pad.frame_at(1.99).forward, 1.0);
        assert_eq!(pad.frame_at(2.0), StickFrame::new(0.5, 0.0, -1.0));
        assert_eq!(pad.frame_at(100.0), StickFrame::new(0.5, 0.0, -1.0));
        assert_eq!(pad.duration_s(), 2.0);
    }

    #[test]
    fn mapped_pad_reads_script_through_the_clock() {
        let clock = ManualClock::new();
        let pad = ScriptedPad::new(script(), AxisMap::MACOS, Box::new(clock.clone())).unwrap();
        let mut src = MappedGamepad::new(pad, AxisMap::MACOS);
        assert_eq!(src.read_frame().unwrap(), StickFrame::NEUTRAL);
        clock.advance(Duration::from_millis(600));
        assert_eq!(src.read_frame().unwrap().forward, 1.0);
        clock.advance(Duration::from_secs(2));
        assert_eq!(src.read_frame().unwrap().yaw, -1.0);
        src.pad_mut().restart();
        assert_eq!(src.read_frame().unwrap(), StickFrame::NEUTRAL);
    }

    #[test]
    fn invalid_scripts_are_rejected() {
        let clock = || Box::new(ManualClock::new());
        assert_eq!(
            ScriptedPad::new(vec![], AxisMap::LINUX, clock()).unwrap_err(),
            SimError::EmptyScript
        );
        let mut unsorted = script();
        unsorted.reverse();
        assert_eq!(
            ScriptedPad::new(unsorted, AxisMap::LINUX, clock()).unwrap_err(),
            SimError::UnsortedScript { index: 1 }
        );
        let nan = vec![Keyframe::new(0.0, f64::NAN, 0.0, 0.0)];
        assert_eq!(
            ScriptedPad::new(nan, AxisMap::LINUX, clock()).unwrap_err(),
            SimError::NonFiniteKeyframe { index: 0 }
        );
    }
}
