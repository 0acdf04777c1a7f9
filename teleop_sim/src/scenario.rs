//! Built-in stick scripts for driving without a pad.

use std::fmt;
use std::str::FromStr;

use crate::error::SimError;
use crate::gamepad::Keyframe;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Half a second neutral, then full forward stick.
    FullThrottle,
    /// Steady cruise while the yaw stick swings side to side.
    Slalom,
    /// Full forward, a hard left turn at speed, then straight again.
    StepTurn,
    /// Sticks at rest.
    Idle,
}

impl Scenario {
    pub const ALL: [Self; 4] = [Self::FullThrottle, Self::Slalom, Self::StepTurn, Self::Idle];

    pub fn name(self) -> &'static str {
        match self {
            Self::FullThrottle => "full-throttle",
            Self::Slalom => "slalom",
            Self::StepTurn => "step-turn",
            Self::Idle => "idle",
        }
    }

    /// Run length that shows the whole script.
    pub fn default_duration_s(self) -> f64 {
        match self {
            Self::FullThrottle => 20.0,
            Self::Slalom => 24.0,
            Self::StepTurn => 16.0,
            Self::Idle => 5.0,
        }
    }

    pub fn keyframes(self) -> Vec<Keyframe> {
        match self {
            Self::FullThrottle => vec![
                Keyframe::new(0.0, 0.0, 0.0, 0.0),
                Keyframe::new(0.5, 1.0, 0.0, 0.0),
            ],
            Self::Slalom => {
                let mut frames = vec![Keyframe::new(0.0, 0.6, 0.0, 0.0)];
                frames.extend((0..10).map(|i| {
                    let yaw = if i % 2 == 0 { 1.0 } else { -1.0 };
                    Keyframe::new(2.0 + 2.0 * f64::from(i), 0.6, 0.0, yaw)
                }));
                frames.push(Keyframe::new(22.0, 0.6, 0.0, 0.0));
                frames
            }
            Self::StepTurn => vec![
                Keyframe::new(0.0, 1.0, 0.0, 0.0),
                Keyframe::new(8.0, 1.0, 0.0, 1.0),
                Keyframe::new(12.0, 1.0, 0.0, 0.0),
                Keyframe::new(14.0, 0.0, 0.0, 0.0),
            ],
            Self::Idle => vec![Keyframe::new(0.0, 0.0, 0.0, 0.0)],
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sc| sc.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SimError::UnknownScenario(s.to_string()))
    }
}
