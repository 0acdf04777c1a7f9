use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    #[error("unknown scenario '{0}' (expected one of: full-throttle, slalom, step-turn, idle)")]
    UnknownScenario(String),
    #[error("stick script has no keyframes")]
    EmptyScript,
    #[error("stick script keyframe {index} goes back in time")]
    UnsortedScript { index: usize },
    #[error("stick script keyframe {index} is not finite")]
    NonFiniteKeyframe { index: usize },
    #[error("axis index {axis} out of range for a pad with {n_axes} axes")]
    AxisOutOfRange { axis: usize, n_axes: usize },
    #[error("non-finite velocity command")]
    NonFiniteCommand,
}

pub type Result<T> = std::result::Result<T, SimError>;
