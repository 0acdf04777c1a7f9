use thiserror::Error;

/// Rejected filter design parameters.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FilterError {
    #[error("invalid filter configuration: {0}")]
    InvalidConfiguration(String),
}

#[derive(Debug, Error, Clone)]
pub enum TeleopError {
    #[error("input error: {0}")]
    Input(String),
    #[error("sink error: {0}")]
    Sink(String),
    #[error("configuration error: {0}")]
    Config(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing axis source")]
    MissingSource,
    #[error("missing command sink")]
    MissingSink,
    #[error("missing shaping config")]
    MissingShaping,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
