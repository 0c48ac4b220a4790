//! Error types for configuration and session control.

use thiserror::Error;

/// A configuration value that would make the pipeline misbehave.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{0} must be at least 1 frame")]
    ZeroWindow(&'static str),
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("{field} is out of range, got {value}")]
    OutOfRange { field: &'static str, value: f32 },
    #[error(
        "one frame can add up to {step}s of hold (max_dt_seconds * increment_rate), \
         which reaches required_hold_seconds = {required}"
    )]
    SingleFrameCompletion { step: f32, required: f32 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("a session needs at least one reference pose")]
    NoPoses,
    #[error("session has already been started")]
    AlreadyStarted,
}
