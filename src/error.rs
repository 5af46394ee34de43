//! Hard failures of the planning engine.
//!
//! Expected scheduling outcomes (a task that does not fit, a rejected edit)
//! are reason codes inside an [`Outcome`](crate::models::Outcome). Only the
//! errors below propagate to the caller.

use thiserror::Error;

use crate::validation::Violation;

/// Errors returned by the synthesizer and the mutator.
#[derive(Error, Debug)]
pub enum ScheduleError {
    /// Structurally invalid input, rejected before any scheduling logic runs.
    #[error("Malformed input: {reason}")]
    MalformedInput {
        /// What was wrong with the input.
        reason: String,
    },

    /// The constructive algorithm produced a schedule that fails validation.
    ///
    /// This is a logic error inside the engine, never a normal outcome.
    #[error("Synthesis produced an invalid schedule ({} violation(s))", .violations.len())]
    SynthesisInvariantViolation {
        /// Every rule the produced schedule broke.
        violations: Vec<Violation>,
    },

    /// Engine configuration could not be loaded or is out of range.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ScheduleError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            reason: reason.into(),
        }
    }

    /// Whether this error signals a bug in the engine rather than bad input.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::SynthesisInvariantViolation { .. })
    }
}

/// Configuration error types.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid buffer_minutes: {0}. Must be between 5 and 10")]
    InvalidBuffer(i64),

    #[error("Invalid {field}: {value}. Must be positive")]
    NonPositive { field: &'static str, value: i64 },

    #[error("Invalid {field}: {value}. Must be at most {max}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        max: i64,
    },

    #[error("Invalid midday band: {start} to {end} cannot hold a {minutes}-minute break")]
    InvalidMiddayBand {
        start: chrono::NaiveTime,
        end: chrono::NaiveTime,
        minutes: i64,
    },

    #[error("Failed to extract configuration: {0}")]
    Extract(#[from] Box<figment::Error>),
}

/// Result alias used throughout the crate.
pub type ScheduleResult<T> = Result<T, ScheduleError>;
