//! Error types for the scheduler module

use std::fmt;

/// Result type for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Scheduler-specific errors
#[derive(Debug)]
pub enum SchedulerError {
    /// Daily run time is not `HH:MM`
    InvalidTime { value: String },

    /// No instant for the run time within the next two days
    UnresolvableLocalTime { value: String },

    /// Trigger started twice
    AlreadyRunning,
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTime { value } => {
                write!(f, "Invalid schedule time '{}'. Expected HH:MM", value)
            }
            Self::UnresolvableLocalTime { value } => {
                write!(f, "Local time {} cannot be resolved", value)
            }
            Self::AlreadyRunning => write!(f, "Trigger is already running"),
        }
    }
}

impl std::error::Error for SchedulerError {}

impl SchedulerError {
    /// Create an invalid time error
    pub fn invalid_time(value: impl Into<String>) -> Self {
        Self::InvalidTime {
            value: value.into(),
        }
    }

    /// Whether the trigger may try again later
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::UnresolvableLocalTime { .. })
    }
}
