//! # Error Handling
//!
//! Top-level error type for callers that want one flat surface instead of
//! the per-layer enums. Each layer's error converts in at its natural seam,
//! collapsing to the variant's message string.

use std::fmt;

use crate::executor::ExecutorError;
use crate::scheduler::ScheduleError;
use crate::state::StateStoreError;

#[derive(Debug, Clone, PartialEq)]
pub enum SentinelError {
    StateStoreError(String),
    SchedulerError(String),
    ExecutionError(String),
    ConfigurationError(String),
}

impl fmt::Display for SentinelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentinelError::StateStoreError(msg) => write!(f, "State store error: {msg}"),
            SentinelError::SchedulerError(msg) => write!(f, "Scheduler error: {msg}"),
            SentinelError::ExecutionError(msg) => write!(f, "Execution error: {msg}"),
            SentinelError::ConfigurationError(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for SentinelError {}

impl From<StateStoreError> for SentinelError {
    fn from(error: StateStoreError) -> Self {
        SentinelError::StateStoreError(error.to_string())
    }
}

impl From<ScheduleError> for SentinelError {
    fn from(error: ScheduleError) -> Self {
        SentinelError::SchedulerError(error.to_string())
    }
}

impl From<ExecutorError> for SentinelError {
    fn from(error: ExecutorError) -> Self {
        match error {
            ExecutorError::Store(e) => e.into(),
            ExecutorError::Scheduler(e) => e.into(),
            ExecutorError::Unexpected(e) => SentinelError::ExecutionError(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, SentinelError>;
