//! # Checker Abstraction
//!
//! A `Checker` is one health probe against an external dependency: a database
//! ping, a queue-depth query, an upstream HTTP endpoint. How the probe talks
//! to its dependency is entirely the checker's business; this crate only
//! cares whether `run()` succeeded or failed, and with what.
//!
//! ## Error Taxonomy
//!
//! - [`CheckError::Failed`] carries a [`CheckerFailure`], the designated,
//!   expected failure kind. The executor catches it and drives the
//!   retry/failure state machine.
//! - [`CheckError::Unexpected`] wraps anything else (panicked invariants,
//!   misconfiguration, bugs). The executor never catches it; it propagates
//!   to the caller unchanged.
//!
//! ## Optional Capabilities
//!
//! Deferred retry is opt-in through default trait methods:
//!
//! - [`Checker::retry_job_type`] returns `Some(JobType)` when the checker
//!   wants its retries executed asynchronously on a scheduler; `None` (the
//!   default) means retries are accounted synchronously and re-attempted on
//!   the next scheduled tick.
//! - [`Checker::attach_retry_job`] lets the checker inspect the constructed
//!   [`RetryJob`] before it is submitted.
//!
//! Capabilities are expressed by overriding these methods, never by runtime
//! reflection.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::scheduler::{JobType, RetryJob};

/// Identity of a checker, stable across runs.
///
/// One `CheckerId` keys one state record; concurrent runs for different ids
/// never interfere.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CheckerId(String);

impl CheckerId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CheckerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CheckerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The designated failure a checker signals when its probe fails.
///
/// Captured into the state record on a terminal failure and carried on
/// transition events for downstream notification logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct CheckerFailure {
    /// Human-readable description of what failed
    pub message: String,
    /// Underlying cause, if the checker captured one
    pub cause: Option<String>,
    /// When the failure was observed
    pub failed_at: DateTime<Utc>,
}

impl CheckerFailure {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
            cause: None,
            failed_at: Utc::now(),
        }
    }

    /// Attach the underlying cause
    pub fn with_cause<S: Into<String>>(mut self, cause: S) -> Self {
        self.cause = Some(cause.into());
        self
    }
}

/// Error returned by [`Checker::run`].
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// The designated failure kind, caught by the executor and fed into the
    /// retry/failure state machine
    #[error("checker failed: {0}")]
    Failed(#[from] CheckerFailure),

    /// Anything else: never caught, surfaces to the caller as fatal
    #[error("unexpected checker error: {0}")]
    Unexpected(#[source] anyhow::Error),
}

/// One health probe against an external dependency.
#[async_trait]
pub trait Checker: Send + Sync {
    /// Stable identity of this checker
    fn id(&self) -> CheckerId;

    /// Run the probe once. `Ok(())` means the dependency is healthy.
    async fn run(&self) -> Result<(), CheckError>;

    /// Deferred-retry job type, if this checker wants failed runs retried
    /// asynchronously. `None` declines deferred retry: the failure is
    /// accounted synchronously and the checker is re-run on the next tick.
    fn retry_job_type(&self) -> Option<JobType> {
        None
    }

    /// Called with the constructed retry job before it is submitted.
    fn attach_retry_job(&self, _job: &RetryJob) {}
}
