//! # Retry Scheduler Boundary
//!
//! Deferred-retry execution lives behind this boundary. The executor never
//! blocks on a retry: it submits a typed [`RetryJob`] envelope together with
//! a one-shot before-hook, and an external worker runs the job at some later
//! time.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  submit(job, hook)  ┌─────────────────┐     ┌──────────────────┐
//! │ CheckExecutor│────────────────────▶│ RetryScheduler  │────▶│ RetryJobRegistry │
//! │ (retry path) │                     │ (dispatch loop) │     │ job_type→handler │
//! └──────────────┘                     └─────────────────┘     └──────────────────┘
//! ```
//!
//! ## Ordering Guarantee
//!
//! The before-hook runs, and its retry-timestamp write completes, strictly
//! before the job's checker logic executes. Retry accounting therefore
//! reflects the attempt even when the retried checker fails again. If the
//! hook errors, the job body is skipped: a retry that cannot be accounted
//! must not run.
//!
//! The hook is an explicit parameter of `submit`, scoped to that one
//! submission; there is no process-wide hook table matching jobs by
//! payload inspection. The envelope carries the checker identity as a typed
//! field instead.

pub mod in_process;
pub mod registry;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::checker::CheckerId;
use crate::state::StateStoreError;

pub use in_process::InProcessScheduler;
pub use registry::{RetryJobHandler, RetryJobRegistry};

/// Token naming a deferred-retry unit-of-work type.
///
/// Handlers are registered against this token in a [`RetryJobRegistry`];
/// jobs are never instantiated from type names at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobType(String);

impl JobType {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for JobType {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Typed envelope for one deferred-retry attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryJob {
    /// Unique id of this job instance
    pub job_id: Uuid,
    /// Which handler executes this job
    pub job_type: JobType,
    /// Identity of the checker being retried
    pub checker_id: CheckerId,
    /// When the job was constructed
    pub enqueued_at: DateTime<Utc>,
}

impl RetryJob {
    pub fn new(job_type: JobType, checker_id: CheckerId) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            job_type,
            checker_id,
            enqueued_at: Utc::now(),
        }
    }
}

/// One-shot callback executed immediately before a submitted job's body.
///
/// For retry jobs this records the retry timestamp on the checker's state.
pub type BeforeHook =
    Box<dyn FnOnce() -> BoxFuture<'static, Result<(), StateStoreError>> + Send + 'static>;

/// Errors raised when submitting work to a scheduler.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("Scheduler is shut down, cannot accept job {job_id}")]
    SchedulerUnavailable { job_id: Uuid },

    #[error("No handler registered for job type '{job_type}'")]
    UnknownJobType { job_type: String },
}

/// Fire-and-forget execution of deferred units of work.
///
/// `submit` returns as soon as the job is queued; the caller never observes
/// the job's outcome directly. Implementations must uphold the module-level
/// ordering guarantee between the hook and the job body.
#[async_trait::async_trait]
pub trait RetryScheduler: Send + Sync {
    async fn submit(&self, job: RetryJob, before_hook: BeforeHook) -> Result<(), ScheduleError>;
}
