//! # In-Process Scheduler
//!
//! Tokio-based reference implementation of [`RetryScheduler`]: a single
//! dispatch loop consuming submitted jobs from an unbounded channel. Each
//! job's before-hook is awaited to completion before its handler runs,
//! which satisfies the scheduler boundary's ordering guarantee by
//! construction.
//!
//! Production deployments backed by a real queue replace this with their own
//! `RetryScheduler` implementation; the executor only sees the trait.

use std::sync::Arc;
use tokio::sync::mpsc;

use async_trait::async_trait;

use super::registry::RetryJobRegistry;
use super::{BeforeHook, RetryJob, RetryScheduler, ScheduleError};

struct SubmittedJob {
    job: RetryJob,
    before_hook: BeforeHook,
}

/// Fire-and-forget scheduler executing jobs on a background tokio task.
pub struct InProcessScheduler {
    registry: Arc<RetryJobRegistry>,
    sender: mpsc::UnboundedSender<SubmittedJob>,
}

impl InProcessScheduler {
    /// Create a scheduler and spawn its dispatch loop.
    pub fn new(registry: Arc<RetryJobRegistry>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(dispatch_loop(receiver, Arc::clone(&registry)));
        Self { registry, sender }
    }

    /// The registry this scheduler resolves handlers from.
    pub fn registry(&self) -> &Arc<RetryJobRegistry> {
        &self.registry
    }
}

#[async_trait]
impl RetryScheduler for InProcessScheduler {
    async fn submit(&self, job: RetryJob, before_hook: BeforeHook) -> Result<(), ScheduleError> {
        // Fail fast at submission when nothing can execute the job
        if self.registry.resolve(&job.job_type).await.is_none() {
            return Err(ScheduleError::UnknownJobType {
                job_type: job.job_type.to_string(),
            });
        }

        tracing::debug!(
            job_id = %job.job_id,
            job_type = %job.job_type,
            checker_id = %job.checker_id,
            "Submitting deferred retry job"
        );

        let job_id = job.job_id;
        self.sender
            .send(SubmittedJob { job, before_hook })
            .map_err(|_| ScheduleError::SchedulerUnavailable { job_id })
    }
}

async fn dispatch_loop(
    mut receiver: mpsc::UnboundedReceiver<SubmittedJob>,
    registry: Arc<RetryJobRegistry>,
) {
    while let Some(SubmittedJob { job, before_hook }) = receiver.recv().await {
        // Accounting precedes execution: a retry that cannot be recorded
        // must not run.
        if let Err(error) = (before_hook)().await {
            tracing::error!(
                job_id = %job.job_id,
                checker_id = %job.checker_id,
                error = %error,
                "Before-hook failed, skipping retry job"
            );
            continue;
        }

        match registry.resolve(&job.job_type).await {
            Some(handler) => {
                if let Err(error) = handler.execute(&job.checker_id).await {
                    tracing::warn!(
                        job_id = %job.job_id,
                        checker_id = %job.checker_id,
                        handler = handler.handler_name(),
                        error = %error,
                        "Deferred retry job failed"
                    );
                }
            }
            None => {
                // Handler was deregistered between submit and dispatch
                tracing::error!(
                    job_id = %job.job_id,
                    job_type = %job.job_type,
                    "No handler registered for retry job"
                );
            }
        }
    }
}
