//! # Check Executor
//!
//! The execution/retry state machine. One executor instance runs one checker
//! exactly once, interprets the outcome, consults the state store's retry
//! policy, and applies the single correct transition:
//!
//! ```text
//! handle()
//!   → checker.run()
//!       success ──────────────→ store.set_to_passing()        (reported passing)
//!       CheckError::Failed
//!           retry_is_allowed? ─ yes → retry path              (reported passing)
//!                             └ no  → failure path            (reported failing)
//!       CheckError::Unexpected ───→ propagates, no transition
//! ```
//!
//! Retry path: a missing record is first initialized to Passing so the very
//! first failure opens a retry window instead of failing terminally. A
//! checker that declines deferred retry gets one retry timestamp recorded
//! synchronously; a checker that names a job type gets a [`RetryJob`]
//! submitted with a before-hook that records the timestamp when the job
//! later runs. The executor never waits for the retry.
//!
//! Failure path: an already-Failing record gets a failure timestamp
//! appended (accumulating outage evidence, no duplicate initial-alert
//! signal); otherwise the record transitions to Failing with the triggering
//! failure captured.
//!
//! A checker mid-retry reports as passing, not failing, so alerting stays
//! quiet while retries are still permitted.

use std::sync::Arc;

use crate::checker::{CheckError, Checker, CheckerFailure};
use crate::scheduler::{BeforeHook, RetryJob, RetryScheduler, ScheduleError};
use crate::state::{CheckerStateStore, StateStoreError};

/// Errors surfacing from one executor run. The designated checker failure
/// is never among them; it drives state transitions instead.
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    #[error("State store error: {0}")]
    Store(#[from] StateStoreError),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] ScheduleError),

    #[error("Unexpected checker error: {0}")]
    Unexpected(#[source] anyhow::Error),
}

pub type ExecutorResult<T> = Result<T, ExecutorError>;

/// Runs exactly one checker to completion and applies its state transition.
///
/// The run is memoized: `passes()` and `fails()` invoke the checker at most
/// once per instance and replay the outcome afterwards.
pub struct CheckExecutor {
    checker: Arc<dyn Checker>,
    store: Arc<dyn CheckerStateStore>,
    scheduler: Arc<dyn RetryScheduler>,
    outcome: Option<bool>,
    failure: Option<CheckerFailure>,
}

impl CheckExecutor {
    pub fn new(
        checker: Arc<dyn Checker>,
        store: Arc<dyn CheckerStateStore>,
        scheduler: Arc<dyn RetryScheduler>,
    ) -> Self {
        Self {
            checker,
            store,
            scheduler,
            outcome: None,
            failure: None,
        }
    }

    /// True iff the checker succeeded or is mid-allowed-retry (not yet
    /// terminally failed). Runs the checker on first call only.
    pub async fn passes(&mut self) -> ExecutorResult<bool> {
        match self.outcome {
            Some(outcome) => Ok(outcome),
            None => {
                let outcome = self.handle().await?;
                self.outcome = Some(outcome);
                Ok(outcome)
            }
        }
    }

    /// Logical negation of [`passes`](Self::passes).
    pub async fn fails(&mut self) -> ExecutorResult<bool> {
        Ok(!self.passes().await?)
    }

    /// The terminal failure captured during this run, if any.
    pub fn failure(&self) -> Option<&CheckerFailure> {
        self.failure.as_ref()
    }

    /// Run the checker once and apply the correct transition. Returns the
    /// pass/fail outcome to memoize.
    async fn handle(&mut self) -> ExecutorResult<bool> {
        let checker_id = self.checker.id();

        match self.checker.run().await {
            Ok(()) => {
                tracing::debug!(checker_id = %checker_id, "Checker passed");
                self.store.set_to_passing(&checker_id).await?;
                Ok(true)
            }
            Err(CheckError::Failed(failure)) => {
                if self.store.retry_is_allowed(&checker_id).await? {
                    tracing::info!(
                        checker_id = %checker_id,
                        failure = %failure.message,
                        "Checker failed, retry allowed"
                    );
                    self.handle_allowed_retry().await?;
                    Ok(true)
                } else {
                    tracing::warn!(
                        checker_id = %checker_id,
                        failure = %failure.message,
                        "Checker failed terminally"
                    );
                    self.handle_failed_checker(&failure).await?;
                    self.failure = Some(failure);
                    Ok(false)
                }
            }
            // Not ours to catch: no transition, no memoization
            Err(CheckError::Unexpected(error)) => Err(ExecutorError::Unexpected(error)),
        }
    }

    /// Retry path: account the attempt, synchronously or via a deferred job.
    async fn handle_allowed_retry(&self) -> ExecutorResult<()> {
        let checker_id = self.checker.id();

        // First failure of a checker with no record: open the retry window
        // from a Passing baseline.
        if !self.store.exists(&checker_id).await? {
            self.store.set_to_passing(&checker_id).await?;
        }

        match self.checker.retry_job_type() {
            None => {
                // Synchronous accounting; the external cadence re-runs the
                // checker on its next tick.
                self.store.add_retry_timestamp(&checker_id).await?;
            }
            Some(job_type) => {
                let job = RetryJob::new(job_type, checker_id.clone());
                self.checker.attach_retry_job(&job);

                let store = Arc::clone(&self.store);
                let hook_id = checker_id.clone();
                let before_hook: BeforeHook = Box::new(move || {
                    Box::pin(async move { store.add_retry_timestamp(&hook_id).await })
                });

                self.scheduler.submit(job, before_hook).await?;
            }
        }

        Ok(())
    }

    /// Failure path: initial Failing transition, or evidence accumulation
    /// when already failing.
    async fn handle_failed_checker(&self, failure: &CheckerFailure) -> ExecutorResult<()> {
        let checker_id = self.checker.id();

        if self.store.exists(&checker_id).await? && self.store.is_failing(&checker_id).await? {
            self.store
                .add_failed_timestamp(&checker_id, failure)
                .await?;
        } else {
            self.store.set_to_failed(&checker_id, failure).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::CheckerId;
    use crate::scheduler::{InProcessScheduler, JobType, RetryJobRegistry};
    use crate::state::{CheckStatus, InMemoryStateStore, RetryPolicy};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedChecker {
        id: CheckerId,
        fail_with: Option<String>,
        job_type: Option<JobType>,
        runs: AtomicUsize,
    }

    impl ScriptedChecker {
        fn passing(id: &str) -> Self {
            Self {
                id: CheckerId::new(id),
                fail_with: None,
                job_type: None,
                runs: AtomicUsize::new(0),
            }
        }

        fn failing(id: &str, message: &str) -> Self {
            Self {
                id: CheckerId::new(id),
                fail_with: Some(message.to_string()),
                job_type: None,
                runs: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Checker for ScriptedChecker {
        fn id(&self) -> CheckerId {
            self.id.clone()
        }

        async fn run(&self) -> Result<(), CheckError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            match &self.fail_with {
                Some(message) => Err(CheckerFailure::new(message.clone()).into()),
                None => Ok(()),
            }
        }

        fn retry_job_type(&self) -> Option<JobType> {
            self.job_type.clone()
        }
    }

    fn scheduler() -> Arc<InProcessScheduler> {
        Arc::new(InProcessScheduler::new(Arc::new(RetryJobRegistry::new())))
    }

    fn store(policy: RetryPolicy) -> Arc<InMemoryStateStore> {
        Arc::new(InMemoryStateStore::new(policy))
    }

    #[tokio::test]
    async fn test_success_sets_passing_and_clears_history() {
        let store = store(RetryPolicy::default());
        let id = CheckerId::new("db");

        // Seed prior failure/retry history
        store.add_retry_timestamp(&id).await.unwrap();
        store
            .set_to_failed(&id, &CheckerFailure::new("was down"))
            .await
            .unwrap();

        let checker = Arc::new(ScriptedChecker::passing("db"));
        let mut executor = CheckExecutor::new(checker, store.clone(), scheduler());

        assert!(executor.passes().await.unwrap());
        assert!(executor.failure().is_none());

        let record = store.get(&id).await.unwrap().unwrap();
        assert_eq!(record.status, CheckStatus::Passing);
        assert!(record.failure_timestamps.is_empty());
        assert!(record.retry_timestamps.is_empty());
    }

    #[tokio::test]
    async fn test_terminal_failure_with_no_prior_record() {
        let store = store(RetryPolicy::Never);
        let checker = Arc::new(ScriptedChecker::failing("db", "connection refused"));
        let mut executor = CheckExecutor::new(checker, store.clone(), scheduler());

        assert!(executor.fails().await.unwrap());
        assert_eq!(executor.failure().unwrap().message, "connection refused");

        let record = store.get(&CheckerId::new("db")).await.unwrap().unwrap();
        assert_eq!(record.status, CheckStatus::Failing);
        assert_eq!(record.failure_timestamps.len(), 1);
    }

    #[tokio::test]
    async fn test_repeat_failure_appends_timestamp_without_new_transition() {
        let store = store(RetryPolicy::Never);
        let id = CheckerId::new("db");
        store
            .set_to_failed(&id, &CheckerFailure::new("down"))
            .await
            .unwrap();

        let mut rx = store.publisher().subscribe();

        let checker = Arc::new(ScriptedChecker::failing("db", "still down"));
        let mut executor = CheckExecutor::new(checker, store.clone(), scheduler());
        assert!(executor.fails().await.unwrap());

        let record = store.get(&id).await.unwrap().unwrap();
        assert_eq!(record.status, CheckStatus::Failing);
        assert_eq!(record.failure_timestamps.len(), 2);
        // Triggering failure is preserved
        assert_eq!(record.last_failure.unwrap().message, "down");
        // No transition event was emitted for the append
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_synchronous_retry_accounting() {
        let store = store(RetryPolicy::default());
        let checker = Arc::new(ScriptedChecker::failing("db", "flaky"));
        let mut executor = CheckExecutor::new(checker, store.clone(), scheduler());

        // Mid-retry reports passing, not failing
        assert!(executor.passes().await.unwrap());
        assert!(executor.failure().is_none());

        let record = store.get(&CheckerId::new("db")).await.unwrap().unwrap();
        assert_eq!(record.status, CheckStatus::Passing);
        assert_eq!(record.retry_timestamps.len(), 1);
        assert!(record.failure_timestamps.is_empty());
    }

    #[tokio::test]
    async fn test_passes_is_memoized() {
        let store = store(RetryPolicy::default());
        let checker = Arc::new(ScriptedChecker::passing("db"));
        let mut executor = CheckExecutor::new(Arc::clone(&checker) as Arc<dyn Checker>, store, scheduler());

        assert!(executor.passes().await.unwrap());
        assert!(executor.passes().await.unwrap());
        assert!(!executor.fails().await.unwrap());
        assert_eq!(checker.runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unexpected_error_propagates_without_transition() {
        struct BrokenChecker;

        #[async_trait]
        impl Checker for BrokenChecker {
            fn id(&self) -> CheckerId {
                CheckerId::new("broken")
            }

            async fn run(&self) -> Result<(), CheckError> {
                Err(CheckError::Unexpected(anyhow::anyhow!("config missing")))
            }
        }

        let store = store(RetryPolicy::default());
        let mut executor = CheckExecutor::new(Arc::new(BrokenChecker), store.clone(), scheduler());

        let error = executor.passes().await.unwrap_err();
        assert!(matches!(error, ExecutorError::Unexpected(_)));
        // No record was created
        assert!(!store.exists(&CheckerId::new("broken")).await.unwrap());
    }

    #[tokio::test]
    async fn test_retry_exhaustion_leads_to_terminal_failure() {
        let store = store(RetryPolicy::MaxAttemptsWithinWindow {
            max_attempts: 2,
            window_secs: 300,
        });

        for _ in 0..2 {
            let checker = Arc::new(ScriptedChecker::failing("db", "flaky"));
            let mut executor =
                CheckExecutor::new(checker, store.clone(), scheduler());
            assert!(executor.passes().await.unwrap());
        }

        // Third failure: retries exhausted
        let checker = Arc::new(ScriptedChecker::failing("db", "flaky"));
        let mut executor = CheckExecutor::new(checker, store.clone(), scheduler());
        assert!(executor.fails().await.unwrap());

        let record = store.get(&CheckerId::new("db")).await.unwrap().unwrap();
        assert_eq!(record.status, CheckStatus::Failing);
        assert_eq!(record.retry_timestamps.len(), 2);
        assert_eq!(record.failure_timestamps.len(), 1);
    }
}
