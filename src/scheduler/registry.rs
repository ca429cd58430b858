//! # Retry Job Registry
//!
//! Maps a [`JobType`] token to the handler that executes jobs of that type.
//! This is the factory seam: a job envelope names its type, the registry
//! resolves the work, and the handler receives the checker identity. No
//! dynamic type instantiation by name.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use async_trait::async_trait;

use super::JobType;
use crate::checker::{CheckError, CheckerId};

/// Work executed for one deferred-retry job.
///
/// In the usual wiring the handler re-runs the checker through a fresh
/// executor, so a retried failure feeds back into the state machine.
#[async_trait]
pub trait RetryJobHandler: Send + Sync {
    async fn execute(&self, checker_id: &CheckerId) -> Result<(), CheckError>;

    /// Handler name for logging
    fn handler_name(&self) -> &'static str;
}

/// Thread-safe registry of job-type handlers.
#[derive(Default)]
pub struct RetryJobRegistry {
    handlers: RwLock<HashMap<JobType, Arc<dyn RetryJobHandler>>>,
}

impl RetryJobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a job type, replacing any previous one.
    pub async fn register(&self, job_type: JobType, handler: Arc<dyn RetryJobHandler>) {
        tracing::info!(
            job_type = %job_type,
            handler = handler.handler_name(),
            "Registered retry job handler"
        );
        self.handlers.write().await.insert(job_type, handler);
    }

    /// Resolve the handler for a job type.
    pub async fn resolve(&self, job_type: &JobType) -> Option<Arc<dyn RetryJobHandler>> {
        self.handlers.read().await.get(job_type).cloned()
    }

    /// Number of registered job types.
    pub async fn len(&self) -> usize {
        self.handlers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.handlers.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopHandler;

    #[async_trait]
    impl RetryJobHandler for NoopHandler {
        async fn execute(&self, _checker_id: &CheckerId) -> Result<(), CheckError> {
            Ok(())
        }

        fn handler_name(&self) -> &'static str {
            "noop"
        }
    }

    #[tokio::test]
    async fn test_register_and_resolve() {
        let registry = RetryJobRegistry::new();
        assert!(registry.is_empty().await);

        registry
            .register(JobType::new("deferred_check"), Arc::new(NoopHandler))
            .await;

        assert_eq!(registry.len().await, 1);
        let handler = registry.resolve(&JobType::new("deferred_check")).await;
        assert!(handler.is_some());
        assert!(registry.resolve(&JobType::new("other")).await.is_none());
    }
}
