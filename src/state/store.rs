//! # Checker State Store
//!
//! Storage interface for per-checker state records. Every operation is a
//! single atomic transition for one checker identity; no cross-checker
//! coordination exists at this layer. The physical persistence mechanism
//! (file, database, cache) is the implementor's business.
//!
//! The executor assumes store operations either succeed or raise; there is
//! no partial-transition rollback. Storage errors are never handled by the
//! executor; they propagate to the caller.

use async_trait::async_trait;

use super::record::CheckerStateRecord;
use crate::checker::{CheckerFailure, CheckerId};

/// Errors raised by state store operations.
#[derive(Debug, thiserror::Error)]
pub enum StateStoreError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No state record exists for checker '{checker_id}'")]
    RecordNotFound { checker_id: String },
}

pub type StateStoreResult<T> = Result<T, StateStoreError>;

/// Per-checker state persistence consumed by the executor.
#[async_trait]
pub trait CheckerStateStore: Send + Sync {
    /// Whether a state record exists for this checker.
    async fn exists(&self, checker_id: &CheckerId) -> StateStoreResult<bool>;

    /// Whether the checker is in terminal Failing status. False when no
    /// record exists.
    async fn is_failing(&self, checker_id: &CheckerId) -> StateStoreResult<bool>;

    /// Consult the retry policy against the stored history and current
    /// wall-clock time. Deterministic given the same stored state and time.
    async fn retry_is_allowed(&self, checker_id: &CheckerId) -> StateStoreResult<bool>;

    /// Reset the checker to Passing, clearing failure and retry history.
    /// Creates the record if none exists.
    async fn set_to_passing(&self, checker_id: &CheckerId) -> StateStoreResult<()>;

    /// Transition to Failing, storing the triggering failure. Creates the
    /// record if none exists.
    async fn set_to_failed(
        &self,
        checker_id: &CheckerId,
        failure: &CheckerFailure,
    ) -> StateStoreResult<()>;

    /// Append a failure timestamp to an already-Failing record without
    /// changing status.
    async fn add_failed_timestamp(
        &self,
        checker_id: &CheckerId,
        failure: &CheckerFailure,
    ) -> StateStoreResult<()>;

    /// Append a retry timestamp for the current failure episode. Creates the
    /// record (as Passing) if none exists.
    async fn add_retry_timestamp(&self, checker_id: &CheckerId) -> StateStoreResult<()>;

    /// Fetch the full record, if one exists.
    async fn get(&self, checker_id: &CheckerId) -> StateStoreResult<Option<CheckerStateRecord>>;
}
