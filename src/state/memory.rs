//! # In-Memory State Store
//!
//! DashMap-backed reference implementation of [`CheckerStateStore`].
//!
//! Concurrency discipline: every operation performs its whole
//! read-modify-write under the entry's shard lock, so each transition is
//! atomic per checker identity. Overlapping executor runs against the same
//! identity are last-write-wins at operation granularity; there is no
//! cross-operation compare-and-swap. Different identities only contend at
//! the shard level.

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use async_trait::async_trait;

use super::policy::RetryPolicy;
use super::record::CheckerStateRecord;
use super::status::CheckStatus;
use super::store::{CheckerStateStore, StateStoreError, StateStoreResult};
use crate::checker::{CheckerFailure, CheckerId};
use crate::events::{StateTransition, TransitionPublisher};

/// Thread-safe in-memory state store with transition broadcasting.
#[derive(Debug)]
pub struct InMemoryStateStore {
    records: DashMap<CheckerId, CheckerStateRecord>,
    policy: RetryPolicy,
    publisher: TransitionPublisher,
}

impl InMemoryStateStore {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            records: DashMap::new(),
            policy,
            publisher: TransitionPublisher::default(),
        }
    }

    /// Use an externally owned publisher (shared with other stores or
    /// pre-subscribed notification logic).
    pub fn with_publisher(policy: RetryPolicy, publisher: TransitionPublisher) -> Self {
        Self {
            records: DashMap::new(),
            policy,
            publisher,
        }
    }

    /// The transition publisher backing this store.
    pub fn publisher(&self) -> &TransitionPublisher {
        &self.publisher
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    fn publish_transition(
        &self,
        checker_id: &CheckerId,
        from: CheckStatus,
        to: CheckStatus,
        failure: Option<CheckerFailure>,
    ) {
        self.publisher.publish(StateTransition {
            checker_id: checker_id.clone(),
            from,
            to,
            failure,
            occurred_at: Utc::now(),
        });
    }
}

impl Default for InMemoryStateStore {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

#[async_trait]
impl CheckerStateStore for InMemoryStateStore {
    async fn exists(&self, checker_id: &CheckerId) -> StateStoreResult<bool> {
        Ok(self.records.contains_key(checker_id))
    }

    async fn is_failing(&self, checker_id: &CheckerId) -> StateStoreResult<bool> {
        Ok(self
            .records
            .get(checker_id)
            .map(|r| r.status.is_failing())
            .unwrap_or(false))
    }

    async fn retry_is_allowed(&self, checker_id: &CheckerId) -> StateStoreResult<bool> {
        let now = Utc::now();
        Ok(self
            .policy
            .allows(self.records.get(checker_id).as_deref(), now))
    }

    async fn set_to_passing(&self, checker_id: &CheckerId) -> StateStoreResult<()> {
        let from = match self.records.entry(checker_id.clone()) {
            Entry::Occupied(mut occupied) => {
                let from = occupied.get().status;
                occupied.get_mut().pass();
                from
            }
            Entry::Vacant(vacant) => {
                vacant.insert(CheckerStateRecord::passing(checker_id.clone()));
                CheckStatus::Unknown
            }
        };

        tracing::debug!(checker_id = %checker_id, from = %from, "Checker set to passing");
        self.publish_transition(checker_id, from, CheckStatus::Passing, None);
        Ok(())
    }

    async fn set_to_failed(
        &self,
        checker_id: &CheckerId,
        failure: &CheckerFailure,
    ) -> StateStoreResult<()> {
        let from = match self.records.entry(checker_id.clone()) {
            Entry::Occupied(mut occupied) => {
                let from = occupied.get().status;
                occupied.get_mut().fail(failure.clone());
                from
            }
            Entry::Vacant(vacant) => {
                let mut record = CheckerStateRecord::passing(checker_id.clone());
                record.fail(failure.clone());
                vacant.insert(record);
                CheckStatus::Unknown
            }
        };

        tracing::warn!(
            checker_id = %checker_id,
            from = %from,
            failure = %failure.message,
            "Checker set to failing"
        );
        self.publish_transition(
            checker_id,
            from,
            CheckStatus::Failing,
            Some(failure.clone()),
        );
        Ok(())
    }

    async fn add_failed_timestamp(
        &self,
        checker_id: &CheckerId,
        failure: &CheckerFailure,
    ) -> StateStoreResult<()> {
        let mut entry =
            self.records
                .get_mut(checker_id)
                .ok_or_else(|| StateStoreError::RecordNotFound {
                    checker_id: checker_id.to_string(),
                })?;
        entry.record_failure(failure);

        tracing::debug!(
            checker_id = %checker_id,
            failure_count = entry.failure_timestamps.len(),
            "Appended failure timestamp to failing checker"
        );
        Ok(())
    }

    async fn add_retry_timestamp(&self, checker_id: &CheckerId) -> StateStoreResult<()> {
        let mut entry = self
            .records
            .entry(checker_id.clone())
            .or_insert_with(|| CheckerStateRecord::passing(checker_id.clone()));
        entry.record_retry(Utc::now());

        tracing::debug!(
            checker_id = %checker_id,
            retry_count = entry.retry_timestamps.len(),
            "Recorded retry attempt"
        );
        Ok(())
    }

    async fn get(&self, checker_id: &CheckerId) -> StateStoreResult<Option<CheckerStateRecord>> {
        Ok(self.records.get(checker_id).map(|r| r.value().clone()))
    }
}
