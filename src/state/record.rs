use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::CheckStatus;
use crate::checker::{CheckerFailure, CheckerId};

/// Persisted pass/fail/retry history for one checker identity.
///
/// Invariants maintained by the mutation methods:
/// - a `Failing` record always has at least one failure timestamp (the
///   triggering one);
/// - retry timestamps accumulate only while the current failure episode has
///   not gone terminal; `pass()` closes the episode and clears all history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckerStateRecord {
    pub checker_id: CheckerId,
    pub status: CheckStatus,
    /// Failure captured at the terminal transition
    pub last_failure: Option<CheckerFailure>,
    /// Times a failure was recorded while status stayed Failing
    pub failure_timestamps: Vec<DateTime<Utc>>,
    /// Times a retry was attempted before the failure became terminal
    pub retry_timestamps: Vec<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CheckerStateRecord {
    /// Create a fresh record in Passing status with empty history.
    pub fn passing(checker_id: CheckerId) -> Self {
        let now = Utc::now();
        Self {
            checker_id,
            status: CheckStatus::Passing,
            last_failure: None,
            failure_timestamps: Vec::new(),
            retry_timestamps: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Reset to Passing, clearing failure and retry history.
    pub fn pass(&mut self) {
        self.status = CheckStatus::Passing;
        self.last_failure = None;
        self.failure_timestamps.clear();
        self.retry_timestamps.clear();
        self.updated_at = Utc::now();
    }

    /// Transition to Failing with the triggering failure.
    pub fn fail(&mut self, failure: CheckerFailure) {
        self.status = CheckStatus::Failing;
        self.failure_timestamps.push(failure.failed_at);
        self.last_failure = Some(failure);
        self.updated_at = Utc::now();
    }

    /// Append a failure timestamp while already Failing (persistent outage
    /// evidence, status unchanged).
    pub fn record_failure(&mut self, failure: &CheckerFailure) {
        self.failure_timestamps.push(failure.failed_at);
        self.updated_at = Utc::now();
    }

    /// Append a retry timestamp for the current failure episode.
    pub fn record_retry(&mut self, at: DateTime<Utc>) {
        self.retry_timestamps.push(at);
        self.updated_at = Utc::now();
    }

    /// Most recent retry attempt, if any.
    pub fn last_retry_at(&self) -> Option<DateTime<Utc>> {
        self.retry_timestamps.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_record_is_passing_with_empty_history() {
        let record = CheckerStateRecord::passing(CheckerId::new("db"));
        assert_eq!(record.status, CheckStatus::Passing);
        assert!(record.last_failure.is_none());
        assert!(record.failure_timestamps.is_empty());
        assert!(record.retry_timestamps.is_empty());
    }

    #[test]
    fn test_fail_records_triggering_timestamp() {
        let mut record = CheckerStateRecord::passing(CheckerId::new("db"));
        record.fail(CheckerFailure::new("down"));
        assert_eq!(record.status, CheckStatus::Failing);
        assert_eq!(record.failure_timestamps.len(), 1);
        assert_eq!(record.last_failure.as_ref().unwrap().message, "down");
    }

    #[test]
    fn test_pass_clears_history() {
        let mut record = CheckerStateRecord::passing(CheckerId::new("db"));
        record.record_retry(Utc::now());
        record.fail(CheckerFailure::new("down"));
        record.pass();
        assert_eq!(record.status, CheckStatus::Passing);
        assert!(record.last_failure.is_none());
        assert!(record.failure_timestamps.is_empty());
        assert!(record.retry_timestamps.is_empty());
    }

    #[test]
    fn test_record_failure_keeps_status() {
        let mut record = CheckerStateRecord::passing(CheckerId::new("db"));
        record.fail(CheckerFailure::new("down"));
        record.record_failure(&CheckerFailure::new("still down"));
        assert_eq!(record.status, CheckStatus::Failing);
        assert_eq!(record.failure_timestamps.len(), 2);
        // last_failure stays the triggering one
        assert_eq!(record.last_failure.as_ref().unwrap().message, "down");
    }
}
