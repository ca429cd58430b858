//! # Retry Policy
//!
//! The single branch point deciding whether a checker failure is transient
//! (retry) or terminal (fail). `allows` is a pure function of the stored
//! record and wall-clock time (deterministic given the same inputs), so the
//! store can answer `retry_is_allowed` without any side effects.
//!
//! The policy is a configuration detail owned by the state layer; the
//! executor only sees the boolean.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::record::CheckerStateRecord;

/// When repeated failures are still treated as transient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RetryPolicy {
    /// Every failure is terminal
    Never,
    /// Retry up to `max_attempts` times within a sliding window
    MaxAttemptsWithinWindow { max_attempts: u32, window_secs: u32 },
    /// Retry at most once per interval
    OncePerInterval { interval_secs: u32 },
}

impl RetryPolicy {
    /// Decide whether another retry is allowed right now.
    ///
    /// `record` is `None` when no state record exists yet; a checker with no
    /// history is treated as currently passing, so its first failure opens a
    /// retry window. A record already in terminal Failing status closes the
    /// episode: no policy allows further retries until a pass resets it.
    pub fn allows(&self, record: Option<&CheckerStateRecord>, now: DateTime<Utc>) -> bool {
        if let Some(record) = record {
            if record.status.is_failing() {
                return false;
            }
        }

        match self {
            Self::Never => false,
            Self::MaxAttemptsWithinWindow {
                max_attempts,
                window_secs,
            } => {
                let window_start = now - Duration::seconds(i64::from(*window_secs));
                let attempts_in_window = record
                    .map(|r| {
                        r.retry_timestamps
                            .iter()
                            .filter(|ts| **ts > window_start)
                            .count()
                    })
                    .unwrap_or(0);
                attempts_in_window < *max_attempts as usize
            }
            Self::OncePerInterval { interval_secs } => match record.and_then(|r| r.last_retry_at())
            {
                Some(last) => now - last >= Duration::seconds(i64::from(*interval_secs)),
                None => true,
            },
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::MaxAttemptsWithinWindow {
            max_attempts: 3,
            window_secs: 300,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::{CheckerFailure, CheckerId};

    fn record_with_retries(offsets_secs: &[i64], now: DateTime<Utc>) -> CheckerStateRecord {
        let mut record = CheckerStateRecord::passing(CheckerId::new("db"));
        for offset in offsets_secs {
            record.record_retry(now - Duration::seconds(*offset));
        }
        record
    }

    #[test]
    fn test_never_policy_denies_everything() {
        let now = Utc::now();
        assert!(!RetryPolicy::Never.allows(None, now));
        let record = record_with_retries(&[], now);
        assert!(!RetryPolicy::Never.allows(Some(&record), now));
    }

    #[test]
    fn test_no_record_is_allowed_by_window_policy() {
        let policy = RetryPolicy::MaxAttemptsWithinWindow {
            max_attempts: 3,
            window_secs: 300,
        };
        assert!(policy.allows(None, Utc::now()));
    }

    #[test]
    fn test_window_policy_counts_only_recent_retries() {
        let now = Utc::now();
        let policy = RetryPolicy::MaxAttemptsWithinWindow {
            max_attempts: 2,
            window_secs: 300,
        };

        // Two retries inside the window: exhausted
        let record = record_with_retries(&[10, 20], now);
        assert!(!policy.allows(Some(&record), now));

        // One inside, one well outside: still allowed
        let record = record_with_retries(&[10, 400], now);
        assert!(policy.allows(Some(&record), now));
    }

    #[test]
    fn test_once_per_interval_policy() {
        let now = Utc::now();
        let policy = RetryPolicy::OncePerInterval { interval_secs: 60 };

        assert!(policy.allows(None, now));

        let record = record_with_retries(&[30], now);
        assert!(!policy.allows(Some(&record), now));

        let record = record_with_retries(&[90], now);
        assert!(policy.allows(Some(&record), now));
    }

    #[test]
    fn test_failing_record_closes_the_episode() {
        let now = Utc::now();
        let mut record = record_with_retries(&[], now);
        record.fail(CheckerFailure::new("down"));

        let generous = RetryPolicy::MaxAttemptsWithinWindow {
            max_attempts: 100,
            window_secs: 3600,
        };
        assert!(!generous.allows(Some(&record), now));
    }
}
