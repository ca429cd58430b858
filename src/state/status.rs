use serde::{Deserialize, Serialize};
use std::fmt;

/// Pass/fail status of one checker.
///
/// ## Unknown Variant
///
/// `Unknown` means no state record exists yet: the checker has never been
/// run (or its record was never created). This is explicit "we don't know",
/// not "healthy"; consumers should handle it rather than treating it as
/// `Passing`. For retry-allowance purposes only, a checker with no record is
/// treated as currently passing (its first failure opens a retry window
/// instead of failing terminally).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    /// No state record exists for this checker yet
    #[default]
    Unknown,
    /// Last run succeeded, or the checker is mid-retry
    Passing,
    /// Terminal failure: retries exhausted or disallowed
    Failing,
}

impl CheckStatus {
    /// Check if this status was actually evaluated (a record exists)
    pub fn is_evaluated(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    pub fn is_passing(&self) -> bool {
        matches!(self, Self::Passing)
    }

    pub fn is_failing(&self) -> bool {
        matches!(self, Self::Failing)
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Passing => write!(f, "passing"),
            Self::Failing => write!(f, "failing"),
        }
    }
}

impl std::str::FromStr for CheckStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unknown" => Ok(Self::Unknown),
            "passing" => Ok(Self::Passing),
            "failing" => Ok(Self::Failing),
            _ => Err(format!("Invalid check status: {s}")),
        }
    }
}
