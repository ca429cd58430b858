//! # Checker State
//!
//! Persisted pass/fail/retry history for each checker identity, and the
//! retry policy that decides whether a failure is transient.
//!
//! ```text
//! Executor transition calls
//!     → CheckerStateStore (atomic per-identity operations)
//!     → CheckerStateRecord mutation
//!     → TransitionPublisher broadcast (set_to_passing / set_to_failed only)
//! ```
//!
//! State records are created lazily on first use and never deleted; a later
//! pass resets a record to Passing and clears its failure/retry history.

pub mod memory;
pub mod policy;
pub mod record;
pub mod status;
pub mod store;

pub use memory::InMemoryStateStore;
pub use policy::RetryPolicy;
pub use record::CheckerStateRecord;
pub use status::CheckStatus;
pub use store::{CheckerStateStore, StateStoreError, StateStoreResult};
