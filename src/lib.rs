#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Sentinel Core
//!
//! Health-check execution core: runs checkers against external
//! dependencies, tracks each checker's pass/fail history, and applies a
//! retry policy before declaring a definitive failure.
//!
//! ## Architecture
//!
//! The heart of the crate is the [`executor::CheckExecutor`] state machine.
//! Everything a checker probes, how alerts are rendered, how state is
//! physically stored, and what queue executes deferred retries are external
//! collaborators behind narrow traits:
//!
//! ```text
//! CheckExecutor.passes()
//!     → Checker.run()
//!         success → CheckerStateStore.set_to_passing()
//!         failure → retry_is_allowed?
//!             yes → retry accounting (sync, or RetryScheduler.submit)
//!             no  → Failing transition → TransitionPublisher broadcast
//! ```
//!
//! ## Module Organization
//!
//! - [`checker`] - The `Checker` probe trait and designated failure type
//! - [`state`] - Per-checker state records, retry policy, storage interface
//! - [`executor`] - The execution/retry state machine
//! - [`scheduler`] - Deferred-retry job envelope, registry, and scheduler boundary
//! - [`events`] - State transition broadcasting for notification logic
//! - [`config`] - Configuration management
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust
//! use sentinel_core::checker::{CheckError, Checker, CheckerId};
//! use sentinel_core::config::SentinelConfig;
//! use sentinel_core::events::TransitionPublisher;
//! use sentinel_core::executor::CheckExecutor;
//! use sentinel_core::scheduler::{InProcessScheduler, RetryJobRegistry};
//! use sentinel_core::state::InMemoryStateStore;
//! use async_trait::async_trait;
//! use std::sync::Arc;
//!
//! struct DatabaseChecker;
//!
//! #[async_trait]
//! impl Checker for DatabaseChecker {
//!     fn id(&self) -> CheckerId {
//!         CheckerId::new("database")
//!     }
//!
//!     async fn run(&self) -> Result<(), CheckError> {
//!         // probe the dependency here
//!         Ok(())
//!     }
//! }
//!
//! tokio_test::block_on(async {
//!     let config = SentinelConfig::default();
//!     let publisher = TransitionPublisher::new(config.event_channel_capacity);
//!     let store = Arc::new(InMemoryStateStore::with_publisher(
//!         config.retry_policy(),
//!         publisher,
//!     ));
//!     let scheduler = Arc::new(InProcessScheduler::new(Arc::new(RetryJobRegistry::new())));
//!
//!     let mut executor = CheckExecutor::new(Arc::new(DatabaseChecker), store, scheduler);
//!     if executor.fails().await.unwrap() {
//!         println!("terminal failure: {:?}", executor.failure());
//!     }
//! });
//! ```

pub mod checker;
pub mod config;
pub mod error;
pub mod events;
pub mod executor;
pub mod logging;
pub mod scheduler;
pub mod state;

pub use checker::{CheckError, Checker, CheckerFailure, CheckerId};
pub use config::SentinelConfig;
pub use error::{Result, SentinelError};
pub use events::{StateTransition, TransitionPublisher};
pub use executor::{CheckExecutor, ExecutorError};
pub use scheduler::{
    InProcessScheduler, JobType, RetryJob, RetryJobHandler, RetryJobRegistry, RetryScheduler,
};
pub use state::{
    CheckStatus, CheckerStateRecord, CheckerStateStore, InMemoryStateStore, RetryPolicy,
    StateStoreError,
};
