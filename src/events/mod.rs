//! Event system foundation: broadcast of checker state transitions to
//! downstream notification logic.

pub mod publisher;

pub use publisher::{StateTransition, TransitionPublisher};
