use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use crate::checker::{CheckerFailure, CheckerId};
use crate::state::CheckStatus;

/// A pass/fail transition applied to a checker's state.
///
/// Emitted once per `set_to_failed` / `set_to_passing` call and never for
/// the append-timestamp path, so subscribers see exactly one initial-failure
/// signal per outage episode. `from` lets subscribers distinguish a recovery
/// (Failing → Passing) from a routine reset (Passing → Passing).
#[derive(Debug, Clone)]
pub struct StateTransition {
    pub checker_id: CheckerId,
    pub from: CheckStatus,
    pub to: CheckStatus,
    /// Present on transitions into Failing
    pub failure: Option<CheckerFailure>,
    pub occurred_at: DateTime<Utc>,
}

/// Broadcast publisher for checker state transitions.
///
/// The notification boundary: alerting logic subscribes here and decides
/// what to render and deliver. Publishing with no subscribers is fine; the
/// core does not care whether anyone is listening.
#[derive(Debug, Clone)]
pub struct TransitionPublisher {
    sender: broadcast::Sender<StateTransition>,
}

impl TransitionPublisher {
    /// Create a new publisher with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a transition. Lagging or absent subscribers never fail the
    /// state mutation that triggered the event.
    pub fn publish(&self, transition: StateTransition) {
        if let Err(broadcast::error::SendError(dropped)) = self.sender.send(transition) {
            tracing::debug!(
                checker_id = %dropped.checker_id,
                to = %dropped.to,
                "No transition subscribers, event dropped"
            );
        }
    }

    /// Subscribe to transitions
    pub fn subscribe(&self) -> broadcast::Receiver<StateTransition> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for TransitionPublisher {
    fn default() -> Self {
        Self::new(1000)
    }
}
