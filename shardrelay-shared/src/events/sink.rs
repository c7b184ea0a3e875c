/// Event sinks
///
/// `TracingSink` picks the level per event: successes at INFO, retries and
/// dropped messages at WARN, terminal failures at ERROR.

use super::RelayEvent;
use std::sync::Mutex;

/// Destination for [`RelayEvent`]s
pub trait EventSink: Send + Sync {
    /// Records one event; must not block
    fn record(&self, event: RelayEvent);
}

/// Sink that forwards every event to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: RelayEvent) {
        match &event {
            RelayEvent::Published { target, receivers } => {
                tracing::info!(%target, receivers, "Successfully published message to {} node", target);
            }
            RelayEvent::PublishRetrying {
                target,
                backoff_ms,
                error,
            } => {
                tracing::warn!(%target, backoff_ms, %error, "{} node connection failed. Retrying...", target);
            }
            RelayEvent::NodeUnavailable { target, error } => {
                tracing::error!(%target, %error, "{} node retry failed", target);
            }
            RelayEvent::PublishFailed { target, error } => {
                tracing::error!(%target, %error, "Failed to publish message to {} node", target);
            }
            RelayEvent::Subscribed { channel, node } => {
                tracing::info!(%channel, %node, "Subscribed to channel");
            }
            RelayEvent::SubscriptionLost { channel, error } => {
                tracing::warn!(%channel, %error, "Subscription lost, reconnecting");
            }
            RelayEvent::MessageReceived { channel, body } => {
                tracing::info!(%channel, %body, "Received message");
            }
            RelayEvent::MessageDropped { channel, error } => {
                tracing::warn!(%channel, %error, "Dropped undecodable message");
            }
        }
    }
}

/// Sink that keeps events in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<RelayEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events in order
    pub fn events(&self) -> Vec<RelayEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Names of recorded events in order
    pub fn names(&self) -> Vec<&'static str> {
        self.events().iter().map(RelayEvent::name).collect()
    }
}

impl EventSink for RecordingSink {
    fn record(&self, event: RelayEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
