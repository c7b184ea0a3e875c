/// Relay events and the sinks that record them
///
/// Business logic never calls `tracing` directly for outcome reporting. It
/// emits a [`RelayEvent`] into an [`EventSink`], so tests can assert on what
/// happened without a logging backend:
/// - [`TracingSink`]: production sink, one structured `tracing` event each
/// - [`RecordingSink`]: keeps events in memory for assertions
///
/// # Example
///
/// ```
/// use shardrelay_shared::events::{EventSink, RecordingSink, RelayEvent};
/// use shardrelay_shared::routing::ShardTarget;
///
/// let sink = RecordingSink::new();
/// sink.record(RelayEvent::Published { target: ShardTarget::Master1, receivers: 2 });
/// assert_eq!(sink.events().len(), 1);
/// ```

pub mod sink;

use crate::routing::ShardTarget;
use serde::Serialize;
use std::fmt;

pub use sink::{EventSink, RecordingSink, TracingSink};

/// Something worth reporting that happened in the relay
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RelayEvent {
    /// Message delivered to the target's channel
    Published { target: ShardTarget, receivers: i64 },

    /// First attempt hit a connection failure, retry scheduled
    PublishRetrying {
        target: ShardTarget,
        backoff_ms: u64,
        error: String,
    },

    /// Retries exhausted
    NodeUnavailable { target: ShardTarget, error: String },

    /// Non-retryable publish failure
    PublishFailed { target: ShardTarget, error: String },

    /// Listener subscription established
    Subscribed { channel: String, node: String },

    /// Listener subscription dropped, will reconnect
    SubscriptionLost { channel: String, error: String },

    /// Listener received a message
    MessageReceived { channel: String, body: String },

    /// Listener could not decode a message
    MessageDropped { channel: String, error: String },
}

impl RelayEvent {
    /// Short event name, e.g. `publish_retrying`
    pub fn name(&self) -> &'static str {
        match self {
            RelayEvent::Published { .. } => "published",
            RelayEvent::PublishRetrying { .. } => "publish_retrying",
            RelayEvent::NodeUnavailable { .. } => "node_unavailable",
            RelayEvent::PublishFailed { .. } => "publish_failed",
            RelayEvent::Subscribed { .. } => "subscribed",
            RelayEvent::SubscriptionLost { .. } => "subscription_lost",
            RelayEvent::MessageReceived { .. } => "message_received",
            RelayEvent::MessageDropped { .. } => "message_dropped",
        }
    }
}

impl fmt::Display for RelayEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
