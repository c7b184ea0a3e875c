/// Shard-pinned publisher for deregistration events
///
/// Publishes a message on the hashtag-qualified channel of a [`ShardTarget`]
/// and applies a bounded retry on connection failures.
///
/// # Retry Behavior
///
/// ```text
/// attempt 1 ──ok──────────────────────────────► Published
///     │
///     ├─connection failure──► sleep(backoff) ──► attempt 2 ──ok──► Published
///     │                                              └─any error──► NodeUnavailable
///     └─other error─────────────────────────────────────────────► PublishFailed
/// ```
///
/// With the default [`RetryPolicy`] (one retry, 1000 ms backoff) and a 5 s
/// command timeout the worst case before a final failure is about 11 s.
///
/// # Example
///
/// ```no_run
/// use shardrelay_shared::events::TracingSink;
/// use shardrelay_shared::publisher::{Publisher, RetryPolicy};
/// use shardrelay_shared::redis::MockCluster;
/// use shardrelay_shared::routing::ShardTarget;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let publisher = Publisher::new(
///     Arc::new(MockCluster::new()),
///     Arc::new(TracingSink),
///     RetryPolicy::default(),
/// );
///
/// publisher.publish(ShardTarget::Master1, "user:42 logged out").await?;
/// # Ok(())
/// # }
/// ```

use crate::events::{EventSink, RelayEvent};
use crate::redis::ops::{ClusterError, ClusterOps};
use crate::routing::ShardTarget;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Default number of retries after a connection failure
pub const DEFAULT_MAX_RETRIES: u32 = 1;

/// Default pause before a retry
pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(1000);

/// Publish errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// Message body was empty
    #[error("message must not be empty")]
    EmptyMessage,

    /// Connection failures persisted through every retry
    #[error("{target} node is temporarily unavailable")]
    NodeUnavailable { target: ShardTarget },

    /// Non-retryable failure
    #[error("Failed to publish message to {target}: {cause}")]
    PublishFailed { target: ShardTarget, cause: String },
}

/// Successful publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishAck {
    /// Target the message went to
    pub target: ShardTarget,

    /// Channel used
    pub channel: &'static str,

    /// Subscribers that received the message
    pub receivers: i64,

    /// Total attempts made, 1 when no retry was needed
    pub attempts: u32,
}

/// Retry settings for connection failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Fixed pause before each retry
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: DEFAULT_BACKOFF,
        }
    }
}

impl RetryPolicy {
    /// Policy with the default retry count and a custom backoff
    pub fn with_backoff(backoff: Duration) -> Self {
        Self {
            backoff,
            ..Self::default()
        }
    }
}

/// Publisher bound to the shared cluster handle
#[derive(Clone)]
pub struct Publisher {
    cluster: Arc<dyn ClusterOps>,
    sink: Arc<dyn EventSink>,
    retry: RetryPolicy,
}

impl Publisher {
    pub fn new(cluster: Arc<dyn ClusterOps>, sink: Arc<dyn EventSink>, retry: RetryPolicy) -> Self {
        Self {
            cluster,
            sink,
            retry,
        }
    }

    /// Publishes `message` to the shard pinned by `target`
    ///
    /// # Errors
    ///
    /// - [`PublishError::EmptyMessage`] for an empty body, nothing is sent
    /// - [`PublishError::NodeUnavailable`] when the retry also fails
    /// - [`PublishError::PublishFailed`] for a non-connection error on the
    ///   first attempt
    pub async fn publish(&self, target: ShardTarget, message: &str) -> Result<PublishAck, PublishError> {
        if message.is_empty() {
            return Err(PublishError::EmptyMessage);
        }

        let channel = target.channel();
        let mut attempts = 0u32;

        loop {
            attempts += 1;

            let err = match self.cluster.publish(channel, message).await {
                Ok(receivers) => {
                    self.sink.record(RelayEvent::Published { target, receivers });
                    return Ok(PublishAck {
                        target,
                        channel,
                        receivers,
                        attempts,
                    });
                }
                Err(err) => err,
            };

            if attempts == 1 && !err.is_connection_failure() {
                self.sink.record(RelayEvent::PublishFailed {
                    target,
                    error: err.to_string(),
                });
                return Err(PublishError::PublishFailed {
                    target,
                    cause: err.to_string(),
                });
            }

            // Once retrying, any failure counts against the node
            if attempts > self.retry.max_retries || !err.is_connection_failure() {
                return Err(self.node_unavailable(target, &err));
            }

            self.sink.record(RelayEvent::PublishRetrying {
                target,
                backoff_ms: self.retry.backoff.as_millis() as u64,
                error: err.to_string(),
            });
            tokio::time::sleep(self.retry.backoff).await;
        }
    }

    fn node_unavailable(&self, target: ShardTarget, err: &ClusterError) -> PublishError {
        self.sink.record(RelayEvent::NodeUnavailable {
            target,
            error: err.to_string(),
        });
        PublishError::NodeUnavailable { target }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingSink;
    use crate::redis::mock::MockCluster;

    fn publisher(cluster: &Arc<MockCluster>, sink: &Arc<RecordingSink>) -> Publisher {
        Publisher::new(cluster.clone(), sink.clone(), RetryPolicy::default())
    }

    fn refused() -> ClusterError {
        ClusterError::Connection("Connection refused (os error 111)".to_string())
    }

    #[tokio::test]
    async fn test_publish_uses_hashtag_channel() {
        let cluster = Arc::new(MockCluster::new());
        let sink = Arc::new(RecordingSink::new());

        let ack = publisher(&cluster, &sink)
            .publish(ShardTarget::Master1, "user:42 logged out")
            .await
            .unwrap();

        assert_eq!(ack.attempts, 1);
        assert_eq!(ack.channel, "{master1}users:unregister");
        assert_eq!(cluster.publish_attempts(), 1);
        assert_eq!(
            cluster.published(),
            vec![(
                "{master1}users:unregister".to_string(),
                "user:42 logged out".to_string()
            )]
        );
        assert_eq!(sink.names(), vec!["published"]);
    }

    #[tokio::test]
    async fn test_publish_rejects_empty_message() {
        let cluster = Arc::new(MockCluster::new());
        let sink = Arc::new(RecordingSink::new());

        let err = publisher(&cluster, &sink)
            .publish(ShardTarget::Master2, "")
            .await
            .unwrap_err();

        assert_eq!(err, PublishError::EmptyMessage);
        assert_eq!(cluster.publish_attempts(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_connection_failure_is_retried_after_backoff() {
        let cluster = Arc::new(MockCluster::new());
        let sink = Arc::new(RecordingSink::new());
        cluster.fail_next_publish(refused());

        let started = tokio::time::Instant::now();
        let ack = publisher(&cluster, &sink)
            .publish(ShardTarget::Master1, "bye")
            .await
            .unwrap();

        assert!(started.elapsed() >= Duration::from_millis(1000));
        assert_eq!(ack.attempts, 2);
        assert_eq!(cluster.publish_attempts(), 2);
        assert_eq!(cluster.published().len(), 1);
        assert_eq!(sink.names(), vec!["publish_retrying", "published"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_connection_failures_give_node_unavailable() {
        let cluster = Arc::new(MockCluster::new());
        let sink = Arc::new(RecordingSink::new());
        cluster.fail_next_publish(refused());
        cluster.fail_next_publish(refused());
        cluster.fail_next_publish(refused());

        let err = publisher(&cluster, &sink)
            .publish(ShardTarget::Master2, "bye")
            .await
            .unwrap_err();

        assert_eq!(
            err,
            PublishError::NodeUnavailable {
                target: ShardTarget::Master2
            }
        );
        assert_eq!(err.to_string(), "Master2 node is temporarily unavailable");
        // No third attempt
        assert_eq!(cluster.publish_attempts(), 2);
        assert_eq!(sink.names(), vec!["publish_retrying", "node_unavailable"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_counts_as_connection_failure() {
        let cluster = Arc::new(MockCluster::new());
        let sink = Arc::new(RecordingSink::new());
        cluster.fail_next_publish(ClusterError::Timeout("PUBLISH timed out after 5000ms".into()));

        let ack = publisher(&cluster, &sink)
            .publish(ShardTarget::Master1, "bye")
            .await
            .unwrap();
        assert_eq!(ack.attempts, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_connection_error_on_retry_is_node_unavailable() {
        let cluster = Arc::new(MockCluster::new());
        let sink = Arc::new(RecordingSink::new());
        cluster.fail_next_publish(refused());
        cluster.fail_next_publish(ClusterError::Command("LOADING".into()));

        let err = publisher(&cluster, &sink)
            .publish(ShardTarget::Master1, "bye")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            PublishError::NodeUnavailable {
                target: ShardTarget::Master1
            }
        );
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let cluster = Arc::new(MockCluster::new());
        let sink = Arc::new(RecordingSink::new());
        cluster.fail_next_publish(ClusterError::Command("ERR wrong number of arguments".into()));

        let err = publisher(&cluster, &sink)
            .publish(ShardTarget::Master1, "bye")
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Failed to publish message to Master1: ERR wrong number of arguments"
        );
        assert_eq!(cluster.publish_attempts(), 1);
        assert_eq!(sink.names(), vec!["publish_failed"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_targets_do_not_block_each_other() {
        let cluster = Arc::new(MockCluster::new().with_latency(Duration::from_millis(500)));
        let sink = Arc::new(RecordingSink::new());
        let publisher = publisher(&cluster, &sink);

        let started = tokio::time::Instant::now();
        let (first, second) = tokio::join!(
            publisher.publish(ShardTarget::Master1, "a"),
            publisher.publish(ShardTarget::Master2, "b"),
        );

        assert!(first.is_ok());
        assert!(second.is_ok());
        assert!(started.elapsed() < Duration::from_millis(1000));
        assert_eq!(cluster.published().len(), 2);
    }
}
