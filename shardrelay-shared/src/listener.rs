/// Background listener for the `users:unregister` channel
///
/// Subscribes on the first reachable seed node and records every delivered
/// message to the [`EventSink`]. It does no processing beyond that.
///
/// # Loop
///
/// ```text
/// ┌──► connect (seed nodes in order) ──► SUBSCRIBE users:unregister
/// │                                          │
/// │                                          ▼
/// │                                  on_message stream ──► MessageReceived
/// │                                          │           └► MessageDropped (bad payload)
/// │                                          ▼
/// └── sleep(reconnect_delay) ◄── stream ended / error
/// ```
///
/// A bad payload never ends the loop. Cancellation stops it at any point.
///
/// # Example
///
/// ```no_run
/// use shardrelay_shared::events::TracingSink;
/// use shardrelay_shared::listener::Listener;
/// use shardrelay_shared::redis::ClusterEndpoints;
/// use std::sync::Arc;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> anyhow::Result<()> {
/// let endpoints = ClusterEndpoints::parse("127.0.0.1:7000")?;
/// let cancel = CancellationToken::new();
///
/// let handle = Listener::new(endpoints, Arc::new(TracingSink)).spawn(cancel.clone());
///
/// cancel.cancel();
/// handle.await?;
/// # Ok(())
/// # }
/// ```

use crate::events::{EventSink, RelayEvent};
use crate::redis::client::{sanitize_url, ClusterEndpoints};
use crate::routing::UNREGISTER_CHANNEL;
use futures::StreamExt;
use redis::aio::PubSub;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Pause between reconnect attempts
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Standing subscription to one channel
pub struct Listener {
    endpoints: ClusterEndpoints,
    channel: String,
    sink: Arc<dyn EventSink>,
    reconnect_delay: Duration,
}

impl Listener {
    /// Listener for [`UNREGISTER_CHANNEL`]
    pub fn new(endpoints: ClusterEndpoints, sink: Arc<dyn EventSink>) -> Self {
        Self {
            endpoints,
            channel: UNREGISTER_CHANNEL.to_string(),
            sink,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }

    /// Overrides the pause between reconnect attempts
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Channel this listener subscribes to
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Runs the subscription loop on a background task
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(cancel).await })
    }

    /// Runs the subscription loop until `cancel` fires
    pub async fn run(self, cancel: CancellationToken) {
        loop {
            if cancel.is_cancelled() {
                break;
            }

            let subscribed = tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.subscribe() => result,
            };

            let error = match subscribed {
                Ok((pubsub, node)) => {
                    self.sink.record(RelayEvent::Subscribed {
                        channel: self.channel.clone(),
                        node,
                    });
                    match self.pump(pubsub, &cancel).await {
                        Ok(()) => break,
                        Err(e) => e,
                    }
                }
                Err(e) => e,
            };

            self.sink.record(RelayEvent::SubscriptionLost {
                channel: self.channel.clone(),
                error,
            });

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.reconnect_delay) => {}
            }
        }

        tracing::debug!(channel = %self.channel, "Listener shutting down");
    }

    async fn subscribe(&self) -> Result<(PubSub, String), String> {
        let mut last_error = String::from("no seed nodes configured");

        for url in self.endpoints.urls() {
            match open_pubsub(url, &self.channel).await {
                Ok(pubsub) => return Ok((pubsub, sanitize_url(url))),
                Err(e) => {
                    tracing::debug!(node = %sanitize_url(url), error = %e, "Subscribe attempt failed");
                    last_error = format!("{}: {}", sanitize_url(url), e);
                }
            }
        }

        Err(last_error)
    }

    /// Returns `Ok` on cancellation, `Err` when the stream ends
    async fn pump(&self, mut pubsub: PubSub, cancel: &CancellationToken) -> Result<(), String> {
        let mut stream = pubsub.on_message();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                msg = stream.next() => match msg {
                    Some(msg) => {
                        let payload = msg.get_payload::<String>().map_err(|e| e.to_string());
                        handle_payload(self.sink.as_ref(), msg.get_channel_name(), payload);
                    }
                    None => return Err("subscription stream closed".to_string()),
                },
            }
        }
    }
}

async fn open_pubsub(url: &str, channel: &str) -> redis::RedisResult<PubSub> {
    let client = redis::Client::open(url)?;
    let mut pubsub = client.get_async_pubsub().await?;
    pubsub.subscribe(channel).await?;
    Ok(pubsub)
}

/// Records one delivered message; decode failures are recorded and swallowed
pub fn handle_payload(sink: &dyn EventSink, channel: &str, payload: Result<String, String>) {
    match payload {
        Ok(body) => sink.record(RelayEvent::MessageReceived {
            channel: channel.to_string(),
            body,
        }),
        Err(error) => sink.record(RelayEvent::MessageDropped {
            channel: channel.to_string(),
            error,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingSink;

    #[test]
    fn test_handle_payload_records_channel_and_body() {
        let sink = RecordingSink::new();
        handle_payload(&sink, "users:unregister", Ok("user:42 logged out".to_string()));

        assert_eq!(
            sink.events(),
            vec![RelayEvent::MessageReceived {
                channel: "users:unregister".to_string(),
                body: "user:42 logged out".to_string(),
            }]
        );
    }

    #[test]
    fn test_bad_payload_is_dropped_not_fatal() {
        let sink = RecordingSink::new();
        handle_payload(&sink, "users:unregister", Err("invalid utf-8".to_string()));
        handle_payload(&sink, "users:unregister", Ok("next".to_string()));

        assert_eq!(sink.names(), vec!["message_dropped", "message_received"]);
    }

    #[test]
    fn test_listens_on_unregister_channel() {
        let endpoints = ClusterEndpoints::parse("127.0.0.1:7000").unwrap();
        let listener = Listener::new(endpoints, Arc::new(RecordingSink::new()));
        assert_eq!(listener.channel(), "users:unregister");
    }

    #[tokio::test]
    async fn test_unreachable_nodes_retry_until_cancelled() {
        // Port 1 is never a Redis node
        let endpoints = ClusterEndpoints::parse("127.0.0.1:1").unwrap();
        let sink = Arc::new(RecordingSink::new());
        let cancel = CancellationToken::new();

        let handle = Listener::new(endpoints, sink.clone())
            .with_reconnect_delay(Duration::from_millis(50))
            .spawn(cancel.clone());

        tokio::time::sleep(Duration::from_millis(120)).await;
        cancel.cancel();
        handle.await.unwrap();

        let names = sink.names();
        assert!(!names.is_empty());
        assert!(names.iter().all(|name| *name == "subscription_lost"));
    }

    #[tokio::test]
    #[ignore] // Requires running Redis cluster on localhost:7000
    async fn test_receives_published_message() {
        use redis::AsyncCommands;

        let endpoints = ClusterEndpoints::parse("127.0.0.1:7000").unwrap();
        let sink = Arc::new(RecordingSink::new());
        let cancel = CancellationToken::new();
        let handle = Listener::new(endpoints, sink.clone()).spawn(cancel.clone());

        tokio::time::sleep(Duration::from_millis(200)).await;
        let client = redis::Client::open("redis://127.0.0.1:7000").unwrap();
        let mut conn = client.get_multiplexed_async_connection().await.unwrap();
        let _: i64 = conn.publish("users:unregister", "user:42").await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        cancel.cancel();
        handle.await.unwrap();
        assert!(sink.names().contains(&"message_received"));
    }
}
