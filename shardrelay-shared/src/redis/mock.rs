/// In-memory cluster for tests and local demos
///
/// `MockCluster` implements [`ClusterOps`] without a network:
/// - `SET`/`GET` go to a `HashMap`
/// - `PUBLISH` appends to a log that tests can inspect
/// - `INFO` returns canned section text
/// - Topology refreshes are counted
/// - Failures can be scripted per operation, first in first out
/// - An optional latency is applied to every call
///
/// # Example
///
/// ```
/// use shardrelay_shared::redis::mock::MockCluster;
/// use shardrelay_shared::redis::ops::{ClusterError, ClusterOps};
///
/// # async fn example() {
/// let cluster = MockCluster::new();
/// cluster.fail_next_publish(ClusterError::Connection("refused".into()));
///
/// assert!(cluster.publish("{master1}users:unregister", "hi").await.is_err());
/// assert!(cluster.publish("{master1}users:unregister", "hi").await.is_ok());
/// assert_eq!(cluster.publish_attempts(), 2);
/// # }
/// ```

use crate::redis::ops::{ClusterError, ClusterOps, ClusterResult};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
struct MockState {
    values: HashMap<String, String>,
    published: Vec<(String, String)>,
    publish_attempts: usize,
    info: HashMap<String, String>,
    publish_failures: VecDeque<ClusterError>,
    kv_failures: VecDeque<ClusterError>,
    info_failures: HashMap<String, ClusterError>,
    ping_failure: Option<ClusterError>,
    refresh_attempts: usize,
    refresh_failures: VecDeque<ClusterError>,
}

/// In-memory [`ClusterOps`] implementation
#[derive(Default)]
pub struct MockCluster {
    state: Mutex<MockState>,
    latency: Option<Duration>,
}

impl MockCluster {
    /// Creates an empty, healthy mock cluster
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `latency` to every operation
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Sets the text returned for `INFO <section>`
    pub fn with_info(self, section: &str, text: &str) -> Self {
        self.lock().info.insert(section.to_string(), text.to_string());
        self
    }

    /// Makes the next publish attempt fail with `err`
    pub fn fail_next_publish(&self, err: ClusterError) {
        self.lock().publish_failures.push_back(err);
    }

    /// Makes the next `SET` or `GET` fail with `err`
    pub fn fail_next_kv(&self, err: ClusterError) {
        self.lock().kv_failures.push_back(err);
    }

    /// Makes every `INFO <section>` call fail with `err`
    pub fn fail_info(&self, section: &str, err: ClusterError) {
        self.lock().info_failures.insert(section.to_string(), err);
    }

    /// Makes every PING fail with `err`
    pub fn fail_ping(&self, err: ClusterError) {
        self.lock().ping_failure = Some(err);
    }

    /// Makes the next topology refresh fail with `err`
    pub fn fail_next_refresh(&self, err: ClusterError) {
        self.lock().refresh_failures.push_back(err);
    }

    /// Number of topology refreshes, failed ones included
    pub fn refresh_attempts(&self) -> usize {
        self.lock().refresh_attempts
    }

    /// Successfully published `(channel, message)` pairs in order
    pub fn published(&self) -> Vec<(String, String)> {
        self.lock().published.clone()
    }

    /// Number of publish calls, failed ones included
    pub fn publish_attempts(&self) -> usize {
        self.lock().publish_attempts
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl ClusterOps for MockCluster {
    async fn publish(&self, channel: &str, message: &str) -> ClusterResult<i64> {
        self.delay().await;
        let mut state = self.lock();
        state.publish_attempts += 1;
        if let Some(err) = state.publish_failures.pop_front() {
            return Err(err);
        }
        state.published.push((channel.to_string(), message.to_string()));
        Ok(1)
    }

    async fn set(&self, key: &str, value: &str) -> ClusterResult<()> {
        self.delay().await;
        let mut state = self.lock();
        if let Some(err) = state.kv_failures.pop_front() {
            return Err(err);
        }
        state.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> ClusterResult<Option<String>> {
        self.delay().await;
        let mut state = self.lock();
        if let Some(err) = state.kv_failures.pop_front() {
            return Err(err);
        }
        Ok(state.values.get(key).cloned())
    }

    async fn info(&self, section: &str) -> ClusterResult<String> {
        self.delay().await;
        let state = self.lock();
        if let Some(err) = state.info_failures.get(section) {
            return Err(err.clone());
        }
        Ok(state.info.get(section).cloned().unwrap_or_default())
    }

    async fn ping(&self) -> ClusterResult<bool> {
        self.delay().await;
        match &self.lock().ping_failure {
            Some(err) => Err(err.clone()),
            None => Ok(true),
        }
    }

    async fn refresh_topology(&self) -> ClusterResult<()> {
        self.delay().await;
        let mut state = self.lock();
        state.refresh_attempts += 1;
        match state.refresh_failures.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
