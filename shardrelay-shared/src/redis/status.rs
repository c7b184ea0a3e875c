/// Status node connection with seed failover
///
/// `INFO` and `PING` describe one node, so they go to a single seed node
/// instead of the slot-routed cluster connection. When that node stops
/// answering, the next seed in configuration order takes over; the failed
/// node is tried again last.
///
/// ```text
/// seeds: [a, b, c]      active: a
///
/// INFO ──► a  ✗ connection refused
///          └─► dial b ✓  active: b
/// INFO ──► b  ✓
/// ```
///
/// Command errors (WRONGTYPE, parse failures) never trigger a switch; only
/// the connection-failure class does.

use crate::redis::client::sanitize_url;
use crate::redis::ops::{ClusterError, ClusterResult};
use async_trait::async_trait;
use std::future::Future;
use tokio::sync::Mutex;

/// Opens a connection to one node
#[async_trait]
pub trait NodeDialer: Send + Sync {
    /// Connection handle; cloned for every command
    type Conn: Clone + Send + Sync;

    /// Connects to `url`
    async fn dial(&self, url: &str) -> ClusterResult<Self::Conn>;
}

struct Active<C> {
    index: usize,
    conn: C,
}

/// Node-local connection that walks the seed list on failure
pub struct StatusNode<D: NodeDialer> {
    dialer: D,
    seeds: Vec<String>,
    active: Mutex<Active<D::Conn>>,
}

impl<D: NodeDialer> StatusNode<D> {
    /// Connects to the first reachable seed
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::Connection`] if no seed can be reached.
    pub async fn connect(dialer: D, seeds: Vec<String>) -> ClusterResult<Self> {
        let active = dial_from(&dialer, &seeds, 0).await?;

        Ok(Self {
            dialer,
            seeds,
            active: Mutex::new(active),
        })
    }

    /// Sanitized URL of the node currently answering status queries
    pub async fn url(&self) -> String {
        let index = self.active.lock().await.index;
        sanitize_url(&self.seeds[index])
    }

    /// Runs `op` on the active node, switching nodes once on a connection failure
    pub async fn run<T, F, Fut>(&self, op: F) -> ClusterResult<T>
    where
        F: Fn(D::Conn) -> Fut,
        Fut: Future<Output = ClusterResult<T>>,
    {
        let (index, conn) = {
            let active = self.active.lock().await;
            (active.index, active.conn.clone())
        };

        match op(conn).await {
            Err(err) if err.is_connection_failure() => {
                tracing::warn!(
                    node = %sanitize_url(&self.seeds[index]),
                    error = %err,
                    "Status node unavailable, trying next seed"
                );
                let conn = self.fail_over(index).await?;
                op(conn).await
            }
            result => result,
        }
    }

    async fn fail_over(&self, failed: usize) -> ClusterResult<D::Conn> {
        let mut active = self.active.lock().await;

        // Another caller already switched away from the failed node
        if active.index != failed {
            return Ok(active.conn.clone());
        }

        let next = dial_from(&self.dialer, &self.seeds, failed + 1).await?;
        tracing::info!(node = %sanitize_url(&self.seeds[next.index]), "Status node switched");

        let conn = next.conn.clone();
        *active = next;
        Ok(conn)
    }
}

async fn dial_from<D: NodeDialer>(
    dialer: &D,
    seeds: &[String],
    start: usize,
) -> ClusterResult<Active<D::Conn>> {
    let mut last_error = String::from("no seed nodes configured");

    for offset in 0..seeds.len() {
        let index = (start + offset) % seeds.len();
        match dialer.dial(&seeds[index]).await {
            Ok(conn) => return Ok(Active { index, conn }),
            Err(e) => {
                tracing::warn!(node = %sanitize_url(&seeds[index]), error = %e, "Seed node unreachable");
                last_error = format!("{}: {}", sanitize_url(&seeds[index]), e);
            }
        }
    }

    Err(ClusterError::Connection(format!(
        "No seed node reachable (last error: {})",
        last_error
    )))
}
