/// Periodic slot map refresh
///
/// The cluster driver rebuilds its slot map when a node answers `MOVED` or a
/// connection drops, but has no timer of its own. This task supplies the
/// timer: every `topology_refresh_interval` it asks [`ClusterOps`] to touch
/// each shard's hash slot, so a resharding or failover is noticed within one
/// interval even while no requests flow.
///
/// # Example
///
/// ```no_run
/// use shardrelay_shared::redis::{topology, ClientPolicy, ClusterEndpoints, RedisCluster};
/// use std::sync::Arc;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> anyhow::Result<()> {
/// let endpoints = ClusterEndpoints::parse("10.0.0.1:7000")?;
/// let cluster = Arc::new(RedisCluster::connect(&endpoints, ClientPolicy::default()).await?);
///
/// let cancel = CancellationToken::new();
/// let interval = cluster.policy().topology_refresh_interval;
/// let refresh = topology::spawn_refresh(cluster, interval, cancel.clone());
///
/// cancel.cancel();
/// refresh.await?;
/// # Ok(())
/// # }
/// ```

use crate::redis::ops::ClusterOps;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Runs [`run_refresh`] on a background task
pub fn spawn_refresh(
    cluster: Arc<dyn ClusterOps>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(run_refresh(cluster, interval, cancel))
}

/// Refreshes topology every `interval` until `cancel` fires
///
/// The first refresh happens one interval after start; the connect step has
/// just loaded a fresh slot map.
pub async fn run_refresh(cluster: Arc<dyn ClusterOps>, interval: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut failing = false;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        match cluster.refresh_topology().await {
            Ok(()) => {
                if failing {
                    tracing::info!("Topology refresh recovered");
                    failing = false;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Topology refresh failed");
                failing = true;
            }
        }
    }

    tracing::debug!("Topology refresh stopped");
}
