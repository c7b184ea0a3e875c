//! # ShardRelay API Server
//!
//! Relays user deregistration events across a Redis cluster:
//! - Publishes to a shard-pinned channel per master
//! - Listens on `users:unregister` and logs every message
//! - Exposes a key/value façade and a cluster status snapshot
//! - Refreshes the cluster slot map on a fixed interval
//!
//! ## Usage
//!
//! ```bash
//! REDIS_CLUSTER_NODES=127.0.0.1:7000,127.0.0.1:7001 cargo run -p shardrelay-api
//! ```

use shardrelay_api::app::{build_router, AppState};
use shardrelay_api::config::Config;
use shardrelay_shared::events::{EventSink, TracingSink};
use shardrelay_shared::listener::Listener;
use shardrelay_shared::redis::{topology, RedisCluster};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "shardrelay_api=debug,shardrelay_shared=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "ShardRelay API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    // Startup aborts if the cluster cannot be reached
    let cluster = Arc::new(
        RedisCluster::connect(&config.redis.endpoints, config.redis.policy.clone()).await?,
    );

    let sink: Arc<dyn EventSink> = Arc::new(TracingSink);
    let state = AppState::new(cluster.clone(), sink.clone(), config.publish.retry_policy());
    let app = build_router(state);

    let cancel = CancellationToken::new();
    let refresh_task = topology::spawn_refresh(
        cluster.clone(),
        cluster.policy().topology_refresh_interval,
        cancel.clone(),
    );
    let listener_task = Listener::new(config.redis.endpoints.clone(), sink).spawn(cancel.clone());

    let bind_address = config.bind_address();
    let tcp = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(tcp, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cancel.cancel();
    if let Err(e) = listener_task.await {
        tracing::error!(error = %e, "Listener task ended abnormally");
    }
    if let Err(e) = refresh_task.await {
        tracing::error!(error = %e, "Topology refresh task ended abnormally");
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received, draining...");
}
