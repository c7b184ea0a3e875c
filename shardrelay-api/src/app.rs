/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use shardrelay_api::{app::AppState, config::Config};
/// use shardrelay_shared::events::TracingSink;
/// use shardrelay_shared::redis::RedisCluster;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let cluster = RedisCluster::connect(&config.redis.endpoints, config.redis.policy.clone()).await?;
/// let state = AppState::new(Arc::new(cluster), Arc::new(TracingSink), config.publish.retry_policy());
/// let app = shardrelay_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use axum::{
    routing::{get, post},
    Router,
};
use shardrelay_shared::events::EventSink;
use shardrelay_shared::inspector::ClusterInspector;
use shardrelay_shared::kv::KeyValueStore;
use shardrelay_shared::publisher::{Publisher, RetryPolicy};
use shardrelay_shared::redis::ClusterOps;
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Every component holds the same cluster handle, which is never rebuilt
/// after start-up.
#[derive(Clone)]
pub struct AppState {
    /// Shared cluster handle
    pub cluster: Arc<dyn ClusterOps>,

    /// Shard-pinned publisher
    pub publisher: Publisher,

    /// Key/value façade
    pub kv: KeyValueStore,

    /// Cluster status inspector
    pub inspector: ClusterInspector,
}

impl AppState {
    /// Creates new application state around one cluster handle
    pub fn new(cluster: Arc<dyn ClusterOps>, sink: Arc<dyn EventSink>, retry: RetryPolicy) -> Self {
        Self {
            publisher: Publisher::new(cluster.clone(), sink, retry),
            kv: KeyValueStore::new(cluster.clone()),
            inspector: ClusterInspector::new(cluster.clone()),
            cluster,
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /health
/// └── /publish/
///     ├── POST /master1/events/users/deregister
///     ├── POST /master2/events/users/deregister
///     ├── POST /data
///     ├── GET  /data/:key
///     └── GET  /cluster/info
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let publish_routes = Router::new()
        .route(
            "/master1/events/users/deregister",
            post(routes::publish::publish_to_master1),
        )
        .route(
            "/master2/events/users/deregister",
            post(routes::publish::publish_to_master2),
        )
        .route("/data", post(routes::data::set_data))
        .route("/data/:key", get(routes::data::get_data))
        .route("/cluster/info", get(routes::cluster::cluster_info));

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/publish", publish_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
