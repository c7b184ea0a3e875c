/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - An in-memory cluster with scripted failures
/// - A recording event sink
/// - Request helpers over the full router

use axum::body::Body;
use axum::http::{Request, StatusCode};
use shardrelay_api::app::{build_router, AppState};
use shardrelay_shared::events::RecordingSink;
use shardrelay_shared::publisher::RetryPolicy;
use shardrelay_shared::redis::MockCluster;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

/// Backoff used by tests so retries stay fast
pub const TEST_BACKOFF: Duration = Duration::from_millis(10);

/// Test context containing all necessary resources
pub struct TestContext {
    pub cluster: Arc<MockCluster>,
    pub sink: Arc<RecordingSink>,
    pub app: axum::Router,
}

impl TestContext {
    /// Creates a context around a healthy, empty cluster
    pub fn new() -> Self {
        Self::with_cluster(MockCluster::new())
    }

    /// Creates a context around a prepared cluster
    pub fn with_cluster(cluster: MockCluster) -> Self {
        let cluster = Arc::new(cluster);
        let sink = Arc::new(RecordingSink::new());
        let state = AppState::new(
            cluster.clone(),
            sink.clone(),
            RetryPolicy::with_backoff(TEST_BACKOFF),
        );

        Self {
            cluster,
            sink,
            app: build_router(state),
        }
    }

    /// Sends a request and returns status and raw body text
    pub async fn send(&self, method: &str, uri: &str, body: Option<String>) -> (StatusCode, String) {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header("content-type", "application/json");
        }
        let request = builder
            .body(body.map(Body::from).unwrap_or_else(Body::empty))
            .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Sends a JSON body with POST
    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> (StatusCode, String) {
        self.send("POST", uri, Some(body.to_string())).await
    }

    /// Sends a GET
    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        self.send("GET", uri, None).await
    }
}

/// Parses a response body as JSON
pub fn json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).unwrap()
}
