/// Health check endpoint
///
/// Verifies that the server is running and that the node connection
/// still answers `PING`.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "redis": "connected"
/// }
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Application version
    pub version: String,

    /// Cluster status
    pub redis: String,
}

/// Health check handler
///
/// Always answers 200; a failed ping reports `"degraded"`.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let redis_status = match state.cluster.ping().await {
        Ok(true) => "connected",
        Ok(false) => "disconnected",
        Err(e) => {
            tracing::warn!(error = %e, "Health check ping failed");
            "disconnected"
        }
    };

    Ok(Json(HealthResponse {
        status: if redis_status == "connected" {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        redis: redis_status.to_string(),
    }))
}
