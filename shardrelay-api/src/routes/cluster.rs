/// Cluster status endpoint
///
/// ```text
/// GET /publish/cluster/info
/// ```
///
/// Returns the flat snapshot described in
/// [`ClusterStatusSnapshot`](shardrelay_shared::inspector::ClusterStatusSnapshot),
/// or 500 `{"message": "Failed to get cluster info: <cause>"}`.

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{extract::State, Json};
use shardrelay_shared::inspector::ClusterStatusSnapshot;

pub async fn cluster_info(State(state): State<AppState>) -> ApiResult<Json<ClusterStatusSnapshot>> {
    let snapshot = state.inspector.inspect().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to get cluster info");
        ApiError::from(e)
    })?;

    Ok(Json(snapshot))
}
