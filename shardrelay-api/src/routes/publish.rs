/// Deregistration publish endpoints
///
/// # Endpoints
///
/// ```text
/// POST /publish/master1/events/users/deregister
/// POST /publish/master2/events/users/deregister
/// ```
///
/// # Example Request
///
/// ```json
/// { "message": "user:42 logged out" }
/// ```
///
/// # Responses
///
/// - 200: empty body, message published
/// - 400: `{"message": "message must not be empty"}`
/// - 503: `{"message": "Master1 node is temporarily unavailable"}`
/// - 500: `{"message": "Failed to publish message to Master1: <cause>"}`

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use serde::Deserialize;
use shardrelay_shared::routing::ShardTarget;
use validator::Validate;

/// Publish request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PublishRequest {
    /// Event body
    #[validate(length(min = 1))]
    pub message: String,
}

pub async fn publish_to_master1(
    State(state): State<AppState>,
    payload: Result<Json<PublishRequest>, JsonRejection>,
) -> ApiResult<StatusCode> {
    publish(&state, ShardTarget::Master1, payload).await
}

pub async fn publish_to_master2(
    State(state): State<AppState>,
    payload: Result<Json<PublishRequest>, JsonRejection>,
) -> ApiResult<StatusCode> {
    publish(&state, ShardTarget::Master2, payload).await
}

async fn publish(
    state: &AppState,
    target: ShardTarget,
    payload: Result<Json<PublishRequest>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!(%target, error = %rejection.body_text(), "Rejected publish request");
        ApiError::from(rejection)
    })?;
    request.validate()?;

    state.publisher.publish(target, &request.message).await?;

    Ok(StatusCode::OK)
}
