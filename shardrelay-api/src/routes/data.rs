/// Key/value endpoints
///
/// # Endpoints
///
/// ```text
/// POST /publish/data        {"key": "session:7", "value": "active"}
/// GET  /publish/data/:key
/// ```
///
/// # Responses
///
/// - `POST`: 200 empty; 400 empty key; 503 cluster unreachable;
///   500 `{"message": "Failed to save data: <cause>"}`
/// - `GET`: 200 `{"value": "active"}`; 404 empty when the key is absent;
///   503 cluster unreachable; 500 `{"message": "Failed to get data: <cause>"}`

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Set data request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SetDataRequest {
    #[validate(length(min = 1))]
    pub key: String,

    pub value: String,
}

/// Get data response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueResponse {
    pub value: String,
}

pub async fn set_data(
    State(state): State<AppState>,
    payload: Result<Json<SetDataRequest>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(request) = payload?;
    request.validate()?;

    state.kv.set(&request.key, &request.value).await.map_err(|e| {
        tracing::error!(key = %request.key, error = %e, "Failed to save data");
        ApiError::from_kv(e, "Failed to save data")
    })?;

    Ok(StatusCode::OK)
}

pub async fn get_data(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<ValueResponse>> {
    let value = state.kv.get(&key).await.map_err(|e| {
        tracing::error!(key = %key, error = %e, "Failed to get data");
        ApiError::from_kv(e, "Failed to get data")
    })?;

    match value {
        Some(value) => Ok(Json(ValueResponse { value })),
        None => Err(ApiError::NotFound),
    }
}
