/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// Every failure body has the same shape:
///
/// ```json
/// { "message": "Master1 node is temporarily unavailable" }
/// ```
///
/// `NotFound` is the exception: it answers 404 with an empty body.
///
/// # Example
///
/// ```
/// use shardrelay_api::error::{ApiError, ApiResult};
/// use axum::http::StatusCode;
///
/// async fn handler(found: bool) -> ApiResult<StatusCode> {
///     if !found {
///         return Err(ApiError::NotFound);
///     }
///     Ok(StatusCode::OK)
/// }
/// ```

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use shardrelay_shared::inspector::InspectError;
use shardrelay_shared::kv::KvError;
use shardrelay_shared::publisher::PublishError;
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Not found (404), empty body
    NotFound,

    /// Internal server error (500)
    InternalError(String),

    /// Service unavailable (503)
    ServiceUnavailable(String),
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub message: String,
}

impl ApiError {
    /// Maps a key/value failure, prefixing the cause with `context`
    pub fn from_kv(err: KvError, context: &str) -> Self {
        match err {
            KvError::EmptyKey => ApiError::BadRequest(err.to_string()),
            KvError::Unavailable(cause) => {
                ApiError::ServiceUnavailable(format!("{}: {}", context, cause))
            }
            KvError::Failed(cause) => ApiError::InternalError(format!("{}: {}", context, cause)),
        }
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::NotFound => write!(f, "Not found"),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match self {
            ApiError::NotFound => return status.into_response(),
            ApiError::BadRequest(msg)
            | ApiError::InternalError(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}

/// Convert publish errors to API errors
impl From<PublishError> for ApiError {
    fn from(err: PublishError) -> Self {
        match err {
            PublishError::EmptyMessage => ApiError::BadRequest(err.to_string()),
            PublishError::NodeUnavailable { .. } => ApiError::ServiceUnavailable(err.to_string()),
            PublishError::PublishFailed { .. } => ApiError::InternalError(err.to_string()),
        }
    }
}

/// Convert inspection errors to API errors
impl From<InspectError> for ApiError {
    fn from(err: InspectError) -> Self {
        ApiError::InternalError(format!("Failed to get cluster info: {}", err))
    }
}

/// Convert malformed JSON bodies to API errors
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Convert request validation errors to API errors
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|field| format!("{} must not be empty", field))
            .collect();
        fields.sort();
        ApiError::BadRequest(fields.join(", "))
    }
}
