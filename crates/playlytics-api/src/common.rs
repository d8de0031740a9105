// Common API types: error taxonomy, JSON extractor, shared responses
//
// Every failure leaves the service as `{"error": "<message>"}` with one of
// four statuses: 400 validation, 404 missing session(s), 409 duplicate
// session, 500 storage. Raw database error text is logged, never echoed.

use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use playlytics_storage::StorageError;

/// Domain error taxonomy, mapped to HTTP at the boundary.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or malformed required field -> 400
    #[error("{0}")]
    Validation(String),

    /// Referenced session absent -> 404
    #[error("{0}")]
    NotFound(String),

    /// Duplicate session_id on creation -> 409
    #[error("{0}")]
    Conflict(String),

    /// Underlying write failure -> 500, details logged only
    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::DuplicateSession(_) => ApiError::Conflict(err.to_string()),
            StorageError::SessionNotFound(_) | StorageError::SessionsNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            StorageError::Database(_) => ApiError::Storage(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Storage(err) => {
                tracing::error!(error = %err, "Storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal storage error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// JSON extractor that turns body rejections into the 400 validation error
/// instead of axum's default 422 plain-text response.
pub struct ApiJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::Validation(rejection.body_text())),
        }
    }
}

/// Response body for batch endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    /// e.g. "Successfully created 3 events"
    pub message: String,
}

impl MessageResponse {
    pub fn created(count: usize, noun: &str) -> Self {
        Self {
            message: format!("Successfully created {count} {noun}"),
        }
    }
}
