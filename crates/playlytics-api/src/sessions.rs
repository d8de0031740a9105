// Session lifecycle HTTP routes

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use playlytics_core::Session;
use playlytics_storage::Database;

use crate::common::{ApiError, ApiJson};
use crate::services::SessionService;

/// Request to start a gameplay session
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StartSessionRequest {
    /// Client-issued session id. Server generates one when absent.
    #[serde(default)]
    #[schema(example = "0190f8a2-7c3e-7b5a-9d21-8f3c2a1b4c5d")]
    pub session_id: Option<String>,
    /// Player identifier.
    #[schema(example = "player-417")]
    pub player_id: String,
    /// Opaque device description reported by the client.
    #[serde(default)]
    #[schema(example = "iPhone15,2 iOS 17.4")]
    pub device_info: Option<String>,
}

/// Request to end a gameplay session
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EndSessionRequest {
    pub session_id: String,
    /// Client-reported end time (ISO 8601). Defaults to server time when
    /// absent or unparsable.
    #[serde(default)]
    #[schema(example = "2024-05-01T12:02:05Z")]
    pub end_time: Option<String>,
}

/// App state for session routes
#[derive(Clone)]
pub struct AppState {
    pub session_service: Arc<SessionService>,
}

impl AppState {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            session_service: Arc::new(SessionService::new(db)),
        }
    }
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/sessions/start", post(start_session))
        .route("/sessions/end", post(end_session))
        .with_state(state)
}

/// POST /api/sessions/start - Start a new gameplay session
#[utoipa::path(
    post,
    path = "/api/sessions/start",
    request_body = StartSessionRequest,
    responses(
        (status = 201, description = "Session started", body = Session),
        (status = 400, description = "Missing player_id"),
        (status = 409, description = "session_id already exists")
    ),
    tag = "sessions"
)]
pub async fn start_session(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<StartSessionRequest>,
) -> Result<(StatusCode, Json<Session>), ApiError> {
    let session = state.session_service.start(req).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// POST /api/sessions/end - End an existing gameplay session
#[utoipa::path(
    post,
    path = "/api/sessions/end",
    request_body = EndSessionRequest,
    responses(
        (status = 200, description = "Session ended, duration computed", body = Session),
        (status = 404, description = "Session not found")
    ),
    tag = "sessions"
)]
pub async fn end_session(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<EndSessionRequest>,
) -> Result<Json<Session>, ApiError> {
    let session = state.session_service.end(req).await?;
    Ok(Json(session))
}
