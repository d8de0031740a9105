// Event ingestion HTTP routes

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use utoipa::ToSchema;

use playlytics_core::Event;
use playlytics_storage::Database;

use crate::common::{ApiError, ApiJson, MessageResponse};
use crate::services::EventService;

/// Request to log a single gameplay event
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateEventRequest {
    pub session_id: String,
    /// Free-text classifier, e.g. "levelup", "death", "purchase".
    #[schema(example = "levelup")]
    pub event_type: String,
    #[schema(example = "reached_level_5")]
    pub event_name: String,
    #[serde(default)]
    pub level_id: Option<String>,
    #[serde(default)]
    pub position_x: Option<f64>,
    #[serde(default)]
    pub position_y: Option<f64>,
    #[serde(default)]
    pub position_z: Option<f64>,
    /// Structured payload, stored as serialized text.
    #[serde(default)]
    #[schema(example = json!({"weapon": "sword", "combo": 3}))]
    pub details: Option<serde_json::Value>,
    /// Client-reported event time (ISO 8601). Defaults to server time.
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// One event inside a batch. Every field is optional at the serde level so a
/// malformed item cannot reject the whole body; items missing required
/// fields are dropped during validation.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EventBatchItem {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub event_name: Option<String>,
    #[serde(default)]
    pub level_id: Option<String>,
    #[serde(default)]
    pub position_x: Option<f64>,
    #[serde(default)]
    pub position_y: Option<f64>,
    #[serde(default)]
    pub position_z: Option<f64>,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Request to log multiple events in one call
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EventBatchRequest {
    pub events: Vec<EventBatchItem>,
}

/// App state for event routes
#[derive(Clone)]
pub struct AppState {
    pub event_service: Arc<EventService>,
}

impl AppState {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            event_service: Arc::new(EventService::new(db)),
        }
    }
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/events", post(create_event))
        .route("/events/batch", post(create_events_batch))
        .with_state(state)
}

/// POST /api/events - Log a single gameplay event
#[utoipa::path(
    post,
    path = "/api/events",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = Event),
        (status = 400, description = "Missing required fields"),
        (status = 404, description = "Session not found")
    ),
    tag = "events"
)]
pub async fn create_event(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let event = state.event_service.create(req).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// POST /api/events/batch - Log multiple gameplay events in a single request
#[utoipa::path(
    post,
    path = "/api/events/batch",
    request_body = EventBatchRequest,
    responses(
        (status = 201, description = "Batch accepted", body = MessageResponse),
        (status = 404, description = "One or more referenced sessions not found")
    ),
    tag = "events"
)]
pub async fn create_events_batch(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<EventBatchRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let created = state.event_service.create_batch(req.events).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::created(created, "events")),
    ))
}
