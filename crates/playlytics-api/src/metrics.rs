// Metric ingestion HTTP routes

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use playlytics_core::Metric;
use playlytics_storage::Database;

use crate::common::{ApiError, ApiJson, MessageResponse};
use crate::services::MetricService;

/// Request to log a single gameplay metric
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateMetricRequest {
    pub session_id: String,
    #[schema(example = "score")]
    pub metric_name: String,
    /// Accepted as a JSON number or a numeric string, since some client SDKs
    /// stringify every field. Coerced to f64, 400 when not numeric.
    #[schema(value_type = f64, example = 4200)]
    pub metric_value: serde_json::Value,
    #[serde(default)]
    pub level_id: Option<String>,
    /// Client-reported time (ISO 8601). Defaults to server time.
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// One metric inside a batch. Lenient shape, same policy as event batches.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MetricBatchItem {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub metric_name: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub metric_value: serde_json::Value,
    #[serde(default)]
    pub level_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Request to log multiple metrics in one call
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MetricBatchRequest {
    pub metrics: Vec<MetricBatchItem>,
}

/// App state for metric routes
#[derive(Clone)]
pub struct AppState {
    pub metric_service: Arc<MetricService>,
}

impl AppState {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            metric_service: Arc::new(MetricService::new(db)),
        }
    }
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/metrics", post(create_metric))
        .route("/metrics/batch", post(create_metrics_batch))
        .with_state(state)
}

/// POST /api/metrics - Log a single gameplay metric
#[utoipa::path(
    post,
    path = "/api/metrics",
    request_body = CreateMetricRequest,
    responses(
        (status = 201, description = "Metric created", body = Metric),
        (status = 400, description = "Missing fields or non-numeric metric_value"),
        (status = 404, description = "Session not found")
    ),
    tag = "metrics"
)]
pub async fn create_metric(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateMetricRequest>,
) -> Result<(StatusCode, Json<Metric>), ApiError> {
    let metric = state.metric_service.create(req).await?;
    Ok((StatusCode::CREATED, Json(metric)))
}

/// POST /api/metrics/batch - Log multiple gameplay metrics in a single request
#[utoipa::path(
    post,
    path = "/api/metrics/batch",
    request_body = MetricBatchRequest,
    responses(
        (status = 201, description = "Batch accepted", body = MessageResponse),
        (status = 404, description = "One or more referenced sessions not found")
    ),
    tag = "metrics"
)]
pub async fn create_metrics_batch(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<MetricBatchRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let created = state.metric_service.create_batch(req.metrics).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::created(created, "metrics")),
    ))
}
