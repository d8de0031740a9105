// Playlytics API server
// Decision: One HTTP surface for all ingestion endpoints; no split
// between session and telemetry listeners
// Decision: Storage handle is constructed here and passed down explicitly;
// no module-level database state anywhere

mod common;
mod events;
mod metrics;
mod services;
mod sessions;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use axum::{routing::get, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use playlytics_core::{Event, Metric, Session};
use playlytics_storage::Database;

const DEFAULT_DATABASE_URL: &str = "sqlite://playlytics.db";
const DEFAULT_PORT: u16 = 8000;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Service banner at the root, pointing at the interactive docs.
async fn home() -> Json<Value> {
    Json(json!({
        "message": "Welcome to Playlytics Game Analytics API",
        "docs": "/swagger-ui",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        sessions::start_session,
        sessions::end_session,
        events::create_event,
        events::create_events_batch,
        metrics::create_metric,
        metrics::create_metrics_batch,
    ),
    components(
        schemas(
            Session, Event, Metric,
            sessions::StartSessionRequest,
            sessions::EndSessionRequest,
            events::CreateEventRequest,
            events::EventBatchItem,
            events::EventBatchRequest,
            metrics::CreateMetricRequest,
            metrics::MetricBatchItem,
            metrics::MetricBatchRequest,
            common::MessageResponse,
        )
    ),
    tags(
        (name = "sessions", description = "Session lifecycle endpoints"),
        (name = "events", description = "Event ingestion endpoints"),
        (name = "metrics", description = "Metric ingestion endpoints")
    ),
    info(
        title = "Playlytics API",
        version = "0.2.0",
        description = "Gameplay telemetry ingestion: sessions, events, and metrics",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "playlytics_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("playlytics-api starting...");

    // Initialize database
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
    let db = Database::connect(&database_url)
        .await
        .context("Failed to open database")?;
    tracing::info!(url = %database_url, "Connected to database");

    let app = build_app(Arc::new(db));

    // Load CORS allowed origins from environment (optional)
    // Only needed when a dashboard is served from a different origin
    // Example: CORS_ALLOWED_ORIGINS="https://dash.example.com"
    let cors_origins: Vec<HeaderValue> = std::env::var("CORS_ALLOWED_ORIGINS")
        .ok()
        .filter(|s| !s.is_empty())
        .map(|s| s.split(',').filter_map(|s| s.trim().parse().ok()).collect())
        .unwrap_or_default();

    let app = if cors_origins.is_empty() {
        tracing::info!("CORS not configured (same-origin requests only)");
        app
    } else {
        tracing::info!(origins = ?cors_origins, "CORS origins configured");
        app.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(cors_origins))
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::ORIGIN]),
        )
    };

    // Add tracing
    let app = app.layer(TraceLayer::new_for_http());

    // Start server
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Build the full router (extracted for testing against in-memory storage)
fn build_app(db: Arc<Database>) -> Router {
    let api_routes = Router::new()
        .merge(sessions::routes(sessions::AppState::new(db.clone())))
        .merge(events::routes(events::AppState::new(db.clone())))
        .merge(metrics::routes(metrics::AppState::new(db)));

    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .nest("/api", api_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{DateTime, Duration, Utc};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn test_db() -> Arc<Database> {
        Arc::new(Database::in_memory().await.expect("in-memory database"))
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn start_session(app: &Router, session_id: &str) -> Value {
        let response = app
            .clone()
            .oneshot(post(
                "/api/sessions/start",
                json!({"session_id": session_id, "player_id": "p1", "device_info": "test"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        json_body(response).await
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_app(test_db().await);
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_banner() {
        let app = build_app(test_db().await);
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert!(body["message"].as_str().unwrap().contains("Playlytics"));
    }

    #[tokio::test]
    async fn test_start_session_missing_player_id_is_400() {
        let app = build_app(test_db().await);
        let response = app
            .oneshot(post("/api/sessions/start", json!({"session_id": "s1"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("player_id"));
    }

    #[tokio::test]
    async fn test_start_session_generates_id_when_absent() {
        let app = build_app(test_db().await);
        let response = app
            .oneshot(post("/api/sessions/start", json!({"player_id": "p1"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert!(!body["session_id"].as_str().unwrap().is_empty());
        assert!(body.get("end_time").is_none());
        assert!(body.get("duration_seconds").is_none());
    }

    #[tokio::test]
    async fn test_duplicate_session_start_is_409() {
        let app = build_app(test_db().await);
        start_session(&app, "s1").await;

        let response = app
            .oneshot(post(
                "/api/sessions/start",
                json!({"session_id": "s1", "player_id": "p2"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_end_unknown_session_is_404() {
        let app = build_app(test_db().await);
        let response = app
            .oneshot(post("/api/sessions/end", json!({"session_id": "ghost"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_session_duration_scenario() {
        let app = build_app(test_db().await);
        let started = start_session(&app, "s1").await;

        let start_time: DateTime<Utc> =
            started["start_time"].as_str().unwrap().parse().unwrap();
        let end_time = (start_time + Duration::seconds(125)).to_rfc3339();

        let response = app
            .oneshot(post(
                "/api/sessions/end",
                json!({"session_id": "s1", "end_time": end_time}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["duration_seconds"], 125);
        assert_eq!(body["player_id"], "p1");
    }

    #[tokio::test]
    async fn test_create_event_unknown_session_is_404() {
        let db = test_db().await;
        let app = build_app(db.clone());

        let response = app
            .oneshot(post(
                "/api/events",
                json!({"session_id": "ghost", "event_type": "levelup", "event_name": "x"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM game_events")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_create_event_and_details_round_trip() {
        let app = build_app(test_db().await);
        start_session(&app, "s1").await;

        let details = json!({"weapon": "sword", "combo": 3});
        let response = app
            .oneshot(post(
                "/api/events",
                json!({
                    "session_id": "s1",
                    "event_type": "levelup",
                    "event_name": "reached_level_5",
                    "level_id": "3",
                    "details": details,
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert!(body["id"].as_i64().unwrap() >= 1);
        assert_eq!(body["level_id"], "3");

        // Details come back as the serialized text that was stored.
        let stored: Value =
            serde_json::from_str(body["details"].as_str().unwrap()).unwrap();
        assert_eq!(stored, details);
    }

    #[tokio::test]
    async fn test_create_metric() {
        let app = build_app(test_db().await);
        start_session(&app, "s1").await;

        let response = app
            .oneshot(post(
                "/api/metrics",
                json!({"session_id": "s1", "metric_name": "score", "metric_value": 4200}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["metric_value"], 4200.0);
        assert!(body["id"].as_i64().unwrap() >= 1);
    }

    #[tokio::test]
    async fn test_create_metric_non_numeric_is_400() {
        let app = build_app(test_db().await);
        start_session(&app, "s1").await;

        let response = app
            .oneshot(post(
                "/api/metrics",
                json!({"session_id": "s1", "metric_name": "score", "metric_value": "high"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "metric_value must be a number");
    }

    #[tokio::test]
    async fn test_events_batch_unknown_session_lists_ids_and_writes_nothing() {
        let db = test_db().await;
        let app = build_app(db.clone());
        start_session(&app, "s1").await;

        let response = app
            .oneshot(post(
                "/api/events/batch",
                json!({"events": [
                    {"session_id": "s1", "event_type": "a", "event_name": "b"},
                    {"session_id": "s2", "event_type": "a", "event_name": "b"},
                ]}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Sessions not found: s2");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM game_events")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_events_batch_counts_inserted_items() {
        let app = build_app(test_db().await);
        start_session(&app, "s1").await;

        // Third item is missing event_name and gets dropped, not rejected.
        let response = app
            .oneshot(post(
                "/api/events/batch",
                json!({"events": [
                    {"session_id": "s1", "event_type": "a", "event_name": "b"},
                    {"session_id": "s1", "event_type": "a", "event_name": "c"},
                    {"session_id": "s1", "event_type": "a"},
                ]}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Successfully created 2 events");
    }

    #[tokio::test]
    async fn test_metrics_batch_drops_non_numeric_values() {
        let app = build_app(test_db().await);
        start_session(&app, "s1").await;

        let response = app
            .oneshot(post(
                "/api/metrics/batch",
                json!({"metrics": [
                    {"session_id": "s1", "metric_name": "score", "metric_value": 10},
                    {"session_id": "s1", "metric_name": "score", "metric_value": "12.5"},
                    {"session_id": "s1", "metric_name": "score", "metric_value": "oops"},
                ]}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Successfully created 2 metrics");
    }
}
