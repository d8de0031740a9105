// Database models (internal, may differ from public DTOs)

use chrono::{DateTime, Utc};
use sqlx::FromRow;

// ============================================
// Session models
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub id: i64,
    pub session_id: String,
    pub player_id: String,
    pub device_info: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_seconds: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewSession {
    pub session_id: String,
    pub player_id: String,
    pub device_info: Option<String>,
    pub start_time: DateTime<Utc>,
}

// ============================================
// Event models
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
    pub id: i64,
    pub session_id: String,
    pub event_type: String,
    pub event_name: String,
    pub timestamp: DateTime<Utc>,
    pub level_id: Option<String>,
    pub position_x: Option<f64>,
    pub position_y: Option<f64>,
    pub position_z: Option<f64>,
    pub details: Option<String>,
}

/// Event ready for insertion. `details` has already been serialized to its
/// storage text by the service layer.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub session_id: String,
    pub event_type: String,
    pub event_name: String,
    pub timestamp: DateTime<Utc>,
    pub level_id: Option<String>,
    pub position_x: Option<f64>,
    pub position_y: Option<f64>,
    pub position_z: Option<f64>,
    pub details: Option<String>,
}

// ============================================
// Metric models
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct MetricRow {
    pub id: i64,
    pub session_id: String,
    pub metric_name: String,
    pub metric_value: f64,
    pub timestamp: DateTime<Utc>,
    pub level_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewMetric {
    pub session_id: String,
    pub metric_name: String,
    pub metric_value: f64,
    pub timestamp: DateTime<Utc>,
    pub level_id: Option<String>,
}
