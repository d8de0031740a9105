// Metric domain type
//
// A timestamped numeric measurement within a session (score, resource count,
// frame time, ...). Immutable once written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// A gameplay metric as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Metric {
    /// Server-assigned id, monotonic per store.
    pub id: i64,
    pub session_id: String,
    pub metric_name: String,
    pub metric_value: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_id: Option<String>,
}

/// Coerce a client-supplied metric value to f64.
///
/// Game clients send numbers inconsistently: some SDKs serialize every
/// field as a string. Accepts JSON numbers and strings that parse as f64;
/// everything else (null, bool, array, object, non-numeric string) is None.
pub fn coerce_metric_value(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
