// Event domain type
//
// A discrete, timestamped occurrence within a session (action, achievement,
// level transition, ...). Events are immutable once written; there are no
// update or delete operations anywhere in the system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// A gameplay event as returned by the API.
///
/// `details` is the serialized text that was written to storage, returned as
/// an opaque string. The round-trip guarantee is byte-for-byte on this text,
/// not structural equality of whatever object the client originally sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Event {
    /// Server-assigned id, monotonic per store.
    pub id: i64,
    pub session_id: String,
    pub event_type: String,
    pub event_name: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_z: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
