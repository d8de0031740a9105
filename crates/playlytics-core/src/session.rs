// Session domain type
//
// A session is a bounded span of gameplay for one player, identified by a
// client- or server-issued unique string. Lifecycle:
// nonexistent -> active (on start) -> ended (on end). A repeated end simply
// overwrites end_time/duration_seconds; ended is not a hard terminal state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// A gameplay session as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Session {
    pub session_id: String,
    pub player_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_info: Option<String>,
    pub start_time: DateTime<Utc>,
    /// Set once the session has been ended. Nullable until then.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Whole seconds between start_time and end_time, truncated toward zero.
    /// Negative when a client reports an end_time before start_time; the
    /// value is stored as-is, there is no ordering guard.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<i64>,
}

impl Session {
    /// Duration in whole seconds between start and end, truncated toward zero.
    pub fn duration_between(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
        (end - start).num_seconds()
    }
}
