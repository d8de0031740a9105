// Client timestamp normalization
//
// Game clients report timestamps in an ISO-8601-ish format, usually with a
// trailing `Z`, sometimes with no offset at all, and occasionally as garbage.
// Policy: absent or unparsable input falls back to current server time (UTC).
// Parse failures are never surfaced to the client (ingestion must not drop
// telemetry over a bad clock string), but they are logged so the fallback
// stays observable.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Normalize an optional client-supplied timestamp string to a UTC instant.
///
/// Accepts RFC 3339 (with `Z` or a numeric offset) and bare date-times
/// without an offset, which are treated as UTC. Anything else yields
/// `Utc::now()`.
pub fn normalize_timestamp(raw: Option<&str>) -> DateTime<Utc> {
    let Some(raw) = raw else {
        return Utc::now();
    };

    match parse_timestamp(raw) {
        Some(ts) => ts,
        None => {
            tracing::warn!(raw, "Unparsable client timestamp, substituting server time");
            Utc::now()
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    // No offset: treat as UTC. Covers "2024-05-01T12:00:00" and the
    // space-separated form some engines emit.
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_rfc3339_with_z() {
        let ts = normalize_timestamp(Some("2024-05-01T12:00:00Z"));
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_rfc3339_with_offset() {
        let ts = normalize_timestamp(Some("2024-05-01T14:00:00+02:00"));
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_naive_datetime_treated_as_utc() {
        let ts = normalize_timestamp(Some("2024-05-01T12:00:00"));
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_fractional_seconds() {
        let ts = normalize_timestamp(Some("2024-05-01T12:00:00.500Z"));
        assert_eq!(
            ts,
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
                + chrono::Duration::milliseconds(500)
        );
    }

    #[test]
    fn test_garbage_falls_back_to_now() {
        let before = Utc::now();
        let ts = normalize_timestamp(Some("not-a-timestamp"));
        let after = Utc::now();
        assert!(ts >= before && ts <= after);
    }

    #[test]
    fn test_absent_falls_back_to_now() {
        let before = Utc::now();
        let ts = normalize_timestamp(None);
        let after = Utc::now();
        assert!(ts >= before && ts <= after);
    }
}
