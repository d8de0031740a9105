// Playlytics domain types
//
// DB-agnostic entity types and leaf logic for the telemetry ingestion
// service. No I/O happens in this crate.
//
// Key design decisions:
// - Session/Event/Metric are the wire shapes returned by the API; storage
//   rows live in playlytics-storage and are converted by the service layer
// - Client timestamps are normalized here with a lenient now-fallback
// - Metric values are coerced from JSON numbers *or* numeric strings,
//   matching what game clients actually send

pub mod event;
pub mod metric;
pub mod session;
pub mod time;

pub use event::Event;
pub use metric::{coerce_metric_value, Metric};
pub use session::Session;
pub use time::normalize_timestamp;
