// Service layer between routes and storage
//
// Routes do payload-shape work only; the services own timestamp
// normalization, metric-value coercion, batch item validation, and the
// conversion from storage rows to public DTOs.

pub mod event;
pub mod metric;
pub mod session;

pub use event::EventService;
pub use metric::MetricService;
pub use session::SessionService;

/// Distinct session ids referenced by a batch, in first-seen order.
/// Items without a session id contribute nothing (they are dropped later
/// by per-item validation).
pub(crate) fn referenced_session_ids<'a>(
    ids: impl Iterator<Item = Option<&'a str>>,
) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for id in ids.flatten() {
        if !out.iter().any(|seen| seen == id) {
            out.push(id.to_string());
        }
    }
    out
}
