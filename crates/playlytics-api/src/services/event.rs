// Event sink service

use std::sync::Arc;

use playlytics_core::{normalize_timestamp, Event};
use playlytics_storage::{Database, EventRow, NewEvent, StorageError};

use crate::common::ApiError;
use crate::events::{CreateEventRequest, EventBatchItem};
use crate::services::referenced_session_ids;

pub struct EventService {
    db: Arc<Database>,
}

impl EventService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn create(&self, req: CreateEventRequest) -> Result<Event, ApiError> {
        let details = serialize_details(req.details.as_ref())?;
        let row = self
            .db
            .create_event(NewEvent {
                session_id: req.session_id,
                event_type: req.event_type,
                event_name: req.event_name,
                timestamp: normalize_timestamp(req.timestamp.as_deref()),
                level_id: req.level_id,
                position_x: req.position_x,
                position_y: req.position_y,
                position_z: req.position_z,
                details,
            })
            .await?;

        Ok(Self::row_to_event(row))
    }

    /// Batch ingestion. Every session referenced by *any* item must exist
    /// before a single row is written; items that fail field validation are
    /// then dropped, and the returned count is rows actually inserted.
    pub async fn create_batch(&self, items: Vec<EventBatchItem>) -> Result<usize, ApiError> {
        let referenced =
            referenced_session_ids(items.iter().map(|item| item.session_id.as_deref()));

        let missing = self.db.missing_sessions(&referenced).await?;
        if !missing.is_empty() {
            return Err(StorageError::SessionsNotFound(missing).into());
        }

        let mut valid = Vec::with_capacity(items.len());
        for item in items {
            match validate_batch_item(item)? {
                Some(event) => valid.push(event),
                None => tracing::debug!("Dropping batch event with missing required fields"),
            }
        }

        let created = self.db.create_events(&valid).await?;
        Ok(created)
    }

    fn row_to_event(row: EventRow) -> Event {
        Event {
            id: row.id,
            session_id: row.session_id,
            event_type: row.event_type,
            event_name: row.event_name,
            timestamp: row.timestamp,
            level_id: row.level_id,
            position_x: row.position_x,
            position_y: row.position_y,
            position_z: row.position_z,
            details: row.details,
        }
    }
}

/// A batch item is kept only when all three required fields are present.
fn validate_batch_item(item: EventBatchItem) -> Result<Option<NewEvent>, ApiError> {
    let (Some(session_id), Some(event_type), Some(event_name)) =
        (item.session_id, item.event_type, item.event_name)
    else {
        return Ok(None);
    };

    let details = serialize_details(item.details.as_ref())?;
    Ok(Some(NewEvent {
        session_id,
        event_type,
        event_name,
        timestamp: normalize_timestamp(item.timestamp.as_deref()),
        level_id: item.level_id,
        position_x: item.position_x,
        position_y: item.position_y,
        position_z: item.position_z,
        details,
    }))
}

/// Serialize the structured details payload to its storage text. Reads get
/// this exact text back; the round-trip guarantee is on the serialized form.
fn serialize_details(details: Option<&serde_json::Value>) -> Result<Option<String>, ApiError> {
    details
        .map(|value| {
            serde_json::to_string(value)
                .map_err(|e| ApiError::Validation(format!("invalid details payload: {e}")))
        })
        .transpose()
}
