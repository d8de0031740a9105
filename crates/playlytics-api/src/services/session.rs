// Session service for business logic

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use playlytics_core::{normalize_timestamp, Session};
use playlytics_storage::{Database, NewSession, SessionRow};

use crate::common::ApiError;
use crate::sessions::{EndSessionRequest, StartSessionRequest};

pub struct SessionService {
    db: Arc<Database>,
}

impl SessionService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Start a new session. The client may bring its own session_id; when it
    /// does not, a time-ordered UUIDv7 is issued server-side.
    pub async fn start(&self, req: StartSessionRequest) -> Result<Session, ApiError> {
        let session_id = req
            .session_id
            .unwrap_or_else(|| Uuid::now_v7().to_string());

        let row = self
            .db
            .create_session(NewSession {
                session_id,
                player_id: req.player_id,
                device_info: req.device_info,
                start_time: Utc::now(),
            })
            .await?;

        Ok(Self::row_to_session(row))
    }

    /// End a session, defaulting end_time to server time when absent or
    /// unparsable, and recompute its duration.
    pub async fn end(&self, req: EndSessionRequest) -> Result<Session, ApiError> {
        let end_time = normalize_timestamp(req.end_time.as_deref());
        let row = self.db.end_session(&req.session_id, end_time).await?;
        Ok(Self::row_to_session(row))
    }

    fn row_to_session(row: SessionRow) -> Session {
        Session {
            session_id: row.session_id,
            player_id: row.player_id,
            device_info: row.device_info,
            start_time: row.start_time,
            end_time: row.end_time,
            duration_seconds: row.duration_seconds,
        }
    }
}
