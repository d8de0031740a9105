// Repository layer for database operations
//
// Every write path runs its referential check and its insert(s) inside a
// single transaction, so the check cannot be invalidated between the two
// steps and a failed batch leaves no rows behind.

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use playlytics_core::Session;

use crate::error::StorageError;
use crate::models::*;
use crate::schema;

const POOL_MAX_CONNECTIONS: u32 = 5;
const BUSY_TIMEOUT_SECS: u64 = 5;

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database at `url` and apply the schema.
    pub async fn connect(url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(BUSY_TIMEOUT_SECS));

        let pool = SqlitePoolOptions::new()
            .max_connections(POOL_MAX_CONNECTIONS)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.apply_schema().await?;
        tracing::debug!(url, "Database initialized");
        Ok(db)
    }

    /// In-memory database for tests and throwaway runs. A single connection
    /// is required; each sqlite::memory: connection is its own database.
    pub async fn in_memory() -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.apply_schema().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn apply_schema(&self) -> Result<(), StorageError> {
        sqlx::raw_sql(schema::SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    // ============================================
    // Sessions
    // ============================================

    pub async fn create_session(&self, input: NewSession) -> Result<SessionRow, StorageError> {
        let result = sqlx::query_as::<_, SessionRow>(
            r#"
            INSERT INTO game_sessions (session_id, player_id, device_info, start_time)
            VALUES (?, ?, ?, ?)
            RETURNING id, session_id, player_id, device_info, start_time, end_time, duration_seconds
            "#,
        )
        .bind(&input.session_id)
        .bind(&input.player_id)
        .bind(&input.device_info)
        .bind(input.start_time)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(row),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StorageError::DuplicateSession(input.session_id))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_session(&self, session_id: &str) -> Result<Option<SessionRow>, StorageError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, session_id, player_id, device_info, start_time, end_time, duration_seconds
            FROM game_sessions
            WHERE session_id = ?
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Set end_time and recompute duration_seconds from the stored start_time.
    /// Re-ending an already ended session overwrites both values.
    pub async fn end_session(
        &self,
        session_id: &str,
        end_time: DateTime<Utc>,
    ) -> Result<SessionRow, StorageError> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, session_id, player_id, device_info, start_time, end_time, duration_seconds
            FROM game_sessions
            WHERE session_id = ?
            "#,
        )
        .bind(session_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StorageError::SessionNotFound(session_id.to_string()))?;

        let duration = Session::duration_between(existing.start_time, end_time);

        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            UPDATE game_sessions
            SET end_time = ?, duration_seconds = ?
            WHERE session_id = ?
            RETURNING id, session_id, player_id, device_info, start_time, end_time, duration_seconds
            "#,
        )
        .bind(end_time)
        .bind(duration)
        .bind(session_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    pub async fn session_exists(&self, session_id: &str) -> Result<bool, StorageError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM game_sessions WHERE session_id = ?)")
                .bind(session_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    /// Ids from `session_ids` that have no matching session, in first-seen
    /// order. Empty input yields an empty result.
    pub async fn missing_sessions(
        &self,
        session_ids: &[String],
    ) -> Result<Vec<String>, StorageError> {
        let mut tx = self.pool.begin().await?;
        let missing = Self::missing_sessions_tx(&mut tx, session_ids).await?;
        tx.commit().await?;
        Ok(missing)
    }

    async fn missing_sessions_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        session_ids: &[String],
    ) -> Result<Vec<String>, StorageError> {
        if session_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = sqlx::QueryBuilder::<sqlx::Sqlite>::new(
            "SELECT session_id FROM game_sessions WHERE session_id IN (",
        );
        let mut separated = qb.separated(", ");
        for id in session_ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        let found: Vec<String> = qb.build_query_scalar().fetch_all(&mut **tx).await?;

        let missing = session_ids
            .iter()
            .filter(|id| !found.contains(id))
            .cloned()
            .collect();
        Ok(missing)
    }

    // ============================================
    // Events
    // ============================================

    pub async fn create_event(&self, input: NewEvent) -> Result<EventRow, StorageError> {
        let mut tx = self.pool.begin().await?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM game_sessions WHERE session_id = ?)")
                .bind(&input.session_id)
                .fetch_one(&mut *tx)
                .await?;
        if !exists {
            return Err(StorageError::SessionNotFound(input.session_id));
        }

        let row = Self::insert_event(&mut tx, &input).await?;
        tx.commit().await?;
        Ok(row)
    }

    /// Insert a whole batch of events atomically. Fails with
    /// `SessionsNotFound` (and writes nothing) if any referenced session is
    /// missing; otherwise returns the number of rows inserted.
    pub async fn create_events(&self, inputs: &[NewEvent]) -> Result<usize, StorageError> {
        let session_ids = distinct_session_ids(inputs.iter().map(|e| e.session_id.as_str()));

        let mut tx = self.pool.begin().await?;

        let missing = Self::missing_sessions_tx(&mut tx, &session_ids).await?;
        if !missing.is_empty() {
            return Err(StorageError::SessionsNotFound(missing));
        }

        for input in inputs {
            Self::insert_event(&mut tx, input).await?;
        }

        tx.commit().await?;
        Ok(inputs.len())
    }

    async fn insert_event(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        input: &NewEvent,
    ) -> Result<EventRow, StorageError> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            INSERT INTO game_events
                (session_id, event_type, event_name, timestamp, level_id, position_x, position_y, position_z, details)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, session_id, event_type, event_name, timestamp, level_id, position_x, position_y, position_z, details
            "#,
        )
        .bind(&input.session_id)
        .bind(&input.event_type)
        .bind(&input.event_name)
        .bind(input.timestamp)
        .bind(&input.level_id)
        .bind(input.position_x)
        .bind(input.position_y)
        .bind(input.position_z)
        .bind(&input.details)
        .fetch_one(&mut **tx)
        .await?;

        Ok(row)
    }

    // ============================================
    // Metrics
    // ============================================

    pub async fn create_metric(&self, input: NewMetric) -> Result<MetricRow, StorageError> {
        let mut tx = self.pool.begin().await?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM game_sessions WHERE session_id = ?)")
                .bind(&input.session_id)
                .fetch_one(&mut *tx)
                .await?;
        if !exists {
            return Err(StorageError::SessionNotFound(input.session_id));
        }

        let row = Self::insert_metric(&mut tx, &input).await?;
        tx.commit().await?;
        Ok(row)
    }

    /// Atomic batch insert, same contract as `create_events`.
    pub async fn create_metrics(&self, inputs: &[NewMetric]) -> Result<usize, StorageError> {
        let session_ids = distinct_session_ids(inputs.iter().map(|m| m.session_id.as_str()));

        let mut tx = self.pool.begin().await?;

        let missing = Self::missing_sessions_tx(&mut tx, &session_ids).await?;
        if !missing.is_empty() {
            return Err(StorageError::SessionsNotFound(missing));
        }

        for input in inputs {
            Self::insert_metric(&mut tx, input).await?;
        }

        tx.commit().await?;
        Ok(inputs.len())
    }

    async fn insert_metric(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        input: &NewMetric,
    ) -> Result<MetricRow, StorageError> {
        let row = sqlx::query_as::<_, MetricRow>(
            r#"
            INSERT INTO game_metrics (session_id, metric_name, metric_value, timestamp, level_id)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, session_id, metric_name, metric_value, timestamp, level_id
            "#,
        )
        .bind(&input.session_id)
        .bind(&input.metric_name)
        .bind(input.metric_value)
        .bind(input.timestamp)
        .bind(&input.level_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(row)
    }
}

/// Distinct session ids in first-seen order.
fn distinct_session_ids<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for id in ids {
        if !out.iter().any(|seen| seen == id) {
            out.push(id.to_string());
        }
    }
    out
}
