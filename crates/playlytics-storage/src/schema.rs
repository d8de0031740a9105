//! SQLite schema definitions
//!
//! Initial schema with all three tables. DDL is idempotent and applied at
//! every startup; there is no migration tooling.

/// Complete schema SQL
pub const SCHEMA: &str = r#"
-- =============================================================================
-- 1. Sessions
-- =============================================================================
CREATE TABLE IF NOT EXISTS game_sessions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT NOT NULL UNIQUE,
    player_id TEXT NOT NULL,
    device_info TEXT,
    start_time TEXT NOT NULL,
    end_time TEXT,
    duration_seconds INTEGER
);

CREATE INDEX IF NOT EXISTS idx_game_sessions_session ON game_sessions(session_id);
CREATE INDEX IF NOT EXISTS idx_game_sessions_player ON game_sessions(player_id);

-- =============================================================================
-- 2. Events (references sessions by session_id)
-- =============================================================================
CREATE TABLE IF NOT EXISTS game_events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT NOT NULL REFERENCES game_sessions(session_id),
    event_type TEXT NOT NULL,
    event_name TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    level_id TEXT,
    position_x REAL,
    position_y REAL,
    position_z REAL,
    details TEXT
);

CREATE INDEX IF NOT EXISTS idx_game_events_session ON game_events(session_id);
CREATE INDEX IF NOT EXISTS idx_game_events_type ON game_events(event_type);
CREATE INDEX IF NOT EXISTS idx_game_events_name ON game_events(event_name);

-- =============================================================================
-- 3. Metrics (references sessions by session_id)
-- =============================================================================
CREATE TABLE IF NOT EXISTS game_metrics (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT NOT NULL REFERENCES game_sessions(session_id),
    metric_name TEXT NOT NULL,
    metric_value REAL NOT NULL,
    timestamp TEXT NOT NULL,
    level_id TEXT
);

CREATE INDEX IF NOT EXISTS idx_game_metrics_session ON game_metrics(session_id);
CREATE INDEX IF NOT EXISTS idx_game_metrics_name ON game_metrics(metric_name);
"#;
