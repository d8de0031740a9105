//! Storage error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Unique constraint violation on session_id at creation.
    #[error("Session already exists: {0}")]
    DuplicateSession(String),

    /// A write referenced a session that does not exist.
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Batch referential pre-check failure. Lists every missing id.
    #[error("Sessions not found: {}", .0.join(", "))]
    SessionsNotFound(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sessions_not_found_lists_ids() {
        let err = StorageError::SessionsNotFound(vec!["s2".to_string(), "s9".to_string()]);
        assert_eq!(err.to_string(), "Sessions not found: s2, s9");
    }

    #[test]
    fn test_duplicate_session_display() {
        let err = StorageError::DuplicateSession("s1".to_string());
        assert_eq!(err.to_string(), "Session already exists: s1");
    }
}
