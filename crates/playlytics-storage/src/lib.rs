// SQLite storage layer with sqlx
//
// This crate owns the database handle and all SQL. The existence check and
// the insert(s) of every write path share one transaction, so a batch whose
// referential pre-check passes either lands completely or not at all.

pub mod error;
pub mod models;
pub mod repositories;
pub mod schema;

pub use error::StorageError;
pub use models::*;
pub use repositories::Database;
