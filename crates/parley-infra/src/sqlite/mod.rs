//! SQLite-backed resource implementations.
//!
//! Two backends share the same [`pool::DatabasePool`] and schema but differ
//! in how they talk to sqlx:
//!
//! - [`raw`] builds every predicate and SET list clause-by-clause with `?`
//!   placeholders and maps rows column-by-column via `try_get`.
//! - [`mapped`] delegates bind placement to `sqlx::QueryBuilder` and column
//!   mapping to derived `FromRow` row structs.

pub mod mapped;
pub mod pool;
pub mod raw;

use chrono::{DateTime, Utc};
use parley_types::error::StorageError;
use uuid::Uuid;

/// Map a sqlx failure onto the storage taxonomy.
///
/// Unique and foreign-key violations become `Constraint`; a closed pool
/// becomes `Connection`; everything else is `Query`.
pub(crate) fn map_sqlx_err(err: sqlx::Error) -> StorageError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() || db.is_foreign_key_violation() => {
            StorageError::Constraint(db.to_string())
        }
        sqlx::Error::PoolClosed | sqlx::Error::Io(_) => StorageError::Connection,
        _ => StorageError::Query(err.to_string()),
    }
}

pub(crate) fn parse_uuid(s: &str, column: &str) -> Result<Uuid, StorageError> {
    Uuid::parse_str(s).map_err(|e| StorageError::Query(format!("invalid {column}: {e}")))
}

pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::Query(format!("invalid datetime: {e}")))
}

pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}
