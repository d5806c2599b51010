use std::time::Duration;

use taskhub_shared::EntityKind;
use thiserror::Error;

/// Errors produced by the store layer.
///
/// A missing row is not an error: lookups return `Option` and deletes return
/// `bool`.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A single-statement read or write failed.
    #[error("{entity} {op} failed: {source}")]
    Query {
        entity: EntityKind,
        op: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    /// A multi-statement write failed and was rolled back.
    #[error("{entity} {op} rolled back: {source}")]
    RelationshipWrite {
        entity: EntityKind,
        op: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    /// The call ran past its deadline and was interrupted.
    #[error("{entity} {op} exceeded its {timeout:?} deadline")]
    Timeout {
        entity: EntityKind,
        op: &'static str,
        timeout: Duration,
    },

    /// SQLite error outside any entity operation (opening, pragmas).
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),
}

impl StoreError {
    pub fn entity(&self) -> Option<EntityKind> {
        match self {
            StoreError::Query { entity, .. }
            | StoreError::RelationshipWrite { entity, .. }
            | StoreError::Timeout { entity, .. } => Some(*entity),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, StoreError::Timeout { .. })
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
