//! Database connection management.
//!
//! The [`Database`] struct owns a [`rusqlite::Connection`] and guarantees that
//! migrations are run before any other operation. Every entity operation goes
//! through [`Database::run`] or [`Database::transact`], which put the call
//! under the configured deadline and attach the entity and operation name to
//! any failure.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use directories::ProjectDirs;
use rusqlite::{Connection, ErrorCode, Transaction};
use taskhub_shared::EntityKind;

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::migrations;

/// VM instructions between deadline checks.
const PROGRESS_STEP: i32 = 100;

/// Wrapper around a [`rusqlite::Connection`].
pub struct Database {
    conn: Connection,
    query_timeout: Duration,
}

impl Database {
    /// Open (or create) the default application database.
    ///
    /// The database file is placed in the platform-appropriate data directory:
    /// - Linux:   `~/.local/share/taskhub/taskhub.db`
    /// - macOS:   `~/Library/Application Support/com.taskhub.taskhub/taskhub.db`
    /// - Windows: `{FOLDERID_RoamingAppData}\taskhub\taskhub\data\taskhub.db`
    pub fn new() -> Result<Self> {
        Self::open(&StoreConfig::default())
    }

    /// Open the database described by `config`.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let db_path = match &config.db_path {
            Some(path) => path.clone(),
            None => {
                let project_dirs = ProjectDirs::from("com", "taskhub", "taskhub")
                    .ok_or(StoreError::NoDataDir)?;
                let data_dir = project_dirs.data_dir();
                std::fs::create_dir_all(data_dir)?;
                data_dir.join("taskhub.db")
            }
        };

        tracing::info!(path = %db_path.display(), "opening database");

        let conn = Connection::open(&db_path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::init(conn, config)
    }

    /// Open (or create) a database at an explicit path with default settings.
    ///
    /// This is useful for tests and for embedding the store inside custom
    /// directory layouts.
    pub fn open_at(path: &Path) -> Result<Self> {
        Self::open(&StoreConfig {
            db_path: Some(path.to_path_buf()),
            ..StoreConfig::default()
        })
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?, &StoreConfig::default())
    }

    fn init(conn: Connection, config: &StoreConfig) -> Result<Self> {
        // Join rows must never outlive their parents.
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(config.busy_timeout)?;

        migrations::run_migrations(&conn)?;

        Ok(Self {
            conn,
            query_timeout: config.query_timeout,
        })
    }

    /// Return a reference to the underlying `rusqlite::Connection`.
    ///
    /// Statements issued directly on it bypass the deadline and the error
    /// context; callers should prefer the typed helpers.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Return the filesystem path of the open database (if any).
    pub fn path(&self) -> Option<PathBuf> {
        self.conn.path().map(PathBuf::from)
    }

    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    pub fn set_query_timeout(&mut self, timeout: Duration) {
        self.query_timeout = timeout;
    }

    /// Run a single-statement operation under the deadline.
    pub(crate) fn run<T, F>(&self, entity: EntityKind, op: &'static str, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let _deadline = Deadline::arm(&self.conn, self.query_timeout);
        f(&self.conn).map_err(|e| self.classify(entity, op, false, e))
    }

    /// Run `f` inside one transaction.
    ///
    /// Commits when `f` succeeds. On any error the transaction is rolled back
    /// before the error is returned as [`StoreError::RelationshipWrite`] (or
    /// [`StoreError::Timeout`]). If `f` panics the transaction is rolled back
    /// when it is dropped.
    pub(crate) fn transact<T, F>(&self, entity: EntityKind, op: &'static str, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> rusqlite::Result<T>,
    {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| self.classify(entity, op, true, e))?;

        let outcome = {
            let _deadline = Deadline::arm(&self.conn, self.query_timeout);
            f(&tx)
        };

        match outcome {
            Ok(value) => {
                tx.commit().map_err(|e| self.classify(entity, op, true, e))?;
                tracing::debug!(%entity, op, "transaction committed");
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    tracing::error!(%entity, op, error = %rollback_err, "rollback failed");
                }
                tracing::warn!(%entity, op, error = %err, "transaction rolled back");
                Err(self.classify(entity, op, true, err))
            }
        }
    }

    fn classify(
        &self,
        entity: EntityKind,
        op: &'static str,
        transactional: bool,
        source: rusqlite::Error,
    ) -> StoreError {
        if is_interrupt(&source) {
            tracing::warn!(%entity, op, timeout = ?self.query_timeout, "deadline exceeded");
            StoreError::Timeout {
                entity,
                op,
                timeout: self.query_timeout,
            }
        } else if transactional {
            StoreError::RelationshipWrite { entity, op, source }
        } else {
            StoreError::Query { entity, op, source }
        }
    }
}

fn is_interrupt(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::OperationInterrupted
    )
}

/// Interrupts statements on `conn` once the deadline passes. Disarmed on drop.
struct Deadline<'a> {
    conn: &'a Connection,
}

impl<'a> Deadline<'a> {
    fn arm(conn: &'a Connection, timeout: Duration) -> Self {
        if let Some(deadline) = Instant::now().checked_add(timeout) {
            conn.progress_handler(PROGRESS_STEP, Some(move || Instant::now() >= deadline));
        }
        Self { conn }
    }
}

impl Drop for Deadline<'_> {
    fn drop(&mut self) {
        self.conn.progress_handler(0, None::<fn() -> bool>);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");

        let db = Database::open_at(&path).expect("should open");
        assert!(db.path().is_some());

        let version: u32 = db
            .conn()
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, migrations::CURRENT_VERSION);
    }

    #[test]
    fn reopen_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");

        drop(Database::open_at(&path).unwrap());
        assert!(Database::open_at(&path).is_ok());
    }

    #[test]
    fn foreign_keys_enforced() {
        let db = Database::open_in_memory().unwrap();
        let on: i64 = db
            .conn()
            .pragma_query_value(None, "foreign_keys", |row| row.get(0))
            .unwrap();
        assert_eq!(on, 1);
    }

    #[test]
    fn failed_transaction_leaves_no_open_transaction() {
        let db = Database::open_in_memory().unwrap();

        let err = db
            .transact(EntityKind::Task, "test", |tx| {
                tx.execute_batch("CREATE TABLE scratch (x INTEGER)")?;
                tx.execute("INSERT INTO missing_table VALUES (1)", [])?;
                Ok(())
            })
            .unwrap_err();

        assert!(matches!(err, StoreError::RelationshipWrite { entity: EntityKind::Task, .. }));
        assert!(db.conn().is_autocommit());

        // The DDL in the failed transaction was rolled back too.
        let exists: i64 = db
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE name = 'scratch'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(exists, 0);
    }

    #[test]
    fn expired_deadline_interrupts() {
        let mut db = Database::open_in_memory().unwrap();
        db.set_query_timeout(Duration::ZERO);

        let err = db
            .run(EntityKind::Task, "spin", |conn| {
                conn.query_row(
                    "WITH RECURSIVE n(i) AS (
                         SELECT 1 UNION ALL SELECT i + 1 FROM n WHERE i < 1000000
                     )
                     SELECT COUNT(*) FROM n",
                    [],
                    |row| row.get::<_, i64>(0),
                )
            })
            .unwrap_err();
        assert!(err.is_timeout());

        // The handler is gone once the call returns.
        db.set_query_timeout(Duration::from_secs(5));
        assert!(db.run(EntityKind::Task, "ping", |c| c.execute_batch("SELECT 1")).is_ok());
    }
}
