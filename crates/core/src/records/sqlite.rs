//! SQLite-backed TLE record store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use tracing::warn;

use super::{ElementRecordStore, RecordError, RecordTransaction};
use crate::tle::{OrbitalElementRecord, StoredElementRecord};

/// SQLite-backed TLE record store.
pub struct SqliteRecordStore {
    conn: Mutex<Connection>,
}

impl SqliteRecordStore {
    /// Create a new SQLite record store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, RecordError> {
        let conn = Connection::open(path).map_err(|e| RecordError::Database(e.to_string()))?;
        conn.busy_timeout(Duration::from_secs(5))
            .map_err(|e| RecordError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite record store (useful for testing).
    pub fn in_memory() -> Result<Self, RecordError> {
        let conn =
            Connection::open_in_memory().map_err(|e| RecordError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Cap the database size so tests can provoke SQLITE_FULL.
    #[cfg(test)]
    pub(crate) fn set_max_page_count(&self, pages: u32) {
        self.conn
            .lock()
            .unwrap()
            .query_row(&format!("PRAGMA max_page_count = {pages}"), [], |row| {
                row.get::<_, i64>(0)
            })
            .unwrap();
    }

    fn initialize_schema(conn: &Connection) -> Result<(), RecordError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS tle (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                catalog_id TEXT NOT NULL,
                captured_at TEXT NOT NULL,
                line1 TEXT NOT NULL,
                line2 TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_tle_catalog_id ON tle(catalog_id);
            CREATE INDEX IF NOT EXISTS idx_tle_captured_at ON tle(captured_at);
            "#,
        )
        .map_err(|e| RecordError::Database(e.to_string()))?;

        Ok(())
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<StoredElementRecord> {
        let captured_at_str: String = row.get(2)?;
        let captured_at = DateTime::parse_from_rfc3339(&captured_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    2,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?;

        Ok(StoredElementRecord {
            id: row.get(0)?,
            record: OrbitalElementRecord {
                catalog_id: row.get(1)?,
                captured_at,
                line1: row.get(3)?,
                line2: row.get(4)?,
            },
        })
    }

    fn query_records(
        conn: &Connection,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<StoredElementRecord>, RecordError> {
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| RecordError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params, Self::row_to_record)
            .map_err(|e| RecordError::Database(e.to_string()))?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(|e| RecordError::Database(e.to_string()))?);
        }
        Ok(records)
    }
}

impl ElementRecordStore for SqliteRecordStore {
    fn begin(&self) -> Result<Box<dyn RecordTransaction + '_>, RecordError> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch("BEGIN")
            .map_err(|e| RecordError::Transaction(e.to_string()))?;
        Ok(Box::new(SqliteRecordTransaction {
            conn,
            finished: false,
        }))
    }

    fn recent(&self, limit: i64) -> Result<Vec<StoredElementRecord>, RecordError> {
        let conn = self.conn.lock().unwrap();
        Self::query_records(
            &conn,
            "SELECT id, catalog_id, captured_at, line1, line2 FROM tle ORDER BY captured_at DESC, id DESC LIMIT ?",
            params![limit],
        )
    }

    fn by_catalog_id(&self, catalog_id: &str) -> Result<Vec<StoredElementRecord>, RecordError> {
        let conn = self.conn.lock().unwrap();
        Self::query_records(
            &conn,
            "SELECT id, catalog_id, captured_at, line1, line2 FROM tle WHERE catalog_id = ? ORDER BY captured_at DESC, id DESC",
            params![catalog_id],
        )
    }

    fn delete(&self, id: i64) -> Result<bool, RecordError> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn
            .execute("DELETE FROM tle WHERE id = ?", params![id])
            .map_err(|e| RecordError::Database(e.to_string()))?;
        Ok(deleted > 0)
    }

    fn count(&self) -> Result<i64, RecordError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM tle", [], |row| row.get(0))
            .map_err(|e| RecordError::Database(e.to_string()))
    }
}

/// Write transaction holding the store's connection for its whole lifetime.
struct SqliteRecordTransaction<'a> {
    conn: MutexGuard<'a, Connection>,
    finished: bool,
}

impl RecordTransaction for SqliteRecordTransaction<'_> {
    fn insert(&mut self, record: &OrbitalElementRecord) -> Result<i64, RecordError> {
        if self.finished {
            return Err(RecordError::Aborted("transaction is no longer active".into()));
        }

        let result = self.conn.execute(
            "INSERT INTO tle (catalog_id, captured_at, line1, line2) VALUES (?, ?, ?, ?)",
            params![
                record.catalog_id,
                record.captured_at.to_rfc3339(),
                record.line1,
                record.line2,
            ],
        );

        match result {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            // SQLite rolled back the whole transaction (SQLITE_FULL, IOERR, ...).
            Err(e) if self.conn.is_autocommit() => {
                self.finished = true;
                Err(RecordError::Aborted(e.to_string()))
            }
            Err(e) => Err(RecordError::Database(e.to_string())),
        }
    }

    fn commit(mut self: Box<Self>) -> Result<(), RecordError> {
        if self.finished {
            return Err(RecordError::Aborted("transaction is no longer active".into()));
        }
        self.finished = true;
        if let Err(e) = self.conn.execute_batch("COMMIT") {
            // A failed COMMIT can leave the transaction open.
            if !self.conn.is_autocommit() {
                let _ = self.conn.execute_batch("ROLLBACK");
            }
            return Err(RecordError::Transaction(e.to_string()));
        }
        Ok(())
    }

    fn rollback(mut self: Box<Self>) -> Result<(), RecordError> {
        self.finished = true;
        if self.conn.is_autocommit() {
            return Ok(());
        }
        self.conn
            .execute_batch("ROLLBACK")
            .map_err(|e| RecordError::Transaction(e.to_string()))
    }
}

impl Drop for SqliteRecordTransaction<'_> {
    fn drop(&mut self) {
        if !self.finished && !self.conn.is_autocommit() {
            if let Err(e) = self.conn.execute_batch("ROLLBACK") {
                warn!("Failed to roll back abandoned TLE transaction: {}", e);
            }
        }
    }
}
