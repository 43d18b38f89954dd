//! SQLite-backed source endpoint store.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use super::{NewSource, SourceEndpoint, SourceError, SourceStore};

/// SQLite-backed source endpoint store.
pub struct SqliteSourceStore {
    conn: Mutex<Connection>,
}

impl SqliteSourceStore {
    /// Create a new SQLite source store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, SourceError> {
        let conn = Connection::open(path).map_err(|e| SourceError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite source store (useful for testing).
    pub fn in_memory() -> Result<Self, SourceError> {
        let conn =
            Connection::open_in_memory().map_err(|e| SourceError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), SourceError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS tle_source (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                label TEXT NOT NULL,
                url TEXT NOT NULL UNIQUE,
                description TEXT NOT NULL DEFAULT ''
            );
            "#,
        )
        .map_err(|e| SourceError::Database(e.to_string()))?;

        Ok(())
    }

    fn row_to_source(row: &rusqlite::Row) -> rusqlite::Result<SourceEndpoint> {
        Ok(SourceEndpoint {
            id: row.get(0)?,
            label: row.get(1)?,
            url: row.get(2)?,
            description: row.get(3)?,
        })
    }
}

impl SourceStore for SqliteSourceStore {
    fn list_all(&self) -> Result<Vec<SourceEndpoint>, SourceError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare("SELECT id, label, url, description FROM tle_source ORDER BY id")
            .map_err(|e| SourceError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], Self::row_to_source)
            .map_err(|e| SourceError::Database(e.to_string()))?;

        let mut sources = Vec::new();
        for row in rows {
            sources.push(row.map_err(|e| SourceError::Database(e.to_string()))?);
        }
        Ok(sources)
    }

    fn add(&self, source: &NewSource) -> Result<SourceEndpoint, SourceError> {
        let conn = self.conn.lock().unwrap();

        let result = conn.execute(
            "INSERT INTO tle_source (label, url, description) VALUES (?, ?, ?)",
            params![source.label, source.url, source.description],
        );

        match result {
            Ok(_) => Ok(SourceEndpoint {
                id: conn.last_insert_rowid(),
                label: source.label.clone(),
                url: source.url.clone(),
                description: source.description.clone(),
            }),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(SourceError::Duplicate(source.url.clone()))
            }
            Err(e) => Err(SourceError::Database(e.to_string())),
        }
    }

    fn find_by_url(&self, url: &str) -> Result<Option<SourceEndpoint>, SourceError> {
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            "SELECT id, label, url, description FROM tle_source WHERE url = ?",
            params![url],
            Self::row_to_source,
        )
        .optional()
        .map_err(|e| SourceError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_source(label: &str, url: &str) -> NewSource {
        NewSource {
            label: label.to_string(),
            url: url.to_string(),
            description: format!("{} feed", label),
        }
    }

    #[test]
    fn test_empty_store_lists_nothing() {
        let store = SqliteSourceStore::in_memory().unwrap();
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_add_and_list_in_insertion_order() {
        let store = SqliteSourceStore::in_memory().unwrap();
        store
            .add(&new_source("stations", "https://tle.example.com/stations.txt"))
            .unwrap();
        store
            .add(&new_source("weather", "https://tle.example.com/weather.txt"))
            .unwrap();

        let sources = store.list_all().unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].label, "stations");
        assert_eq!(sources[0].description, "stations feed");
        assert_eq!(sources[1].label, "weather");
        assert!(sources[0].id < sources[1].id);
    }

    #[test]
    fn test_duplicate_url_rejected() {
        let store = SqliteSourceStore::in_memory().unwrap();
        let source = new_source("stations", "https://tle.example.com/stations.txt");
        store.add(&source).unwrap();

        let result = store.add(&source);
        assert!(matches!(result, Err(SourceError::Duplicate(_))));
        assert_eq!(store.list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_find_by_url() {
        let store = SqliteSourceStore::in_memory().unwrap();
        let added = store
            .add(&new_source("stations", "https://tle.example.com/stations.txt"))
            .unwrap();

        let found = store
            .find_by_url("https://tle.example.com/stations.txt")
            .unwrap();
        assert_eq!(found, Some(added));
        assert!(store.find_by_url("https://other").unwrap().is_none());
    }

    #[test]
    fn test_file_backed_store_persists() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("sources.db");
        {
            let store = SqliteSourceStore::new(&path).unwrap();
            store
                .add(&new_source("stations", "https://tle.example.com/stations.txt"))
                .unwrap();
        }
        let reopened = SqliteSourceStore::new(&path).unwrap();
        assert_eq!(reopened.list_all().unwrap().len(), 1);
    }
}
