//! SQLite-backed satellite roster.

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use rusqlite::{params, Connection};

use super::{NewSatellite, Satellite, SatelliteCatalog, SatelliteError};

/// SQLite-backed satellite roster.
pub struct SqliteSatelliteCatalog {
    conn: Mutex<Connection>,
}

impl SqliteSatelliteCatalog {
    /// Create a new SQLite roster, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, SatelliteError> {
        let conn = Connection::open(path).map_err(|e| SatelliteError::Database(e.to_string()))?;
        // Membership lookups run while the record store holds its write transaction.
        conn.busy_timeout(Duration::from_secs(5))
            .map_err(|e| SatelliteError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite roster (useful for testing).
    pub fn in_memory() -> Result<Self, SatelliteError> {
        let conn =
            Connection::open_in_memory().map_err(|e| SatelliteError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), SatelliteError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS satellite (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                catalog_id TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                hex_color TEXT NOT NULL DEFAULT '#ffffff'
            );
            "#,
        )
        .map_err(|e| SatelliteError::Database(e.to_string()))?;

        Ok(())
    }
}

impl SatelliteCatalog for SqliteSatelliteCatalog {
    fn exists(&self, catalog_id: &str) -> Result<bool, SatelliteError> {
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM satellite WHERE catalog_id = ?)",
            params![catalog_id],
            |row| row.get(0),
        )
        .map_err(|e| SatelliteError::Database(e.to_string()))
    }

    fn list(&self) -> Result<Vec<Satellite>, SatelliteError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare("SELECT id, catalog_id, name, hex_color FROM satellite ORDER BY name")
            .map_err(|e| SatelliteError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(Satellite {
                    id: row.get(0)?,
                    catalog_id: row.get(1)?,
                    name: row.get(2)?,
                    hex_color: row.get(3)?,
                })
            })
            .map_err(|e| SatelliteError::Database(e.to_string()))?;

        let mut satellites = Vec::new();
        for row in rows {
            satellites.push(row.map_err(|e| SatelliteError::Database(e.to_string()))?);
        }
        Ok(satellites)
    }

    fn add(&self, satellite: &NewSatellite) -> Result<Satellite, SatelliteError> {
        let conn = self.conn.lock().unwrap();

        let result = conn.execute(
            "INSERT INTO satellite (catalog_id, name, hex_color) VALUES (?, ?, ?)",
            params![satellite.catalog_id, satellite.name, satellite.hex_color],
        );

        match result {
            Ok(_) => Ok(Satellite {
                id: conn.last_insert_rowid(),
                catalog_id: satellite.catalog_id.clone(),
                name: satellite.name.clone(),
                hex_color: satellite.hex_color.clone(),
            }),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(SatelliteError::Duplicate(satellite.catalog_id.clone()))
            }
            Err(e) => Err(SatelliteError::Database(e.to_string())),
        }
    }

    fn count(&self) -> Result<i64, SatelliteError> {
        let conn = self.conn.lock().unwrap();

        conn.query_row("SELECT COUNT(*) FROM satellite", [], |row| row.get(0))
            .map_err(|e| SatelliteError::Database(e.to_string()))
    }
}
