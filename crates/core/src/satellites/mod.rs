//! Roster of tracked satellites.
//!
//! Ingestion only asks one question of the roster: is this catalog id known?
//! Records for unknown ids are rejected during matching, not during parsing.

mod sqlite;
mod types;

pub use sqlite::SqliteSatelliteCatalog;
pub use types::*;

/// Trait for satellite roster storage.
pub trait SatelliteCatalog: Send + Sync {
    /// Check whether a satellite with this catalog id is on the roster.
    fn exists(&self, catalog_id: &str) -> Result<bool, SatelliteError>;

    /// List all satellites ordered by name.
    fn list(&self) -> Result<Vec<Satellite>, SatelliteError>;

    /// Add a satellite. Fails with [`SatelliteError::Duplicate`] if the catalog id is taken.
    fn add(&self, satellite: &NewSatellite) -> Result<Satellite, SatelliteError>;

    /// Number of satellites on the roster.
    fn count(&self) -> Result<i64, SatelliteError>;
}
