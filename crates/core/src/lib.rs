pub mod config;
pub mod ingest;
pub mod metrics;
pub mod records;
pub mod satellites;
pub mod sources;
pub mod testing;
pub mod tle;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseConfig,
    IngestConfig, LogFormat, LoggingConfig, SanitizedConfig, ServerConfig, SourceSeed,
};
pub use ingest::{FailureCategory, IngestError, IngestScheduler, IngestionEngine, UpdateReport};
pub use records::{ElementRecordStore, RecordError, SqliteRecordStore};
pub use satellites::{NewSatellite, Satellite, SatelliteCatalog, SatelliteError, SqliteSatelliteCatalog};
pub use sources::{
    FetchError, HttpFetcher, NewSource, SourceEndpoint, SourceError, SourceFetcher, SourceStore,
    SqliteSourceStore,
};
pub use tle::{parse_elements, OrbitalElementRecord, StoredElementRecord};
