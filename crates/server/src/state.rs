use std::sync::Arc;

use satplan_core::{
    Config, ElementRecordStore, IngestionEngine, SanitizedConfig, SatelliteCatalog, SourceStore,
};

/// Shared application state
pub struct AppState {
    config: Config,
    engine: Arc<IngestionEngine>,
    sources: Arc<dyn SourceStore>,
    catalog: Arc<dyn SatelliteCatalog>,
    records: Arc<dyn ElementRecordStore>,
}

impl AppState {
    pub fn new(
        config: Config,
        engine: Arc<IngestionEngine>,
        sources: Arc<dyn SourceStore>,
        catalog: Arc<dyn SatelliteCatalog>,
        records: Arc<dyn ElementRecordStore>,
    ) -> Self {
        Self {
            config,
            engine,
            sources,
            catalog,
            records,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn engine(&self) -> &IngestionEngine {
        self.engine.as_ref()
    }

    pub fn sources(&self) -> &dyn SourceStore {
        self.sources.as_ref()
    }

    pub fn catalog(&self) -> &dyn SatelliteCatalog {
        self.catalog.as_ref()
    }

    pub fn records(&self) -> &dyn ElementRecordStore {
        self.records.as_ref()
    }
}
