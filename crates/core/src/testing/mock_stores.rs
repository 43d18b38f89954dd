//! In-memory store mocks for testing.

use std::collections::HashSet;
use std::sync::Mutex;

use crate::records::{ElementRecordStore, RecordError, RecordTransaction};
use crate::satellites::{NewSatellite, Satellite, SatelliteCatalog, SatelliteError};
use crate::sources::{NewSource, SourceEndpoint, SourceError, SourceStore};
use crate::tle::{OrbitalElementRecord, StoredElementRecord};

/// Mock implementation of the SourceStore trait.
#[derive(Debug, Default)]
pub struct MockSourceStore {
    sources: Mutex<Vec<SourceEndpoint>>,
    failing: Mutex<bool>,
}

impl MockSourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an endpoint directly.
    pub fn add_source(&self, label: &str, url: &str) {
        let mut sources = self.sources.lock().unwrap();
        let id = sources.len() as i64 + 1;
        sources.push(SourceEndpoint {
            id,
            label: label.to_string(),
            url: url.to_string(),
            description: String::new(),
        });
    }

    /// Make every call fail with a database error.
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    fn check(&self) -> Result<(), SourceError> {
        if *self.failing.lock().unwrap() {
            return Err(SourceError::Database("mock source store failure".into()));
        }
        Ok(())
    }
}

impl SourceStore for MockSourceStore {
    fn list_all(&self) -> Result<Vec<SourceEndpoint>, SourceError> {
        self.check()?;
        Ok(self.sources.lock().unwrap().clone())
    }

    fn add(&self, source: &NewSource) -> Result<SourceEndpoint, SourceError> {
        self.check()?;
        let mut sources = self.sources.lock().unwrap();
        if sources.iter().any(|s| s.url == source.url) {
            return Err(SourceError::Duplicate(source.url.clone()));
        }
        let endpoint = SourceEndpoint {
            id: sources.len() as i64 + 1,
            label: source.label.clone(),
            url: source.url.clone(),
            description: source.description.clone(),
        };
        sources.push(endpoint.clone());
        Ok(endpoint)
    }

    fn find_by_url(&self, url: &str) -> Result<Option<SourceEndpoint>, SourceError> {
        self.check()?;
        Ok(self
            .sources
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.url == url)
            .cloned())
    }
}

/// Mock implementation of the SatelliteCatalog trait.
#[derive(Debug, Default)]
pub struct MockSatelliteCatalog {
    satellites: Mutex<Vec<Satellite>>,
    failing: Mutex<bool>,
}

impl MockSatelliteCatalog {
    /// Roster containing one satellite per catalog id.
    pub fn with_ids(catalog_ids: &[&str]) -> Self {
        let catalog = Self::default();
        for id in catalog_ids {
            catalog.add_id(id);
        }
        catalog
    }

    pub fn add_id(&self, catalog_id: &str) {
        let mut satellites = self.satellites.lock().unwrap();
        let id = satellites.len() as i64 + 1;
        satellites.push(Satellite {
            id,
            catalog_id: catalog_id.to_string(),
            name: format!("SAT-{}", catalog_id),
            hex_color: "#ffffff".to_string(),
        });
    }

    /// Make every call fail with a database error.
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    fn check(&self) -> Result<(), SatelliteError> {
        if *self.failing.lock().unwrap() {
            return Err(SatelliteError::Database("mock catalog failure".into()));
        }
        Ok(())
    }
}

impl SatelliteCatalog for MockSatelliteCatalog {
    fn exists(&self, catalog_id: &str) -> Result<bool, SatelliteError> {
        self.check()?;
        Ok(self
            .satellites
            .lock()
            .unwrap()
            .iter()
            .any(|s| s.catalog_id == catalog_id))
    }

    fn list(&self) -> Result<Vec<Satellite>, SatelliteError> {
        self.check()?;
        let mut satellites = self.satellites.lock().unwrap().clone();
        satellites.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(satellites)
    }

    fn add(&self, satellite: &NewSatellite) -> Result<Satellite, SatelliteError> {
        self.check()?;
        let mut satellites = self.satellites.lock().unwrap();
        if satellites.iter().any(|s| s.catalog_id == satellite.catalog_id) {
            return Err(SatelliteError::Duplicate(satellite.catalog_id.clone()));
        }
        let added = Satellite {
            id: satellites.len() as i64 + 1,
            catalog_id: satellite.catalog_id.clone(),
            name: satellite.name.clone(),
            hex_color: satellite.hex_color.clone(),
        };
        satellites.push(added.clone());
        Ok(added)
    }

    fn count(&self) -> Result<i64, SatelliteError> {
        self.check()?;
        Ok(self.satellites.lock().unwrap().len() as i64)
    }
}

#[derive(Debug, Default)]
struct RecordState {
    committed: Vec<StoredElementRecord>,
    next_id: i64,
    begun: usize,
    rollbacks: usize,
    fail_begin: bool,
    fail_commit: bool,
    fail_inserts_for: HashSet<String>,
    abort_on_insert: HashSet<String>,
    inserts_attempted: usize,
}

/// Mock implementation of the ElementRecordStore trait.
///
/// Inserts are staged in the transaction and only become visible through
/// [`committed_records`](Self::committed_records) after a successful commit.
#[derive(Debug, Default)]
pub struct MockRecordStore {
    state: Mutex<RecordState>,
}

impl MockRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every insert of a record with this catalog id.
    pub fn fail_inserts_for(&self, catalog_id: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_inserts_for
            .insert(catalog_id.to_string());
    }

    /// Abort the whole transaction when a record with this catalog id is inserted.
    pub fn abort_on_insert(&self, catalog_id: &str) {
        self.state
            .lock()
            .unwrap()
            .abort_on_insert
            .insert(catalog_id.to_string());
    }

    pub fn fail_commit(&self, fail: bool) {
        self.state.lock().unwrap().fail_commit = fail;
    }

    pub fn fail_begin(&self, fail: bool) {
        self.state.lock().unwrap().fail_begin = fail;
    }

    /// Records made durable by committed transactions, in insert order.
    pub fn committed_records(&self) -> Vec<OrbitalElementRecord> {
        self.state
            .lock()
            .unwrap()
            .committed
            .iter()
            .map(|r| r.record.clone())
            .collect()
    }

    /// Number of explicit rollbacks.
    pub fn rollbacks(&self) -> usize {
        self.state.lock().unwrap().rollbacks
    }

    /// Number of insert calls made, successful or not.
    pub fn inserts_attempted(&self) -> usize {
        self.state.lock().unwrap().inserts_attempted
    }

    /// Number of transactions opened.
    pub fn begun(&self) -> usize {
        self.state.lock().unwrap().begun
    }
}

struct MockTransaction<'a> {
    store: &'a MockRecordStore,
    staged: Vec<OrbitalElementRecord>,
}

impl RecordTransaction for MockTransaction<'_> {
    fn insert(&mut self, record: &OrbitalElementRecord) -> Result<i64, RecordError> {
        let mut state = self.store.state.lock().unwrap();
        state.inserts_attempted += 1;
        if state.abort_on_insert.contains(&record.catalog_id) {
            self.staged.clear();
            return Err(RecordError::Aborted(format!(
                "mock abort on {}",
                record.catalog_id
            )));
        }
        if state.fail_inserts_for.contains(&record.catalog_id) {
            return Err(RecordError::Database(format!(
                "mock insert failure for {}",
                record.catalog_id
            )));
        }
        state.next_id += 1;
        self.staged.push(record.clone());
        Ok(state.next_id)
    }

    fn commit(self: Box<Self>) -> Result<(), RecordError> {
        let mut state = self.store.state.lock().unwrap();
        if state.fail_commit {
            return Err(RecordError::Transaction("mock commit failure".into()));
        }
        let first_id = state.next_id - self.staged.len() as i64 + 1;
        for (offset, record) in self.staged.into_iter().enumerate() {
            state.committed.push(StoredElementRecord {
                id: first_id + offset as i64,
                record,
            });
        }
        Ok(())
    }

    fn rollback(self: Box<Self>) -> Result<(), RecordError> {
        self.store.state.lock().unwrap().rollbacks += 1;
        Ok(())
    }
}

impl ElementRecordStore for MockRecordStore {
    fn begin(&self) -> Result<Box<dyn RecordTransaction + '_>, RecordError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_begin {
            return Err(RecordError::Transaction("mock begin failure".into()));
        }
        state.begun += 1;
        Ok(Box::new(MockTransaction {
            store: self,
            staged: Vec::new(),
        }))
    }

    fn recent(&self, limit: i64) -> Result<Vec<StoredElementRecord>, RecordError> {
        let state = self.state.lock().unwrap();
        let mut records = state.committed.clone();
        records.sort_by(|a, b| b.record.captured_at.cmp(&a.record.captured_at));
        records.truncate(limit.max(0) as usize);
        Ok(records)
    }

    fn by_catalog_id(&self, catalog_id: &str) -> Result<Vec<StoredElementRecord>, RecordError> {
        let state = self.state.lock().unwrap();
        let mut records: Vec<_> = state
            .committed
            .iter()
            .filter(|r| r.record.catalog_id == catalog_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.record.captured_at.cmp(&a.record.captured_at));
        Ok(records)
    }

    fn delete(&self, id: i64) -> Result<bool, RecordError> {
        let mut state = self.state.lock().unwrap();
        let before = state.committed.len();
        state.committed.retain(|r| r.id != id);
        Ok(state.committed.len() != before)
    }

    fn count(&self) -> Result<i64, RecordError> {
        Ok(self.state.lock().unwrap().committed.len() as i64)
    }
}
