//! Durable storage for ingested TLE records.
//!
//! Writes go through a [`RecordTransaction`]: one ingestion batch is one
//! transaction, and a failed insert inside it skips that row without aborting
//! the rest of the batch, unless the database aborted the whole transaction
//! ([`RecordError::Aborted`]).

mod sqlite;

pub use sqlite::SqliteRecordStore;

use thiserror::Error;

use crate::tle::{OrbitalElementRecord, StoredElementRecord};

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    /// The database rolled the open transaction back on its own. Every insert
    /// made so far is gone and the transaction can no longer be used.
    #[error("Transaction aborted: {0}")]
    Aborted(String),
}

/// An open write transaction.
///
/// Dropping a transaction without calling [`commit`](Self::commit) rolls it back.
pub trait RecordTransaction {
    /// Insert one record, returning its row id.
    ///
    /// Returns [`RecordError::Aborted`] when the failure took the whole
    /// transaction down; any other error affects only this row.
    fn insert(&mut self, record: &OrbitalElementRecord) -> Result<i64, RecordError>;

    /// Make every successful insert durable.
    fn commit(self: Box<Self>) -> Result<(), RecordError>;

    /// Discard every insert made in this transaction.
    fn rollback(self: Box<Self>) -> Result<(), RecordError>;
}

/// Trait for TLE record storage.
pub trait ElementRecordStore: Send + Sync {
    /// Open a write transaction. It holds the store exclusively until finished.
    fn begin(&self) -> Result<Box<dyn RecordTransaction + '_>, RecordError>;

    /// Most recent records across all satellites, newest first.
    fn recent(&self, limit: i64) -> Result<Vec<StoredElementRecord>, RecordError>;

    /// All records for one catalog id, newest first.
    fn by_catalog_id(&self, catalog_id: &str) -> Result<Vec<StoredElementRecord>, RecordError>;

    /// Delete a record. Returns false if no such row existed.
    fn delete(&self, id: i64) -> Result<bool, RecordError>;

    /// Total number of stored records.
    fn count(&self) -> Result<i64, RecordError>;
}
