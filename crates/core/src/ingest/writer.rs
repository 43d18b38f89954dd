//! Catalog matching and the transactional write of one batch.

use tracing::{debug, info, warn};

use super::{IngestError, UpdateReport};
use crate::metrics::{RECORDS_INSERTED, RECORDS_SKIPPED};
use crate::records::{ElementRecordStore, RecordError};
use crate::satellites::SatelliteCatalog;
use crate::tle::OrbitalElementRecord;

/// Match `records` against the roster and write the matches in one transaction.
///
/// Unknown catalog ids and failed inserts are counted as skips and never abort
/// the batch. If nothing was inserted the transaction is rolled back and
/// [`IngestError::ZeroInserted`] is returned; otherwise it is committed.
///
/// An insert that takes the whole transaction down ends the batch with
/// [`IngestError::TransactionFailed`] and nothing from it is persisted.
pub fn write_matched(
    records: &[OrbitalElementRecord],
    catalog: &dyn SatelliteCatalog,
    store: &dyn ElementRecordStore,
    mut report: UpdateReport,
) -> Result<UpdateReport, IngestError> {
    let mut tx = match store.begin() {
        Ok(tx) => tx,
        Err(e) => {
            return Err(IngestError::TransactionFailed {
                report,
                message: e.to_string(),
            })
        }
    };

    for record in records {
        match catalog.exists(&record.catalog_id) {
            Ok(true) => {}
            Ok(false) => {
                debug!(
                    catalog_id = %record.catalog_id,
                    "Satellite not on roster, skipping TLE"
                );
                report.skipped_count += 1;
                report.unknown_catalog_ids.push(record.catalog_id.clone());
                RECORDS_SKIPPED
                    .with_label_values(&["unknown_catalog_id"])
                    .inc();
                continue;
            }
            Err(e) => {
                warn!(
                    catalog_id = %record.catalog_id,
                    error = %e,
                    "Failed to check satellite existence, skipping TLE"
                );
                report.skipped_count += 1;
                RECORDS_SKIPPED.with_label_values(&["write_failed"]).inc();
                continue;
            }
        }

        match tx.insert(record) {
            Ok(_) => report.inserted_count += 1,
            Err(RecordError::Aborted(message)) => {
                warn!(
                    catalog_id = %record.catalog_id,
                    error = %message,
                    "TLE transaction aborted by the database"
                );
                return Err(IngestError::TransactionFailed { report, message });
            }
            Err(e) => {
                warn!(
                    catalog_id = %record.catalog_id,
                    error = %e,
                    "Failed to insert TLE, skipping"
                );
                report.skipped_count += 1;
                RECORDS_SKIPPED.with_label_values(&["write_failed"]).inc();
            }
        }
    }

    if report.inserted_count == 0 {
        if let Err(e) = tx.rollback() {
            warn!(error = %e, "Failed to roll back empty TLE transaction");
        }
        return Err(IngestError::ZeroInserted { report });
    }

    if let Err(e) = tx.commit() {
        return Err(IngestError::CommitFailed {
            report,
            message: e.to_string(),
        });
    }

    report.committed = true;
    RECORDS_INSERTED.inc_by(report.inserted_count as u64);
    info!(
        inserted = report.inserted_count,
        skipped = report.skipped_count,
        "TLE transaction committed"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockRecordStore, MockSatelliteCatalog};

    fn batch(ids: &[&str]) -> Vec<OrbitalElementRecord> {
        ids.iter().map(|id| fixtures::element_record(id)).collect()
    }

    #[test]
    fn test_all_matched_records_committed() {
        let catalog = MockSatelliteCatalog::with_ids(&["25544", "43013"]);
        let store = MockRecordStore::new();

        let report = write_matched(
            &batch(&["25544", "43013"]),
            &catalog,
            &store,
            UpdateReport::default(),
        )
        .unwrap();

        assert_eq!(report.inserted_count, 2);
        assert_eq!(report.skipped_count, 0);
        assert!(report.committed);
        assert_eq!(store.committed_records().len(), 2);
    }

    #[test]
    fn test_unknown_ids_skipped_and_listed() {
        let catalog = MockSatelliteCatalog::with_ids(&["25544"]);
        let store = MockRecordStore::new();

        let report = write_matched(
            &batch(&["11111", "25544", "22222"]),
            &catalog,
            &store,
            UpdateReport::default(),
        )
        .unwrap();

        assert_eq!(report.inserted_count, 1);
        assert_eq!(report.skipped_count, 2);
        assert_eq!(report.unknown_catalog_ids, vec!["11111", "22222"]);
        assert_eq!(store.committed_records()[0].catalog_id, "25544");
    }

    #[test]
    fn test_insert_failure_skips_row_but_commits_rest() {
        let catalog = MockSatelliteCatalog::with_ids(&["25544", "43013"]);
        let store = MockRecordStore::new();
        store.fail_inserts_for("43013");

        let report = write_matched(
            &batch(&["25544", "43013"]),
            &catalog,
            &store,
            UpdateReport::default(),
        )
        .unwrap();

        assert_eq!(report.inserted_count, 1);
        assert_eq!(report.skipped_count, 1);
        assert!(report.unknown_catalog_ids.is_empty());
        assert_eq!(report.write_failures(), 1);
        assert_eq!(store.committed_records().len(), 1);
    }

    #[test]
    fn test_catalog_lookup_failure_counts_as_write_skip() {
        let catalog = MockSatelliteCatalog::with_ids(&["25544"]);
        catalog.set_failing(true);
        let store = MockRecordStore::new();

        let err = write_matched(
            &batch(&["25544"]),
            &catalog,
            &store,
            UpdateReport::default(),
        )
        .unwrap_err();

        let report = err.report().unwrap();
        assert_eq!(report.skipped_count, 1);
        assert!(report.unknown_catalog_ids.is_empty());
    }

    #[test]
    fn test_zero_inserted_rolls_back() {
        let catalog = MockSatelliteCatalog::with_ids(&[]);
        let store = MockRecordStore::new();

        let err = write_matched(
            &batch(&["11111", "22222", "33333"]),
            &catalog,
            &store,
            UpdateReport::default(),
        )
        .unwrap_err();

        match err {
            IngestError::ZeroInserted { report } => {
                assert_eq!(report.skipped_count, 3);
                assert_eq!(report.unknown_catalog_ids, vec!["11111", "22222", "33333"]);
                assert!(!report.committed);
            }
            other => panic!("expected ZeroInserted, got {other:?}"),
        }
        assert_eq!(store.rollbacks(), 1);
        assert!(store.committed_records().is_empty());
    }

    #[test]
    fn test_commit_failure_is_fatal_and_not_committed() {
        let catalog = MockSatelliteCatalog::with_ids(&["25544"]);
        let store = MockRecordStore::new();
        store.fail_commit(true);

        let err = write_matched(
            &batch(&["25544"]),
            &catalog,
            &store,
            UpdateReport::default(),
        )
        .unwrap_err();

        match err {
            IngestError::CommitFailed { report, .. } => {
                assert_eq!(report.inserted_count, 1);
                assert!(!report.committed);
            }
            other => panic!("expected CommitFailed, got {other:?}"),
        }
        assert!(store.committed_records().is_empty());
    }

    #[test]
    fn test_begin_failure_is_transaction_failed() {
        let catalog = MockSatelliteCatalog::with_ids(&["25544"]);
        let store = MockRecordStore::new();
        store.fail_begin(true);

        let err = write_matched(
            &batch(&["25544"]),
            &catalog,
            &store,
            UpdateReport::default(),
        )
        .unwrap_err();
        assert!(matches!(err, IngestError::TransactionFailed { .. }));
    }

    #[test]
    fn test_aborted_transaction_stops_batch() {
        let catalog = MockSatelliteCatalog::with_ids(&["25544", "43013", "48274"]);
        let store = MockRecordStore::new();
        store.abort_on_insert("43013");

        let err = write_matched(
            &batch(&["25544", "43013", "48274"]),
            &catalog,
            &store,
            UpdateReport::default(),
        )
        .unwrap_err();

        match err {
            IngestError::TransactionFailed { report, .. } => {
                assert_eq!(report.inserted_count, 1);
                assert_eq!(report.skipped_count, 0);
                assert!(!report.committed);
            }
            other => panic!("expected TransactionFailed, got {other:?}"),
        }
        assert_eq!(store.inserts_attempted(), 2);
        assert!(store.committed_records().is_empty());
    }

    #[test]
    fn test_full_sqlite_database_persists_nothing() {
        use crate::records::SqliteRecordStore;

        let catalog = MockSatelliteCatalog::with_ids(&["1", "2", "3"]);
        let store = SqliteRecordStore::in_memory().unwrap();
        // Room for the schema and a few small rows only.
        store.set_max_page_count(20);

        let mut records = batch(&["1", "2", "3"]);
        records[1].line1 = format!("{}{}", records[1].line1, " ".repeat(200 * 1024));

        let err = write_matched(&records, &catalog, &store, UpdateReport::default())
            .unwrap_err();

        assert!(matches!(err, IngestError::TransactionFailed { .. }));
        assert!(!err.report().unwrap().committed);
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_against_sqlite_stores() {
        use crate::records::SqliteRecordStore;
        use crate::satellites::{NewSatellite, SqliteSatelliteCatalog};

        let catalog = SqliteSatelliteCatalog::in_memory().unwrap();
        catalog
            .add(&NewSatellite {
                catalog_id: "25544".into(),
                name: "ISS".into(),
                hex_color: "#ffffff".into(),
            })
            .unwrap();
        let store = SqliteRecordStore::in_memory().unwrap();

        let report = write_matched(
            &batch(&["25544", "99999", "25544"]),
            &catalog,
            &store,
            UpdateReport::default(),
        )
        .unwrap();

        assert_eq!(report.inserted_count, 2);
        assert_eq!(report.unknown_catalog_ids, vec!["99999"]);
        assert_eq!(store.count().unwrap(), 2);
    }
}
