//! Background ingestion: once at startup, then optionally on an interval.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info, warn};

use super::{FailureCategory, IngestError, IngestionEngine, UpdateReport};

/// Log the outcome of a background run. Nothing else is done with the report.
pub fn log_outcome(result: &Result<UpdateReport, IngestError>) {
    match result {
        Ok(report) => info!(
            inserted = report.inserted_count,
            skipped = report.skipped_count,
            total = report.total_fetched,
            sources_succeeded = report.sources_succeeded,
            failed_sources = ?report.failed_sources,
            unknown_catalog_ids = report.unknown_catalog_ids.len(),
            "{}",
            report.summary()
        ),
        Err(e) => match e.category() {
            FailureCategory::Infrastructure => {
                error!(report = ?e.report(), "TLE ingestion failed: {}", e)
            }
            FailureCategory::Rejected | FailureCategory::Busy => {
                warn!(report = ?e.report(), "TLE ingestion did not update anything: {}", e)
            }
        },
    }
}

/// Drives [`IngestionEngine::run`] without a caller waiting on the result.
pub struct IngestScheduler {
    engine: Arc<IngestionEngine>,
    run_on_startup: bool,
    interval: Option<Duration>,
}

impl IngestScheduler {
    pub fn new(engine: Arc<IngestionEngine>) -> Self {
        Self {
            engine,
            run_on_startup: true,
            interval: None,
        }
    }

    pub fn run_on_startup(mut self, enabled: bool) -> Self {
        self.run_on_startup = enabled;
        self
    }

    pub fn every(mut self, interval: Option<Duration>) -> Self {
        self.interval = interval;
        self
    }

    /// Whether starting this scheduler would do anything.
    pub fn is_active(&self) -> bool {
        self.run_on_startup || self.interval.is_some()
    }

    /// Spawn the background task.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            if self.run_on_startup {
                info!("Running startup TLE ingestion");
                log_outcome(&self.engine.run().await);
            }

            let Some(period) = self.interval else {
                return;
            };

            let Some(first_tick) = Instant::now().checked_add(period) else {
                warn!(
                    interval_secs = period.as_secs(),
                    "TLE ingestion interval out of range, periodic runs disabled"
                );
                return;
            };

            info!(
                interval_secs = period.as_secs(),
                "Scheduling periodic TLE ingestion"
            );
            let mut ticker = interval_at(first_tick, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                info!("Triggering scheduled TLE ingestion");
                log_outcome(&self.engine.run().await);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::ElementRecordStore;
    use crate::satellites::SatelliteCatalog;
    use crate::sources::{SourceFetcher, SourceStore};
    use crate::testing::{
        fixtures, MockFetcher, MockRecordStore, MockSatelliteCatalog, MockSourceStore,
    };

    fn engine_with(
        records: Arc<MockRecordStore>,
        fetcher: Arc<MockFetcher>,
    ) -> Arc<IngestionEngine> {
        let sources = Arc::new(MockSourceStore::new());
        sources.add_source("stations", "http://tle.test/stations.txt");
        fetcher.respond("http://tle.test/stations.txt", &fixtures::tle_text(&["25544"]));

        Arc::new(IngestionEngine::new(
            sources as Arc<dyn SourceStore>,
            Arc::new(MockSatelliteCatalog::with_ids(&["25544"])) as Arc<dyn SatelliteCatalog>,
            records as Arc<dyn ElementRecordStore>,
            fetcher as Arc<dyn SourceFetcher>,
        ))
    }

    #[tokio::test]
    async fn test_startup_run_only() {
        let records = Arc::new(MockRecordStore::new());
        let engine = engine_with(Arc::clone(&records), Arc::new(MockFetcher::new()));

        IngestScheduler::new(engine)
            .run_on_startup(true)
            .start()
            .await
            .unwrap();

        assert_eq!(records.committed_records().len(), 1);
    }

    #[tokio::test]
    async fn test_inactive_scheduler() {
        let records = Arc::new(MockRecordStore::new());
        let engine = engine_with(Arc::clone(&records), Arc::new(MockFetcher::new()));

        let scheduler = IngestScheduler::new(engine).run_on_startup(false).every(None);
        assert!(!scheduler.is_active());
        scheduler.start().await.unwrap();

        assert!(records.committed_records().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_runs() {
        let records = Arc::new(MockRecordStore::new());
        let fetcher = Arc::new(MockFetcher::new());
        let engine = engine_with(Arc::clone(&records), Arc::clone(&fetcher));

        let handle = IngestScheduler::new(engine)
            .run_on_startup(false)
            .every(Some(Duration::from_secs(60)))
            .start();

        tokio::time::sleep(Duration::from_secs(150)).await;
        handle.abort();

        assert_eq!(fetcher.requested_urls().len(), 2);
        assert_eq!(records.committed_records().len(), 2);
    }

    #[tokio::test]
    async fn test_out_of_range_interval_disables_periodic_runs() {
        let records = Arc::new(MockRecordStore::new());
        let engine = engine_with(Arc::clone(&records), Arc::new(MockFetcher::new()));

        IngestScheduler::new(engine)
            .run_on_startup(true)
            .every(Some(Duration::MAX))
            .start()
            .await
            .unwrap();

        assert_eq!(records.committed_records().len(), 1);
    }

    #[test]
    fn test_log_outcome_does_not_panic() {
        log_outcome(&Ok(UpdateReport::default()));
        log_outcome(&Err(IngestError::AlreadyRunning));
        log_outcome(&Err(IngestError::CommitFailed {
            report: UpdateReport::default(),
            message: "database is locked".into(),
        }));
    }
}
