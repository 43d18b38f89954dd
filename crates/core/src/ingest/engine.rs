//! The ingestion entry point shared by the background runner and the API.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::{write_matched, IngestError, UpdateReport};
use crate::metrics::{INGEST_DURATION, INGEST_RUNS, RECORDS_FETCHED, SOURCE_FETCHES};
use crate::records::ElementRecordStore;
use crate::satellites::SatelliteCatalog;
use crate::sources::{FetchError, SourceEndpoint, SourceFetcher, SourceStore};
use crate::tle::{parse_elements, OrbitalElementRecord};

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs TLE ingestion against explicit store and fetcher dependencies.
///
/// At most one run (or batch update) is in progress per engine; a concurrent
/// attempt fails with [`IngestError::AlreadyRunning`] instead of queueing.
pub struct IngestionEngine {
    sources: Arc<dyn SourceStore>,
    catalog: Arc<dyn SatelliteCatalog>,
    records: Arc<dyn ElementRecordStore>,
    fetcher: Arc<dyn SourceFetcher>,
    fetch_timeout: Duration,
    run_lock: Mutex<()>,
}

impl IngestionEngine {
    pub fn new(
        sources: Arc<dyn SourceStore>,
        catalog: Arc<dyn SatelliteCatalog>,
        records: Arc<dyn ElementRecordStore>,
        fetcher: Arc<dyn SourceFetcher>,
    ) -> Self {
        Self {
            sources,
            catalog,
            records,
            fetcher,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            run_lock: Mutex::new(()),
        }
    }

    /// Bound every source fetch by `timeout`, independently of the fetcher's own limits.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Fetch every configured source, then match and persist the parsed records.
    pub async fn run(&self) -> Result<UpdateReport, IngestError> {
        let _guard = self
            .run_lock
            .try_lock()
            .map_err(|_| IngestError::AlreadyRunning)?;

        let start = Instant::now();
        let result = self.fetch_and_write().await;
        observe_run(&result, start);
        result
    }

    /// Match and persist records supplied by a caller instead of fetched from sources.
    pub fn ingest_records(
        &self,
        records: &[OrbitalElementRecord],
    ) -> Result<UpdateReport, IngestError> {
        let _guard = self
            .run_lock
            .try_lock()
            .map_err(|_| IngestError::AlreadyRunning)?;

        let start = Instant::now();
        let report = UpdateReport {
            total_fetched: records.len(),
            ..Default::default()
        };
        let result = write_matched(records, self.catalog.as_ref(), self.records.as_ref(), report);
        observe_run(&result, start);
        result
    }

    async fn fetch_and_write(&self) -> Result<UpdateReport, IngestError> {
        let mut report = UpdateReport::default();

        let sources = self
            .sources
            .list_all()
            .map_err(|e| IngestError::SourceListing(e.to_string()))?;

        if sources.is_empty() {
            warn!("No TLE sources configured");
            return Err(IngestError::NoSourcesConfigured { report });
        }

        info!(sources = sources.len(), "Starting TLE ingestion");

        let outcomes = join_all(sources.iter().map(|s| self.fetch_source(s))).await;

        let mut candidates = Vec::new();
        for (source, outcome) in sources.iter().zip(outcomes) {
            match outcome {
                Ok(records) => {
                    info!(
                        source = %source.label,
                        records = records.len(),
                        "Fetched TLE source"
                    );
                    SOURCE_FETCHES
                        .with_label_values(&[&source.label, "success"])
                        .inc();
                    report.sources_succeeded += 1;
                    candidates.extend(records);
                }
                Err(e) => {
                    warn!(
                        source = %source.label,
                        url = %source.url,
                        error = %e,
                        "Failed to fetch TLE source"
                    );
                    SOURCE_FETCHES
                        .with_label_values(&[&source.label, "failure"])
                        .inc();
                    report.failed_sources.push(source.label.clone());
                }
            }
        }

        report.total_fetched = candidates.len();
        RECORDS_FETCHED.inc_by(candidates.len() as u64);

        if candidates.is_empty() {
            warn!(
                failed_sources = ?report.failed_sources,
                "No TLE data fetched from any source"
            );
            return Err(IngestError::NoDataFetched { report });
        }

        write_matched(
            &candidates,
            self.catalog.as_ref(),
            self.records.as_ref(),
            report,
        )
    }

    async fn fetch_source(
        &self,
        source: &SourceEndpoint,
    ) -> Result<Vec<OrbitalElementRecord>, FetchError> {
        let body = tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch(&source.url))
            .await
            .map_err(|_| FetchError::Timeout)??;
        Ok(parse_elements(&body).collect())
    }
}

fn observe_run(result: &Result<UpdateReport, IngestError>, start: Instant) {
    let label = match result {
        Ok(_) => "succeeded",
        Err(e) => e.metric_label(),
    };
    INGEST_RUNS.with_label_values(&[label]).inc();
    INGEST_DURATION
        .with_label_values(&[label])
        .observe(start.elapsed().as_secs_f64());
}
