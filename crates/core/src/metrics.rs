//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Ingestion runs (outcome, duration)
//! - Source fetches
//! - Record matching and writing

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Ingestion runs
// =============================================================================

/// Ingestion runs by outcome.
pub static INGEST_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("satplan_ingest_runs_total", "Total TLE ingestion runs"),
        &["result"], // "succeeded", "no_sources", "no_data", "zero_inserted", ...
    )
    .unwrap()
});

/// Ingestion run duration in seconds.
pub static INGEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "satplan_ingest_duration_seconds",
            "Duration of TLE ingestion runs",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["result"],
    )
    .unwrap()
});

// =============================================================================
// Sources
// =============================================================================

/// Source fetches by source label and result.
pub static SOURCE_FETCHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("satplan_source_fetches_total", "Total TLE source fetches"),
        &["source", "result"], // result: "success", "failure"
    )
    .unwrap()
});

// =============================================================================
// Records
// =============================================================================

/// Records parsed from fetched source text.
pub static RECORDS_FETCHED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "satplan_records_fetched_total",
        "TLE records parsed from sources",
    )
    .unwrap()
});

/// Records written inside a committed transaction.
pub static RECORDS_INSERTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "satplan_records_inserted_total",
        "TLE records persisted",
    )
    .unwrap()
});

/// Records skipped during matching and writing.
pub static RECORDS_SKIPPED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("satplan_records_skipped_total", "TLE records skipped"),
        &["reason"], // "unknown_catalog_id", "write_failed"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(INGEST_RUNS.clone()),
        Box::new(INGEST_DURATION.clone()),
        Box::new(SOURCE_FETCHES.clone()),
        Box::new(RECORDS_FETCHED.clone()),
        Box::new(RECORDS_INSERTED.clone()),
        Box::new(RECORDS_SKIPPED.clone()),
    ]
}
