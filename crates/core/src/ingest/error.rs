use thiserror::Error;

use super::UpdateReport;

/// Run-level ingestion failures.
///
/// Per-source and per-record problems are absorbed into [`UpdateReport`];
/// only these abort a run.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("No TLE sources configured")]
    NoSourcesConfigured { report: UpdateReport },

    #[error("No TLE data fetched from any source")]
    NoDataFetched { report: UpdateReport },

    #[error(
        "Failed to insert any TLE records. All {} records were skipped",
        .report.skipped_count
    )]
    ZeroInserted { report: UpdateReport },

    #[error("Failed to commit transaction: {message}")]
    CommitFailed {
        report: UpdateReport,
        message: String,
    },

    #[error("Transaction failed: {message}")]
    TransactionFailed {
        report: UpdateReport,
        message: String,
    },

    #[error("Failed to list TLE sources: {0}")]
    SourceListing(String),

    #[error("A TLE ingestion run is already in progress")]
    AlreadyRunning,
}

/// Who is responsible for a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    /// Nothing usable to ingest: no sources, no data, nothing matched.
    Rejected,
    /// Another run holds the store.
    Busy,
    /// The store itself failed.
    Infrastructure,
}

impl IngestError {
    /// The report accumulated before the failure, if the run got that far.
    pub fn report(&self) -> Option<&UpdateReport> {
        match self {
            IngestError::NoSourcesConfigured { report }
            | IngestError::NoDataFetched { report }
            | IngestError::ZeroInserted { report }
            | IngestError::CommitFailed { report, .. }
            | IngestError::TransactionFailed { report, .. } => Some(report),
            IngestError::SourceListing(_) | IngestError::AlreadyRunning => None,
        }
    }

    pub fn category(&self) -> FailureCategory {
        match self {
            IngestError::NoSourcesConfigured { .. }
            | IngestError::NoDataFetched { .. }
            | IngestError::ZeroInserted { .. } => FailureCategory::Rejected,
            IngestError::AlreadyRunning => FailureCategory::Busy,
            IngestError::CommitFailed { .. }
            | IngestError::TransactionFailed { .. }
            | IngestError::SourceListing(_) => FailureCategory::Infrastructure,
        }
    }

    /// Label used for the run outcome metric.
    pub fn metric_label(&self) -> &'static str {
        match self {
            IngestError::NoSourcesConfigured { .. } => "no_sources",
            IngestError::NoDataFetched { .. } => "no_data",
            IngestError::ZeroInserted { .. } => "zero_inserted",
            IngestError::CommitFailed { .. } => "commit_failed",
            IngestError::TransactionFailed { .. } => "transaction_failed",
            IngestError::SourceListing(_) => "source_listing_failed",
            IngestError::AlreadyRunning => "already_running",
        }
    }
}
