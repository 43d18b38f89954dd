//! TLE ingestion: fetch every source, parse, match against the roster and
//! persist the matches in one transaction.
//!
//! ```text
//! sources ──► fetch ─► parse ──┐
//!         ──► fetch ─► parse ──┼─► match + write (one transaction) ─► UpdateReport
//!         ──► fetch ─► parse ──┘
//! ```
//!
//! A failing source or an unmatched record never aborts a run. Only the
//! run-level failures in [`IngestError`] do, and each carries the report
//! accumulated up to that point.

mod engine;
mod error;
mod report;
mod scheduler;
mod writer;

pub use engine::IngestionEngine;
pub use error::{FailureCategory, IngestError};
pub use report::UpdateReport;
pub use scheduler::{log_outcome, IngestScheduler};
pub use writer::write_matched;
