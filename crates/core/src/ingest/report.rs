use serde::{Deserialize, Serialize};

/// Outcome of one ingestion run or batch update.
///
/// Source fetch failures (`failed_sources`) happen before parsing and are never
/// counted in `skipped_count`, which only covers records that were fetched but
/// not written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateReport {
    /// Records written inside the run's transaction.
    pub inserted_count: usize,
    /// Records rejected as unknown or whose write failed.
    pub skipped_count: usize,
    /// Records parsed from all sources.
    pub total_fetched: usize,
    pub sources_succeeded: usize,
    /// Labels of sources whose fetch failed, in source order.
    pub failed_sources: Vec<String>,
    /// Catalog ids not on the roster, in record order.
    pub unknown_catalog_ids: Vec<String>,
    /// True only after the transaction committed. When false, no row from
    /// this run is persisted regardless of `inserted_count`.
    pub committed: bool,
}

impl UpdateReport {
    /// Records that were skipped because their write failed rather than
    /// because their catalog id was unknown.
    pub fn write_failures(&self) -> usize {
        self.skipped_count
            .saturating_sub(self.unknown_catalog_ids.len())
    }

    /// Human-readable summary of a successful run or batch update.
    ///
    /// Batch updates fetch nothing, so the source count is left out for them.
    pub fn summary(&self) -> String {
        let mut message = format!("Successfully updated {} TLE record(s)", self.inserted_count);
        if self.sources_succeeded > 0 {
            message.push_str(&format!(" from {} source(s)", self.sources_succeeded));
        }
        if self.skipped_count > 0 {
            message.push_str(&format!(" ({} skipped)", self.skipped_count));
        }
        message
    }
}
