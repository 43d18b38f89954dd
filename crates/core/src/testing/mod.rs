//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the store and fetcher traits,
//! so the ingestion engine can be exercised without a database or network.
//!
//! # Example
//!
//! ```rust,ignore
//! use satplan_core::testing::{fixtures, MockFetcher, MockSatelliteCatalog, MockSourceStore};
//!
//! let sources = MockSourceStore::new();
//! sources.add_source("stations", "http://tle.test/stations.txt");
//!
//! let fetcher = MockFetcher::new();
//! fetcher.respond("http://tle.test/stations.txt", &fixtures::tle_text(&["25544"]));
//!
//! let catalog = MockSatelliteCatalog::with_ids(&["25544"]);
//! ```

mod mock_fetcher;
mod mock_stores;

pub use mock_fetcher::MockFetcher;
pub use mock_stores::{MockRecordStore, MockSatelliteCatalog, MockSourceStore};

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::Utc;

    use crate::tle::OrbitalElementRecord;

    /// TLE line 1 for a catalog id, zero-padded to five digits.
    pub fn line1(catalog_id: &str) -> String {
        format!(
            "1 {:0>5}U 98067A   24001.50000000  .00016717  00000-0  10270-3 0  9005",
            catalog_id
        )
    }

    /// TLE line 2 for a catalog id, zero-padded to five digits.
    pub fn line2(catalog_id: &str) -> String {
        format!(
            "2 {:0>5}  51.6400 208.9163 0006317  69.9862  25.2906 15.49815322432264",
            catalog_id
        )
    }

    /// A parsed record for `catalog_id`.
    pub fn element_record(catalog_id: &str) -> OrbitalElementRecord {
        OrbitalElementRecord {
            catalog_id: catalog_id.to_string(),
            captured_at: Utc::now(),
            line1: line1(catalog_id),
            line2: line2(catalog_id),
        }
    }

    /// Source text with one well-formed three-line block per catalog id.
    pub fn tle_text(catalog_ids: &[&str]) -> String {
        catalog_ids
            .iter()
            .map(|id| format!("SAT-{}\n{}\n{}\n", id, line1(id), line2(id)))
            .collect()
    }
}
