//! TLE source endpoints and the fetcher that downloads them.
//!
//! Sources are read once at the start of every ingestion run. Each fetch is
//! independent: a failing endpoint is reported against its own label and never
//! affects the others.

mod fetcher;
mod sqlite;
mod types;

pub use fetcher::{FetchError, HttpFetcher, SourceFetcher};
pub use sqlite::SqliteSourceStore;
pub use types::*;

/// Trait for source endpoint storage.
pub trait SourceStore: Send + Sync {
    /// List every configured endpoint, ordered by id.
    fn list_all(&self) -> Result<Vec<SourceEndpoint>, SourceError>;

    /// Register a new endpoint. Fails with [`SourceError::Duplicate`] if the URL is taken.
    fn add(&self, source: &NewSource) -> Result<SourceEndpoint, SourceError>;

    /// Look up an endpoint by URL.
    fn find_by_url(&self, url: &str) -> Result<Option<SourceEndpoint>, SourceError>;
}
