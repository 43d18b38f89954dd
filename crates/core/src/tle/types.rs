//! Types for orbital element records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One TLE set as read from a source, before it is persisted.
///
/// `line1` starts with `"1 "` and `line2` with `"2 "`; both come from the same
/// three-line block of the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrbitalElementRecord {
    /// NORAD catalog number with leading zeros removed.
    pub catalog_id: String,
    /// When the record was read.
    pub captured_at: DateTime<Utc>,
    pub line1: String,
    pub line2: String,
}

/// A persisted TLE row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredElementRecord {
    pub id: i64,
    #[serde(flatten)]
    pub record: OrbitalElementRecord,
}
