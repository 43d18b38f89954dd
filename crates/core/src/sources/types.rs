//! Types for TLE source endpoints.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A network location publishing TLE text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEndpoint {
    pub id: i64,
    /// Short name used in reports and logs.
    pub label: String,
    pub url: String,
    pub description: String,
}

/// Request to register a source endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSource {
    pub label: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Source already registered: {0}")]
    Duplicate(String),
}
