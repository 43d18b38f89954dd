use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A tracked object on the local roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Satellite {
    pub id: i64,
    pub catalog_id: String,
    pub name: String,
    pub hex_color: String,
}

/// Request to add a satellite to the roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSatellite {
    pub catalog_id: String,
    pub name: String,
    #[serde(default = "default_hex_color")]
    pub hex_color: String,
}

fn default_hex_color() -> String {
    "#ffffff".to_string()
}

#[derive(Debug, Error)]
pub enum SatelliteError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Satellite already exists: {0}")]
    Duplicate(String),
}
