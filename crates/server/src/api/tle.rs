//! TLE record API handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Response,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{error, info};

use satplan_core::{ingest::log_outcome, OrbitalElementRecord};

use super::response::{error, ingest_failure, invalid_body, ok};
use crate::state::AppState;

/// Number of records returned by the listing endpoint.
const RECENT_LIMIT: i64 = 100;

/// One record in a batch update request.
#[derive(Debug, Deserialize)]
pub struct ElementRecordInput {
    pub catalog_id: String,
    /// Defaults to the time the request is handled.
    #[serde(default)]
    pub captured_at: Option<DateTime<Utc>>,
    pub line1: String,
    pub line2: String,
}

impl ElementRecordInput {
    /// Normalize into a record, or describe why the input is not a TLE.
    ///
    /// Catalog ids lose their leading zeros, matching the roster and the parser.
    fn into_record(self, now: DateTime<Utc>) -> Result<OrbitalElementRecord, &'static str> {
        let catalog_id = self
            .catalog_id
            .trim()
            .parse::<u64>()
            .map_err(|_| "catalog id must be a non-negative integer")?;

        let line1 = self.line1.trim();
        if !line1.starts_with("1 ") {
            return Err("line1 must start with \"1 \"");
        }
        let line2 = self.line2.trim();
        if !line2.starts_with("2 ") {
            return Err("line2 must start with \"2 \"");
        }

        Ok(OrbitalElementRecord {
            catalog_id: catalog_id.to_string(),
            captured_at: self.captured_at.unwrap_or(now),
            line1: line1.to_string(),
            line2: line2.to_string(),
        })
    }
}

/// GET /api/v1/tle
///
/// The most recent stored records, newest first.
pub async fn list_recent(State(state): State<Arc<AppState>>) -> Response {
    match state.records().recent(RECENT_LIMIT) {
        Ok(records) => ok("TLE data retrieved successfully", records),
        Err(e) => error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to query TLE data: {}", e),
        ),
    }
}

/// GET /api/v1/tle/satellite/{catalog_id}
pub async fn by_satellite(
    State(state): State<Arc<AppState>>,
    Path(catalog_id): Path<String>,
) -> Response {
    match state.records().by_catalog_id(&catalog_id) {
        Ok(records) => ok("TLE data retrieved successfully", records),
        Err(e) => error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to query TLE data: {}", e),
        ),
    }
}

/// DELETE /api/v1/tle/{id}
pub async fn delete_record(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Response {
    match state.records().delete(id) {
        Ok(true) => {
            info!(id, "Deleted TLE record");
            ok("TLE deleted successfully", serde_json::json!({ "id": id }))
        }
        Ok(false) => error(StatusCode::NOT_FOUND, "TLE not found"),
        Err(e) => error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to delete TLE: {}", e),
        ),
    }
}

/// POST /api/v1/tle/update
///
/// Match and store records supplied in the request body.
pub async fn update_batch(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Vec<ElementRecordInput>>, JsonRejection>,
) -> Response {
    let Json(inputs) = match body {
        Ok(body) => body,
        Err(rejection) => return invalid_body(rejection),
    };

    if inputs.is_empty() {
        return error(StatusCode::BAD_REQUEST, "No TLE data provided");
    }

    let now = Utc::now();
    let mut records = Vec::with_capacity(inputs.len());
    for (index, input) in inputs.into_iter().enumerate() {
        match input.into_record(now) {
            Ok(record) => records.push(record),
            Err(reason) => {
                return error(
                    StatusCode::BAD_REQUEST,
                    format!("Invalid TLE record at index {}: {}", index, reason),
                )
            }
        }
    }

    match state.engine().ingest_records(&records) {
        Ok(report) => {
            info!(
                inserted = report.inserted_count,
                skipped = report.skipped_count,
                "Batch TLE update committed"
            );
            let message = report.summary();
            ok(message, report)
        }
        Err(e) => {
            error!(error = %e, "Batch TLE update failed");
            ingest_failure(e)
        }
    }
}

/// POST /api/v1/tle/auto-update
///
/// Fetch every configured source now and wait for the result.
pub async fn auto_update(State(state): State<Arc<AppState>>) -> Response {
    let result = state.engine().run().await;
    log_outcome(&result);

    match result {
        Ok(report) => {
            let message = report.summary();
            ok(message, report)
        }
        Err(e) => ingest_failure(e),
    }
}
