//! Satellite roster API handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use satplan_core::{NewSatellite, SatelliteError};

use super::response::{error, invalid_body, ok, ApiResponse};
use crate::state::AppState;

/// GET /api/v1/satellites
pub async fn list_satellites(State(state): State<Arc<AppState>>) -> Response {
    match state.catalog().list() {
        Ok(satellites) => ok("Satellites retrieved successfully", satellites),
        Err(e) => error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to query satellites: {}", e),
        ),
    }
}

/// POST /api/v1/satellites
pub async fn add_satellite(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewSatellite>, JsonRejection>,
) -> Response {
    let Json(mut satellite) = match body {
        Ok(body) => body,
        Err(rejection) => return invalid_body(rejection),
    };

    // Store ids the way the parser produces them, so "05" matches "1 00005U".
    match satellite.catalog_id.trim().parse::<u64>() {
        Ok(id) => satellite.catalog_id = id.to_string(),
        Err(_) => {
            return error(
                StatusCode::BAD_REQUEST,
                "Catalog id must be a non-negative integer",
            )
        }
    }

    match state.catalog().add(&satellite) {
        Ok(created) => {
            info!(catalog_id = %created.catalog_id, name = %created.name, "Added satellite");
            (
                StatusCode::CREATED,
                Json(ApiResponse::ok("Satellite added successfully", created)),
            )
                .into_response()
        }
        Err(SatelliteError::Duplicate(id)) => error(
            StatusCode::CONFLICT,
            format!("Satellite already exists: {}", id),
        ),
        Err(e) => error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to add satellite: {}", e),
        ),
    }
}
