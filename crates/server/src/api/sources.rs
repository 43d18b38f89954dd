//! TLE source endpoint API handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use satplan_core::{NewSource, SourceError};

use super::response::{error, invalid_body, ok, ApiResponse};
use crate::state::AppState;

/// GET /api/v1/tle/sources
pub async fn list_sources(State(state): State<Arc<AppState>>) -> Response {
    match state.sources().list_all() {
        Ok(sources) => ok("TLE sources retrieved successfully", sources),
        Err(e) => error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to query TLE sources: {}", e),
        ),
    }
}

/// POST /api/v1/tle/sources
pub async fn add_source(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewSource>, JsonRejection>,
) -> Response {
    let Json(source) = match body {
        Ok(body) => body,
        Err(rejection) => return invalid_body(rejection),
    };

    if source.label.trim().is_empty() {
        return error(StatusCode::BAD_REQUEST, "Source label must not be empty");
    }
    if !source.url.starts_with("http://") && !source.url.starts_with("https://") {
        return error(
            StatusCode::BAD_REQUEST,
            "Source URL must start with http:// or https://",
        );
    }

    match state.sources().add(&source) {
        Ok(created) => {
            info!(label = %created.label, url = %created.url, "Registered TLE source");
            (
                StatusCode::CREATED,
                Json(ApiResponse::ok("TLE source added successfully", created)),
            )
                .into_response()
        }
        Err(SourceError::Duplicate(url)) => error(
            StatusCode::CONFLICT,
            format!("Source already registered: {}", url),
        ),
        Err(e) => error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to add TLE source: {}", e),
        ),
    }
}
