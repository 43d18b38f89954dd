use std::sync::Arc;

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;
use tracing::warn;

use satplan_core::SanitizedConfig;

use super::response::ok;
use crate::metrics::{collect_dynamic_metrics, encode_metrics};
use crate::state::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// GET /api/v1/health
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let satellites = state.catalog().count().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to count satellites");
        0
    });
    let tle_count = state.records().count().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to count TLE records");
        0
    });

    ok(
        "Server is healthy",
        json!({
            "status": "ok",
            "version": VERSION,
            "satellites": satellites,
            "tle_count": tle_count,
            "timestamp": Utc::now(),
        }),
    )
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

/// GET /metrics
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    collect_dynamic_metrics(&state);
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
