//! The `{success, message, data}` envelope returned by every data endpoint.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use satplan_core::{FailureCategory, IngestError};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize = Value> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

/// Successful response with status 200.
pub fn ok<T: Serialize>(message: impl Into<String>, data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::ok(message, data))).into_response()
}

/// Failed response with no data.
pub fn error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ApiResponse::error(message))).into_response()
}

/// Map a rejected JSON body to a 400 envelope.
pub fn invalid_body(rejection: JsonRejection) -> Response {
    error(
        StatusCode::BAD_REQUEST,
        format!("Invalid request body: {}", rejection.body_text()),
    )
}

pub fn ingest_status(err: &IngestError) -> StatusCode {
    match err.category() {
        FailureCategory::Rejected => StatusCode::BAD_REQUEST,
        FailureCategory::Busy => StatusCode::CONFLICT,
        FailureCategory::Infrastructure => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Failed ingestion, carrying the partial report as `data` when there is one.
pub fn ingest_failure(err: IngestError) -> Response {
    let status = ingest_status(&err);
    let body = ApiResponse {
        success: false,
        message: err.to_string(),
        data: err.report().cloned(),
    };
    (status, Json(body)).into_response()
}
