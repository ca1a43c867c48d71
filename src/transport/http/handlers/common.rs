//! Helpers shared by the API handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value as JsonValue};

use crate::domain::application::Application;
use crate::error::DrmError;
use crate::transport::http::types::ApiResponse;

pub fn success(data: JsonValue) -> Response {
    (
        StatusCode::OK,
        Json(ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }),
    )
        .into_response()
}

pub fn failure(e: &DrmError) -> Response {
    (
        e.status_code(),
        Json(ApiResponse {
            success: false,
            data: None,
            error: Some(e.to_string()),
        }),
    )
        .into_response()
}

/// JSON view of an application row, extended with its display size.
pub fn application_json(application: &Application) -> JsonValue {
    match serde_json::to_value(application) {
        Ok(mut value) => {
            value["app_size_label"] = JsonValue::from(application.human_size());
            value
        }
        Err(_) => json!({}),
    }
}
