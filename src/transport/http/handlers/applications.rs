use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::json;

use crate::app::license_service::{RegisterApplicationRequest, DEFAULT_DOWNLOAD_EXPIRY_SECS};
use crate::error::DrmError;
use crate::registry::client::UploadFile;
use crate::transport::http::handlers::common::{application_json, failure, success};
use crate::transport::http::types::{
    json_422, AppState, DownloadUrlBody, ListApplicationsQuery, RegisterApplicationBody,
};

#[utoipa::path(
    get,
    path = "/api/applications",
    params(
        ("owner" = Option<String>, Query, description = "Owner wallet filter; defaults to the connected wallet")
    ),
    responses(
        (status = 200, description = "Applications owned by the wallet", body = ApiResponse),
        (status = 409, description = "No owner given and no session", body = ApiResponse)
    )
)]
pub async fn list_applications_handler(
    State(state): State<AppState>,
    Query(query): Query<ListApplicationsQuery>,
) -> impl IntoResponse {
    match state.service.list_applications(query.owner.as_deref()).await {
        Ok(applications) => {
            let records: Vec<_> = applications.iter().map(application_json).collect();
            success(json!({ "applications": records }))
        }
        Err(e) => failure(&e),
    }
}

#[utoipa::path(
    get,
    path = "/api/applications/{id}",
    params(("id" = i64, Path, description = "Application id")),
    responses(
        (status = 200, description = "Application detail", body = ApiResponse),
        (status = 404, description = "Unknown application", body = ApiResponse)
    )
)]
pub async fn get_application_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match state.service.get_application(id).await {
        Ok(application) => success(json!({ "application": application_json(&application) })),
        Err(e) => failure(&e),
    }
}

#[utoipa::path(
    post,
    path = "/api/applications",
    request_body = RegisterApplicationBody,
    responses(
        (status = 200, description = "Token created and application registered", body = ApiResponse),
        (status = 400, description = "Validation failed", body = ApiResponse),
        (status = 409, description = "Wallet not connected", body = ApiResponse),
        (status = 502, description = "Chain or registry failure", body = ApiResponse)
    )
)]
pub async fn register_application_handler(
    State(state): State<AppState>,
    payload: Result<Json<RegisterApplicationBody>, JsonRejection>,
) -> impl IntoResponse {
    let Json(body) = match payload {
        Ok(p) => p,
        Err(e) => return json_422(e, "RegisterApplicationBody").into_response(),
    };

    let bytes = match BASE64.decode(body.file_base64.as_bytes()) {
        Ok(bytes) => bytes,
        Err(_) => {
            return failure(&DrmError::Validation(
                "Bundle content is not valid base64".to_string(),
            ))
        }
    };

    let request = RegisterApplicationRequest {
        name: body.name,
        symbol: body.symbol,
        mainfile_name: body.mainfile_name,
        initial_supply: body.initial_supply,
        file: UploadFile {
            file_name: body.file_name,
            bytes,
        },
    };
    match state.service.register_application(request).await {
        Ok((application, tx_hash)) => success(json!({
            "application": application_json(&application),
            "tx_hash": tx_hash,
        })),
        Err(e) => failure(&e),
    }
}

#[utoipa::path(
    post,
    path = "/api/applications/{id}/download-url",
    params(("id" = i64, Path, description = "Application id")),
    request_body = DownloadUrlBody,
    responses(
        (status = 200, description = "Signed download link", body = ApiResponse),
        (status = 404, description = "Unknown application", body = ApiResponse),
        (status = 502, description = "Registry failure", body = ApiResponse)
    )
)]
pub async fn download_url_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<DownloadUrlBody>, JsonRejection>,
) -> impl IntoResponse {
    let Json(body) = match payload {
        Ok(p) => p,
        Err(e) => return json_422(e, "DownloadUrlBody").into_response(),
    };
    let expires_in = body.expires_in.unwrap_or(DEFAULT_DOWNLOAD_EXPIRY_SECS);

    match state.service.download_info(id, expires_in).await {
        Ok(info) => success(json!({
            "signed_url": info.signed_url,
            "file_name": info.file_name,
            "app_size_label": info.app_size_label,
            "expires_in": expires_in,
        })),
        Err(e) => failure(&e),
    }
}
