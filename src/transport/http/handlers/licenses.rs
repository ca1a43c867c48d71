use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::transport::http::handlers::common::{application_json, failure, success};
use crate::transport::http::types::{json_422, AppState, EmitLicensesBody, TransferLicenseBody};

#[utoipa::path(
    post,
    path = "/api/applications/{id}/licenses/emit",
    params(("id" = i64, Path, description = "Application id")),
    request_body = EmitLicensesBody,
    responses(
        (status = 200, description = "Licenses minted and counter updated", body = ApiResponse),
        (status = 400, description = "Non-positive amount or wallet rejection", body = ApiResponse),
        (status = 409, description = "Wallet not connected", body = ApiResponse),
        (status = 502, description = "Chain or registry failure", body = ApiResponse)
    )
)]
pub async fn emit_licenses_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<EmitLicensesBody>, JsonRejection>,
) -> impl IntoResponse {
    let Json(body) = match payload {
        Ok(p) => p,
        Err(e) => return json_422(e, "EmitLicensesBody").into_response(),
    };

    match state.service.emit_licenses(id, body.amount).await {
        Ok((application, tx_hash)) => success(json!({
            "application": application_json(&application),
            "tx_hash": tx_hash,
        })),
        Err(e) => failure(&e),
    }
}

#[utoipa::path(
    post,
    path = "/api/applications/{id}/licenses/transfer",
    params(("id" = i64, Path, description = "Application id")),
    request_body = TransferLicenseBody,
    responses(
        (status = 200, description = "License transferred", body = ApiResponse),
        (status = 400, description = "Bad recipient or self-transfer", body = ApiResponse),
        (status = 409, description = "Wallet not connected", body = ApiResponse),
        (status = 502, description = "Chain or registry failure", body = ApiResponse)
    )
)]
pub async fn transfer_license_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<TransferLicenseBody>, JsonRejection>,
) -> impl IntoResponse {
    let Json(body) = match payload {
        Ok(p) => p,
        Err(e) => return json_422(e, "TransferLicenseBody").into_response(),
    };
    let quantity = body.quantity.unwrap_or(1);

    match state
        .service
        .transfer_license(id, &body.to_wallet, quantity)
        .await
    {
        Ok(tx_hash) => success(json!({ "tx_hash": tx_hash, "quantity": quantity })),
        Err(e) => failure(&e),
    }
}

#[utoipa::path(
    get,
    path = "/api/applications/{id}/balance",
    params(("id" = i64, Path, description = "Application id")),
    responses(
        (status = 200, description = "License balance of the connected wallet (\"0\" on any failure)", body = ApiResponse)
    )
)]
pub async fn balance_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let balance = state.service.license_balance(id).await;
    success(json!({ "balance": balance }))
}
