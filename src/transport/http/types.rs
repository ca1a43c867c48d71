use crate::app::license_service::LicenseService;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<LicenseService>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct RegisterApplicationBody {
    pub name: String,
    pub symbol: String,
    /// Name of the executable inside the bundle, extension included.
    pub mainfile_name: String,
    /// Licenses minted with the token creation; defaults to 0.
    #[serde(default)]
    pub initial_supply: Option<i64>,
    /// Bundle file name; must end in `.zip`.
    pub file_name: String,
    /// Bundle content, base64-encoded.
    pub file_base64: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct EmitLicensesBody {
    /// Licenses to mint; must be positive.
    pub amount: i64,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct TransferLicenseBody {
    pub to_wallet: String,
    /// Whole tokens to move; defaults to 1.
    #[serde(default)]
    pub quantity: Option<u64>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct DownloadUrlBody {
    /// Link lifetime in seconds; defaults to 60.
    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[derive(Deserialize, Debug)]
pub struct ListApplicationsQuery {
    /// Owner wallet filter; defaults to the connected session wallet.
    pub owner: Option<String>,
}

pub fn json_422(err: JsonRejection, expected: &str) -> (StatusCode, Json<ApiResponse>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiResponse {
            success: false,
            data: None,
            error: Some(format!("Invalid JSON body: {} (expected: {})", err, expected)),
        }),
    )
}
