use crate::app::license_service::DownloadInfo;
use crate::domain::{Application, NewApplication};
use crate::transport::http::handlers::{applications, health, licenses, wallet};
use crate::transport::http::types::{
    ApiResponse, DownloadUrlBody, EmitLicensesBody, RegisterApplicationBody, TransferLicenseBody,
};
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        wallet::connect_handler,
        wallet::session_handler,
        wallet::disconnect_handler,
        applications::list_applications_handler,
        applications::get_application_handler,
        applications::register_application_handler,
        applications::download_url_handler,
        licenses::emit_licenses_handler,
        licenses::transfer_license_handler,
        licenses::balance_handler
    ),
    components(schemas(
        ApiResponse,
        RegisterApplicationBody,
        EmitLicensesBody,
        TransferLicenseBody,
        DownloadUrlBody,
        Application,
        NewApplication,
        DownloadInfo
    ))
)]
#[allow(dead_code)]
pub struct ApiDoc;

pub fn create_router(app_state: crate::transport::http::types::AppState) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route("/api/wallet/connect", post(wallet::connect_handler))
        .route("/api/wallet/session", get(wallet::session_handler))
        .route("/api/wallet/disconnect", post(wallet::disconnect_handler))
        .route(
            "/api/applications",
            get(applications::list_applications_handler)
                .post(applications::register_application_handler),
        )
        .route("/api/applications/:id", get(applications::get_application_handler))
        .route(
            "/api/applications/:id/download-url",
            post(applications::download_url_handler),
        )
        .route(
            "/api/applications/:id/licenses/emit",
            post(licenses::emit_licenses_handler),
        )
        .route(
            "/api/applications/:id/licenses/transfer",
            post(licenses::transfer_license_handler),
        )
        .route("/api/applications/:id/balance", get(licenses::balance_handler))
        .with_state(app_state)
}
