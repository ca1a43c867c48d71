use axum::extract::State;
use axum::response::IntoResponse;
use serde_json::json;

use crate::chain::session::SessionState;
use crate::transport::http::handlers::common::{failure, success};
use crate::transport::http::types::AppState;

/// What the dashboard tells the user instead of a real disconnect; revoking
/// access only works inside the wallet software.
const DISCONNECT_ADVICE: &str = "To disconnect, use your wallet extension.";

#[utoipa::path(
    post,
    path = "/api/wallet/connect",
    responses(
        (status = 200, description = "Session established", body = ApiResponse),
        (status = 400, description = "Wallet declined the request", body = ApiResponse),
        (status = 502, description = "Chain switch or transport failure", body = ApiResponse),
        (status = 503, description = "No wallet transport configured", body = ApiResponse)
    )
)]
pub async fn connect_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.service.session().connect().await {
        Ok(snapshot) => success(json!({
            "address": snapshot.address_string(),
            "short_address": snapshot.short_address(),
            "chain_id": snapshot.chain_id,
        })),
        Err(e) => failure(&e),
    }
}

#[utoipa::path(
    get,
    path = "/api/wallet/session",
    responses(
        (status = 200, description = "Current session snapshot", body = ApiResponse)
    )
)]
pub async fn session_handler(State(state): State<AppState>) -> impl IntoResponse {
    let data = match state.service.session().snapshot().await {
        SessionState::Connected(snapshot) => json!({
            "connected": true,
            "connecting": false,
            "address": snapshot.address_string(),
            "short_address": snapshot.short_address(),
            "chain_id": snapshot.chain_id,
        }),
        SessionState::Connecting => json!({ "connected": false, "connecting": true }),
        SessionState::Disconnected => json!({ "connected": false, "connecting": false }),
    };
    success(data)
}

#[utoipa::path(
    post,
    path = "/api/wallet/disconnect",
    responses(
        (status = 200, description = "Advisory only; the session is unchanged", body = ApiResponse)
    )
)]
pub async fn disconnect_handler(State(state): State<AppState>) -> impl IntoResponse {
    let connected = state.service.session().connected().await.is_some();
    success(json!({
        "disconnected": false,
        "still_connected": connected,
        "notice": DISCONNECT_ADVICE,
    }))
}
