// src/main.rs

use std::str::FromStr;
use std::sync::Arc;

use alloy_primitives::Address;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use drm_license_service::infra::config;
use drm_license_service::transport;
use drm_license_service::{
    ApplicationRegistry, HttpWalletTransport, LicenseService, SupabaseRegistry,
    WalletSessionManager, WalletTransport,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // --- Wallet transport ---
    let wallet_transport: Option<Arc<dyn WalletTransport>> = match config::wallet_rpc_url() {
        Some(url) => {
            println!("> Wallet transport: {}", url);
            Some(Arc::new(HttpWalletTransport::new(url)))
        }
        None => {
            println!("> No WALLET_RPC_URL set; connect requests will report the missing wallet.");
            None
        }
    };

    // --- Session Manager Initialization ---
    println!("> Initializing WalletSessionManager (starts disconnected)...");
    let session = Arc::new(WalletSessionManager::new(wallet_transport, config::rpc_url()));

    // --- Registry Initialization ---
    println!("> Initializing Supabase registry client...");
    let registry: Arc<dyn ApplicationRegistry> = Arc::new(SupabaseRegistry::from_env());
    // Log registry reachability at startup (helps debug credential issues)
    match registry.health().await {
        Ok(()) => println!("> Registry reachable."),
        Err(e) => println!("> Registry ping failed ({}); /health will keep probing.", e),
    }

    // --- Service Initialization ---
    let factory_address = Address::from_str(&config::factory_address())
        .map_err(|e| format!("FACTORY_ADDRESS is not a valid address: {}", e))?;
    println!("> DigitalAsset factory at {}", factory_address);
    let service = Arc::new(LicenseService::new(session, registry, factory_address));
    let app_state = transport::http::AppState { service };
    println!("> LicenseService initialized successfully.");

    // --- API Server Initialization ---
    println!("> Starting API server...");
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any);
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(cors);
    let bind_addr = config::api_bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    println!("> API server listening on http://{}", bind_addr);
    println!("> Swagger UI available at http://{}/swagger-ui", bind_addr);
    println!("> Press Ctrl+C to shut down");

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            println!("\n> Shutdown signal received (Ctrl+C)...");
            println!("> Graceful shutdown complete.");
        }
    }

    Ok(())
}
