//! Centralized configuration (environment variables + defaults).

/// Wallet transport JSON-RPC URL (optional).
///
/// Absence means no wallet is available to this process; `connect()` then
/// fails with `ProviderMissing` instead of panicking at startup.
pub fn wallet_rpc_url() -> Option<String> {
    std::env::var("WALLET_RPC_URL").ok().filter(|v| !v.is_empty())
}

/// Public Sepolia RPC URL (required).
///
/// Embedded in the `wallet_addEthereumChain` definition sent to the transport
/// when the target chain is unknown to it.
pub fn rpc_url() -> String {
    std::env::var("RPC_URL").expect("RPC_URL must be set")
}

/// DigitalAsset factory contract address (required).
pub fn factory_address() -> String {
    std::env::var("FACTORY_ADDRESS").expect("FACTORY_ADDRESS must be set")
}

/// Supabase project URL (required).
pub fn supabase_url() -> String {
    std::env::var("SUPABASE_URL").expect("SUPABASE_URL must be set")
}

/// Supabase service access token (required).
pub fn supabase_access_token() -> String {
    std::env::var("SUPABASE_ACCESS_TOKEN").expect("SUPABASE_ACCESS_TOKEN must be set")
}

/// Supabase storage bucket holding application bundles (required).
pub fn supabase_bucket_name() -> String {
    std::env::var("SUPABASE_BUCKET_NAME").expect("SUPABASE_BUCKET_NAME must be set")
}

/// Bind address for the HTTP API.
pub fn api_bind_addr() -> String {
    std::env::var("API_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string())
}
