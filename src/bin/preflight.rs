use std::str::FromStr;
use std::sync::Arc;

use alloy_primitives::Address;
use serde_json::json;

use drm_license_service::infra::config;
use drm_license_service::{ApplicationRegistry, HttpWalletTransport, SupabaseRegistry, WalletTransport};

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight\n\
         \n\
         Requires env vars:\n\
           RPC_URL, FACTORY_ADDRESS, SUPABASE_URL, SUPABASE_ACCESS_TOKEN, SUPABASE_BUCKET_NAME\n\
         Optional:\n\
           WALLET_RPC_URL (wallet JSON-RPC endpoint; connect fails without it)\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }

    // Force-read config (nice error messages if missing)
    let rpc_url = config::rpc_url();
    let factory_str = config::factory_address();
    let supabase_url = config::supabase_url();
    let bucket = config::supabase_bucket_name();
    let _ = config::supabase_access_token();

    println!("> Preflight:");
    println!("  RPC_URL={}", rpc_url);
    println!("  FACTORY_ADDRESS={}", factory_str);
    println!("  SUPABASE_URL={}", supabase_url);
    println!("  SUPABASE_BUCKET_NAME={}", bucket);

    let factory = Address::from_str(&factory_str)
        .map_err(|e| anyhow::anyhow!("FACTORY_ADDRESS is not a valid address: {}", e))?;

    // Basic RPC connectivity
    let rpc: Arc<dyn WalletTransport> = Arc::new(HttpWalletTransport::new(rpc_url));
    let chain_id = rpc.request("eth_chainId", json!([])).await?;
    let chain_id = chain_id.as_str().unwrap_or_default().to_string();
    println!("  RPC chain id: {}", chain_id);
    if parse_chain_id(&chain_id) != parse_chain_id("0xAA36A7") {
        eprintln!("  Warning: RPC_URL does not answer for Sepolia (0xAA36A7).");
    }

    // Factory code existence
    let code = rpc
        .request("eth_getCode", json!([factory.to_string(), "latest"]))
        .await?;
    let code = code.as_str().unwrap_or_default();
    if code.trim_start_matches("0x").is_empty() {
        eprintln!("  Warning: no contract code at FACTORY_ADDRESS on this chain.");
    } else {
        println!("  Factory code present ({} bytes).", code.trim_start_matches("0x").len() / 2);
    }

    // Wallet endpoint (optional)
    match config::wallet_rpc_url() {
        Some(wallet_url) => {
            println!("  WALLET_RPC_URL={}", wallet_url);
            let wallet: Arc<dyn WalletTransport> = Arc::new(HttpWalletTransport::new(wallet_url));
            let wallet_chain = wallet.request("eth_chainId", json!([])).await?;
            let wallet_chain = wallet_chain.as_str().unwrap_or_default().to_string();
            println!("  Wallet chain id: {}", wallet_chain);
            if parse_chain_id(&wallet_chain) != parse_chain_id(&chain_id) {
                println!("  Wallet sits on another chain; connect will switch it to Sepolia.");
            }
        }
        None => {
            println!("  WALLET_RPC_URL not set; connect requests will report the missing wallet.");
        }
    }

    // Registry reachable
    let registry: Arc<dyn ApplicationRegistry> = Arc::new(SupabaseRegistry::from_env());
    registry
        .health()
        .await
        .map_err(|e| anyhow::anyhow!("Registry is not reachable: {}", e))?;
    println!("  Registry table is readable.");

    println!("> Preflight OK.");
    Ok(())
}

fn parse_chain_id(s: &str) -> Option<u64> {
    u64::from_str_radix(s.trim_start_matches("0x"), 16).ok()
}
