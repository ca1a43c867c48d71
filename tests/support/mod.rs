//! Shared test doubles: a scriptable wallet transport, an in-memory
//! registry and an in-process API server helper.

#![allow(dead_code)]

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use alloy_primitives::{Address, U256};
use alloy_sol_types::{SolCall, SolEvent};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value as JsonValue};

use drm_license_service::chain::contracts::{DigitalAsset, DigitalAssetFactory};
use drm_license_service::chain::transport::{RpcError, TransportError, WalletTransport};
use drm_license_service::domain::{Application, NewApplication};
use drm_license_service::registry::{ApplicationRegistry, RegistryError, UploadFile};
use drm_license_service::transport::http::{create_router, AppState};
use drm_license_service::{LicenseService, WalletSessionManager};

/// Checksummed session account every scripted wallet answers with.
pub const TEST_ACCOUNT: &str = "0x52908400098527886E0F7030069857D2E4169EE7";
/// Factory address the test service is wired to.
pub const FACTORY: &str = "0x1000000000000000000000000000000000000001";

pub struct SentTransaction {
    pub to: String,
    pub data: Vec<u8>,
}

struct WalletState {
    accounts: Vec<String>,
    chain_id: String,
    knows_target_chain: bool,
    reject_accounts: bool,
    fail_reads: bool,
    decimals: u8,
    balance: U256,
    switch_calls: u32,
    add_calls: u32,
    tx_counter: u64,
    sent: Vec<SentTransaction>,
    pending_logs: Vec<JsonValue>,
    receipts: HashMap<String, JsonValue>,
}

/// Wallet double with the request surface the session and signer use.
/// Starts connected-ready on Sepolia with one account and 18-decimal
/// tokens; tests reshape it through the builder methods.
pub struct MockWalletTransport {
    state: Mutex<WalletState>,
}

impl MockWalletTransport {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(WalletState {
                accounts: vec![TEST_ACCOUNT.to_string()],
                chain_id: "0xaa36a7".to_string(),
                knows_target_chain: true,
                reject_accounts: false,
                fail_reads: false,
                decimals: 18,
                balance: U256::ZERO,
                switch_calls: 0,
                add_calls: 0,
                tx_counter: 0,
                sent: Vec::new(),
                pending_logs: Vec::new(),
                receipts: HashMap::new(),
            }),
        }
    }

    pub fn on_chain(self, chain_id: &str) -> Self {
        self.state.lock().unwrap().chain_id = chain_id.to_string();
        self
    }

    /// The wallet has no Sepolia definition; switching answers 4902 until
    /// an add request arrives.
    pub fn without_target_chain(self) -> Self {
        self.state.lock().unwrap().knows_target_chain = false;
        self
    }

    pub fn rejecting_accounts(self) -> Self {
        self.state.lock().unwrap().reject_accounts = true;
        self
    }

    pub fn with_decimals(self, decimals: u8) -> Self {
        self.state.lock().unwrap().decimals = decimals;
        self
    }

    pub fn with_balance(self, balance: U256) -> Self {
        self.state.lock().unwrap().balance = balance;
        self
    }

    /// Every `eth_call` fails, as against a dead node.
    pub fn failing_reads(self) -> Self {
        self.state.lock().unwrap().fail_reads = true;
        self
    }

    /// The next mined receipt carries a `TokenCreated` log for `token`.
    pub fn queue_token_created(&self, token: Address, owner: Address) {
        let logs = json!([{
            "address": FACTORY,
            "topics": [
                format!("0x{}", hex::encode(DigitalAssetFactory::TokenCreated::SIGNATURE_HASH)),
                format!("0x{}", hex::encode(token.into_word())),
                format!("0x{}", hex::encode(owner.into_word())),
            ],
            "data": "0x",
        }]);
        self.state.lock().unwrap().pending_logs.push(logs);
    }

    pub fn switch_calls(&self) -> u32 {
        self.state.lock().unwrap().switch_calls
    }

    pub fn add_calls(&self) -> u32 {
        self.state.lock().unwrap().add_calls
    }

    pub fn sent_count(&self) -> usize {
        self.state.lock().unwrap().sent.len()
    }

    pub fn last_sent(&self) -> Option<SentTransaction> {
        let state = self.state.lock().unwrap();
        state.sent.last().map(|tx| SentTransaction {
            to: tx.to.clone(),
            data: tx.data.clone(),
        })
    }
}

#[async_trait]
impl WalletTransport for MockWalletTransport {
    async fn request(&self, method: &str, params: JsonValue) -> Result<JsonValue, TransportError> {
        let mut state = self.state.lock().unwrap();
        match method {
            "eth_requestAccounts" => {
                if state.reject_accounts {
                    return Err(rpc_error(4001, "User rejected the request"));
                }
                Ok(json!(state.accounts.clone()))
            }
            "eth_chainId" => Ok(json!(state.chain_id.clone())),
            "wallet_switchEthereumChain" => {
                state.switch_calls += 1;
                if !state.knows_target_chain {
                    return Err(rpc_error(4902, "Unrecognized chain ID"));
                }
                let wanted = params[0]["chainId"].as_str().unwrap_or_default();
                state.chain_id = wanted.to_string();
                Ok(JsonValue::Null)
            }
            "wallet_addEthereumChain" => {
                state.add_calls += 1;
                state.knows_target_chain = true;
                Ok(JsonValue::Null)
            }
            "eth_sendTransaction" => {
                let to = params[0]["to"].as_str().unwrap_or_default().to_string();
                let data = params[0]["data"].as_str().unwrap_or_default();
                let data = hex::decode(data.trim_start_matches("0x")).unwrap_or_default();

                state.tx_counter += 1;
                let hash = format!("0x{:064x}", state.tx_counter);
                let logs = if state.pending_logs.is_empty() {
                    json!([])
                } else {
                    state.pending_logs.remove(0)
                };
                state.receipts.insert(
                    hash.clone(),
                    json!({
                        "transactionHash": hash,
                        "status": "0x1",
                        "logs": logs,
                    }),
                );
                state.sent.push(SentTransaction { to, data });
                Ok(json!(hash))
            }
            "eth_getTransactionReceipt" => {
                let hash = params[0].as_str().unwrap_or_default();
                Ok(state.receipts.get(hash).cloned().unwrap_or(JsonValue::Null))
            }
            "eth_call" => {
                if state.fail_reads {
                    return Err(rpc_error(-32000, "execution reverted"));
                }
                let data = params[0]["data"].as_str().unwrap_or_default();
                let data = hex::decode(data.trim_start_matches("0x")).unwrap_or_default();
                let word = if data.starts_with(&DigitalAsset::decimalsCall::SELECTOR) {
                    U256::from(state.decimals)
                } else if data.starts_with(&DigitalAsset::balanceOfCall::SELECTOR) {
                    state.balance
                } else {
                    U256::ZERO
                };
                Ok(json!(format!("0x{}", hex::encode(word.to_be_bytes::<32>()))))
            }
            other => Err(TransportError::InvalidResponse(format!(
                "unscripted method {}",
                other
            ))),
        }
    }
}

fn rpc_error(code: i64, message: &str) -> TransportError {
    RpcError {
        code,
        message: message.to_string(),
    }
    .into()
}

/// Registry double backed by a plain Vec.
pub struct InMemoryRegistry {
    rows: Mutex<Vec<Application>>,
    next_id: AtomicI64,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Inserts a pre-existing application row and returns it.
    pub fn seed(&self, owner_wallet: &str, contract_address: &str, licences_emited: i64) -> Application {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let application = Application {
            id,
            application_id: format!("{}/1700000000000-seedseedsee.zip", owner_wallet),
            name: format!("App {}", id),
            symbol: "APP".to_string(),
            owner_wallet: owner_wallet.to_string(),
            contract_address: contract_address.to_string(),
            licences_emited,
            mainfile_name: "app.exe".to_string(),
            app_size: 2048,
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(application.clone());
        application
    }

    pub fn rows(&self) -> Vec<Application> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl ApplicationRegistry for InMemoryRegistry {
    async fn list_applications(&self, owner_wallet: &str) -> Result<Vec<Application>, RegistryError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|a| a.owner_wallet == owner_wallet)
            .cloned()
            .collect())
    }

    async fn get_application(&self, id: i64) -> Result<Application, RegistryError> {
        let rows = self.rows.lock().unwrap();
        rows.iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or(RegistryError::NotFound(id))
    }

    async fn create_application(
        &self,
        metadata: NewApplication,
        file: &UploadFile,
    ) -> Result<Application, RegistryError> {
        let ext = file.file_name.rsplit('.').next().unwrap_or_default();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let application = Application {
            id,
            application_id: format!(
                "{}/{}-{:011}.{}",
                metadata.owner_wallet,
                Utc::now().timestamp_millis(),
                id,
                ext
            ),
            name: metadata.name,
            symbol: metadata.symbol,
            owner_wallet: metadata.owner_wallet,
            contract_address: metadata.contract_address,
            licences_emited: metadata.licences_emited,
            mainfile_name: metadata.mainfile_name,
            app_size: file.bytes.len() as i64,
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(application.clone());
        Ok(application)
    }

    async fn download_url(
        &self,
        storage_key: &str,
        expires_in_secs: u64,
    ) -> Result<String, RegistryError> {
        Ok(format!(
            "http://registry.test/storage/v1/object/sign/bundles/{}?token=test&expiresIn={}",
            storage_key, expires_in_secs
        ))
    }

    async fn increment_license_count(&self, id: i64, amount: i64) -> Result<Application, RegistryError> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(RegistryError::NotFound(id))?;
        row.licences_emited += amount;
        Ok(row.clone())
    }

    async fn health(&self) -> Result<(), RegistryError> {
        Ok(())
    }
}

pub struct TestServer {
    pub base_url: String,
    pub wallet: Arc<MockWalletTransport>,
    pub registry: Arc<InMemoryRegistry>,
    pub service: Arc<LicenseService>,
}

pub async fn spawn_server(wallet: Arc<MockWalletTransport>) -> Result<TestServer, Box<dyn std::error::Error>> {
    spawn_server_with(wallet, Arc::new(InMemoryRegistry::new())).await
}

pub async fn spawn_server_with(
    wallet: Arc<MockWalletTransport>,
    registry: Arc<InMemoryRegistry>,
) -> Result<TestServer, Box<dyn std::error::Error>> {
    let session = Arc::new(WalletSessionManager::new(
        Some(wallet.clone() as Arc<dyn WalletTransport>),
        "https://rpc.sepolia.test".to_string(),
    ));
    let service = Arc::new(LicenseService::new(
        session,
        registry.clone() as Arc<dyn ApplicationRegistry>,
        Address::from_str(FACTORY)?,
    ));
    let router = create_router(AppState {
        service: service.clone(),
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    // Wait for the server to accept connections
    for _ in 0..30 {
        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => break,
            Err(_) => tokio::time::sleep(tokio::time::Duration::from_millis(50)).await,
        }
    }

    Ok(TestServer {
        base_url: format!("http://{}", addr),
        wallet,
        registry,
        service,
    })
}

/// Server wired with no wallet transport at all; connect requests answer
/// with the missing-provider failure.
pub async fn spawn_walletless_server() -> Result<String, Box<dyn std::error::Error>> {
    let session = Arc::new(WalletSessionManager::new(
        None,
        "https://rpc.sepolia.test".to_string(),
    ));
    let registry = Arc::new(InMemoryRegistry::new());
    let service = Arc::new(LicenseService::new(
        session,
        registry as Arc<dyn ApplicationRegistry>,
        Address::from_str(FACTORY)?,
    ));
    let router = create_router(AppState { service });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    for _ in 0..30 {
        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => break,
            Err(_) => tokio::time::sleep(tokio::time::Duration::from_millis(50)).await,
        }
    }
    Ok(format!("http://{}", addr))
}

pub async fn connect_session(server: &TestServer) {
    server
        .service
        .session()
        .connect()
        .await
        .expect("wallet connect failed");
}
