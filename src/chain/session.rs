//! Wallet session state machine.
//!
//! One manager instance is shared process-wide. `connect()` is the only
//! mutating entry point and runs behind an async gate, so concurrent UI
//! triggers serialize instead of racing the state. Everything else reads
//! cheap snapshots. There is no disconnect transition: access can only be
//! revoked inside the wallet software itself.

use std::str::FromStr;
use std::sync::Arc;

use alloy_primitives::Address;
use serde_json::{json, Value as JsonValue};
use tokio::sync::{Mutex, RwLock};

use crate::chain::signer::WalletSigner;
use crate::chain::transport::{
    TransportError, WalletTransport, UNRECOGNIZED_CHAIN_CODE, USER_REJECTED_CODE,
};
use crate::error::{DrmError, DrmResult};

/// Chain id of the fixed target network (Sepolia).
pub const TARGET_CHAIN_ID: &str = "0xAA36A7";
/// Network name given to the wallet when Sepolia must be added first.
pub const TARGET_CHAIN_NAME: &str = "Sepolia Test Network";
/// Block explorer advertised with the added network definition.
pub const TARGET_EXPLORER_URL: &str = "https://sepolia.etherscan.io/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected(SessionSnapshot),
}

/// Read-only view of an established session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub address: Address,
    pub chain_id: String,
}

impl SessionSnapshot {
    /// Checksummed display form of the account.
    pub fn address_string(&self) -> String {
        self.address.to_string()
    }

    /// Abbreviated form the dashboard header shows: `0x1234...abcd`.
    pub fn short_address(&self) -> String {
        let s = self.address.to_string();
        format!("{}...{}", &s[..6], &s[s.len() - 4..])
    }
}

pub struct WalletSessionManager {
    /// Absent when the environment configures no wallet endpoint; `connect`
    /// then fails with `ProviderMissing`.
    transport: Option<Arc<dyn WalletTransport>>,
    state: RwLock<SessionState>,
    /// Serializes connect attempts; the state has exactly one writer context.
    connect_gate: Mutex<()>,
    /// RPC endpoint embedded in the add-chain definition.
    rpc_url: String,
}

impl WalletSessionManager {
    pub fn new(transport: Option<Arc<dyn WalletTransport>>, rpc_url: String) -> Self {
        Self {
            transport,
            state: RwLock::new(SessionState::Disconnected),
            connect_gate: Mutex::new(()),
            rpc_url,
        }
    }

    pub fn has_transport(&self) -> bool {
        self.transport.is_some()
    }

    pub async fn snapshot(&self) -> SessionState {
        self.state.read().await.clone()
    }

    /// Snapshot of the connected session, if any.
    pub async fn connected(&self) -> Option<SessionSnapshot> {
        match &*self.state.read().await {
            SessionState::Connected(snapshot) => Some(snapshot.clone()),
            _ => None,
        }
    }

    /// Signer bound to the active session's account.
    pub async fn signer(&self) -> DrmResult<WalletSigner> {
        let transport = self.transport.clone().ok_or(DrmError::ProviderMissing)?;
        match &*self.state.read().await {
            SessionState::Connected(snapshot) => Ok(WalletSigner::new(transport, snapshot.address)),
            _ => Err(DrmError::NotConnected),
        }
    }

    /// Single mutating entry point.
    ///
    /// Requests accounts, makes sure the wallet sits on Sepolia (one switch
    /// attempt, and on code 4902 one add-then-switch retry) and records the
    /// session. Any failure reverts the state to `Disconnected`; nothing is
    /// retried beyond the chain fallback.
    pub async fn connect(&self) -> DrmResult<SessionSnapshot> {
        let transport = self.transport.clone().ok_or(DrmError::ProviderMissing)?;
        let _gate = self.connect_gate.lock().await;

        *self.state.write().await = SessionState::Connecting;
        match self.run_connect_flow(&transport).await {
            Ok(snapshot) => {
                *self.state.write().await = SessionState::Connected(snapshot.clone());
                println!(
                    "> WalletSession: connected as {} on chain {}",
                    snapshot.address_string(),
                    snapshot.chain_id
                );
                Ok(snapshot)
            }
            Err(e) => {
                *self.state.write().await = SessionState::Disconnected;
                Err(e)
            }
        }
    }

    async fn run_connect_flow(
        &self,
        transport: &Arc<dyn WalletTransport>,
    ) -> DrmResult<SessionSnapshot> {
        let accounts = transport.request("eth_requestAccounts", json!([])).await?;
        let address_str = accounts
            .get(0)
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                TransportError::InvalidResponse("wallet returned no accounts".to_string())
            })?;
        let address = Address::from_str(address_str).map_err(|e| {
            TransportError::InvalidResponse(format!("unusable account {}: {}", address_str, e))
        })?;

        let chain_id = self.ensure_target_chain(transport).await?;
        Ok(SessionSnapshot { address, chain_id })
    }

    /// One switch attempt; on 4902 one add-then-switch retry, nothing more.
    async fn ensure_target_chain(
        &self,
        transport: &Arc<dyn WalletTransport>,
    ) -> DrmResult<String> {
        let current = transport.request("eth_chainId", json!([])).await?;
        let current = current.as_str().unwrap_or_default().to_string();
        if chain_ids_equal(&current, TARGET_CHAIN_ID) {
            return Ok(current);
        }

        let switch_params = json!([{ "chainId": TARGET_CHAIN_ID }]);
        match transport
            .request("wallet_switchEthereumChain", switch_params.clone())
            .await
        {
            Ok(_) => {}
            Err(e) if e.rpc_code() == Some(UNRECOGNIZED_CHAIN_CODE) => {
                println!("> WalletSession: Sepolia unknown to wallet, adding network definition");
                transport
                    .request("wallet_addEthereumChain", self.add_chain_params())
                    .await
                    .map_err(switch_failure)?;
                transport
                    .request("wallet_switchEthereumChain", switch_params)
                    .await
                    .map_err(switch_failure)?;
            }
            Err(e) => return Err(switch_failure(e)),
        }
        Ok(TARGET_CHAIN_ID.to_string())
    }

    fn add_chain_params(&self) -> JsonValue {
        json!([{
            "chainId": TARGET_CHAIN_ID,
            "chainName": TARGET_CHAIN_NAME,
            "rpcUrls": [self.rpc_url],
            "nativeCurrency": {
                "name": "SepoliaETH",
                "symbol": "SEP",
                "decimals": 18,
            },
            "blockExplorerUrls": [TARGET_EXPLORER_URL],
        }])
    }
}

fn switch_failure(e: TransportError) -> DrmError {
    match e.rpc_code() {
        Some(USER_REJECTED_CODE) => e.into(),
        _ => DrmError::NetworkMismatch(e.to_string()),
    }
}

fn chain_ids_equal(a: &str, b: &str) -> bool {
    match (parse_chain_id(a), parse_chain_id(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn parse_chain_id(s: &str) -> Option<u64> {
    u64::from_str_radix(s.trim_start_matches("0x"), 16).ok()
}
