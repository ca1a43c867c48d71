//! Wallet transport boundary.
//!
//! Mirrors the injected-provider request API wallets expose: one entry
//! point taking a method string and JSON params, failures carrying a
//! numeric code. The production implementation speaks JSON-RPC 2.0 over
//! HTTP to a wallet daemon or an unlocked dev node; tests script the trait
//! directly.

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Code the transport answers with when asked to switch to a chain it does
/// not know yet.
pub const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;

/// Code for a request the user declined in the wallet.
pub const USER_REJECTED_CODE: i64 = 4001;

/// Error object a failed wallet request carries.
#[derive(Debug, Clone, Error)]
#[error("code {code}: {message}")]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("wallet returned {0}")]
    Rpc(#[from] RpcError),
    #[error("wallet request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed wallet response: {0}")]
    InvalidResponse(String),
}

impl TransportError {
    /// Numeric wallet error code, when the failure carries one.
    pub fn rpc_code(&self) -> Option<i64> {
        match self {
            TransportError::Rpc(e) => Some(e.code),
            _ => None,
        }
    }
}

#[async_trait]
pub trait WalletTransport: Send + Sync {
    async fn request(&self, method: &str, params: JsonValue) -> Result<JsonValue, TransportError>;
}

/// JSON-RPC 2.0 client for the wallet endpoint.
pub struct HttpWalletTransport {
    url: String,
    http: reqwest::Client,
    next_id: AtomicU64,
}

impl HttpWalletTransport {
    pub fn new(url: String) -> Self {
        Self {
            url,
            http: reqwest::Client::new(),
            next_id: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl WalletTransport for HttpWalletTransport {
    async fn request(&self, method: &str, params: JsonValue) -> Result<JsonValue, TransportError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let resp = self.http.post(&self.url).json(&body).send().await?;
        let envelope: JsonValue = resp.json().await?;

        if let Some(err) = envelope.get("error").filter(|e| !e.is_null()) {
            let code = err.get("code").and_then(|c| c.as_i64()).unwrap_or(-32000);
            let message = err
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown RPC error")
                .to_string();
            return Err(RpcError { code, message }.into());
        }

        match envelope.get("result") {
            Some(result) => Ok(result.clone()),
            None => Err(TransportError::InvalidResponse(
                "response carries neither result nor error".to_string(),
            )),
        }
    }
}
