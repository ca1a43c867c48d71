//! Transaction submission and confirmation through the wallet transport.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::Address;
use serde::Deserialize;
use serde_json::json;

use crate::chain::transport::{TransportError, WalletTransport};
use crate::error::{DrmError, DrmResult};

const RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(1500);

/// Mined-transaction receipt, reduced to the fields the service reads.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    pub status: Option<String>,
    #[serde(default)]
    pub logs: Vec<LogEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub address: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub data: String,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        match self.status.as_deref() {
            Some(s) => u64::from_str_radix(s.trim_start_matches("0x"), 16)
                .map(|v| v == 1)
                .unwrap_or(false),
            // Nodes predating receipt statuses omit the field.
            None => true,
        }
    }
}

/// Capability to authorize transactions for one account.
///
/// The wallet holds the keys; every submission goes through
/// `eth_sendTransaction` with `from` pinned to the bound account.
#[derive(Clone)]
pub struct WalletSigner {
    transport: Arc<dyn WalletTransport>,
    address: Address,
}

impl WalletSigner {
    pub fn new(transport: Arc<dyn WalletTransport>, address: Address) -> Self {
        Self { transport, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Submits a state-changing call and returns the transaction hash.
    pub async fn send_transaction(&self, to: Address, data: Vec<u8>) -> DrmResult<String> {
        let params = json!([{
            "from": self.address.to_string(),
            "to": to.to_string(),
            "data": format!("0x{}", hex::encode(&data)),
        }]);
        let result = self.transport.request("eth_sendTransaction", params).await?;
        match result.as_str() {
            Some(hash) => Ok(hash.to_string()),
            None => Err(TransportError::InvalidResponse(
                "eth_sendTransaction did not return a transaction hash".to_string(),
            )
            .into()),
        }
    }

    /// Read-only contract call; returns the raw return data.
    pub async fn call(&self, to: Address, data: Vec<u8>) -> DrmResult<Vec<u8>> {
        let params = json!([
            {
                "from": self.address.to_string(),
                "to": to.to_string(),
                "data": format!("0x{}", hex::encode(&data)),
            },
            "latest",
        ]);
        let result = self.transport.request("eth_call", params).await?;
        let payload = result.as_str().ok_or_else(|| {
            TransportError::InvalidResponse("eth_call did not return call data".to_string())
        })?;
        hex::decode(payload.trim_start_matches("0x")).map_err(|e| {
            TransportError::InvalidResponse(format!("undecodable call data: {}", e)).into()
        })
    }

    /// Polls until the transaction is included in a block.
    ///
    /// Confirmation waits carry no timeout; an in-flight transaction runs to
    /// inclusion or revert and cannot be cancelled from here.
    pub async fn wait_for_receipt(&self, tx_hash: &str) -> DrmResult<TransactionReceipt> {
        loop {
            let result = self
                .transport
                .request("eth_getTransactionReceipt", json!([tx_hash]))
                .await?;
            if !result.is_null() {
                let receipt: TransactionReceipt = serde_json::from_value(result).map_err(|e| {
                    TransportError::InvalidResponse(format!("unreadable receipt: {}", e))
                })?;
                if !receipt.succeeded() {
                    return Err(DrmError::Reverted(tx_hash.to_string()));
                }
                return Ok(receipt);
            }
            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }
    }

    /// Submits and waits for one confirmation.
    pub async fn send_and_confirm(&self, to: Address, data: Vec<u8>) -> DrmResult<TransactionReceipt> {
        let tx_hash = self.send_transaction(to, data).await?;
        self.wait_for_receipt(&tx_hash).await
    }
}
