//! Error taxonomy shared by the wallet, contract and registry layers.
//!
//! Every variant renders as a single human-readable message; the HTTP layer
//! surfaces exactly that message to the dashboard, so wording here is what
//! the user sees.

use axum::http::StatusCode;
use thiserror::Error;

use crate::chain::transport::{TransportError, USER_REJECTED_CODE};
use crate::registry::client::RegistryError;

#[derive(Debug, Error)]
pub enum DrmError {
    /// No wallet transport is configured for this process.
    #[error("No wallet available. Install a wallet or set WALLET_RPC_URL.")]
    ProviderMissing,

    #[error("Wallet is not connected")]
    NotConnected,

    /// The wallet declined a request (code 4001); carries the wallet's own
    /// message.
    #[error("Wallet request rejected: {0}")]
    UserRejected(String),

    #[error("Could not switch the wallet to the Sepolia network: {0}")]
    NetworkMismatch(String),

    /// The creation receipt carried no `TokenCreated` log to read the new
    /// contract address from.
    #[error("Could not identify the new contract address in the transaction logs")]
    AddressNotFound,

    #[error("Transaction {0} reverted on-chain")]
    Reverted(String),

    #[error("{0}")]
    Validation(String),

    #[error("Registry request failed: {0}")]
    Registry(#[from] RegistryError),

    #[error("Wallet transport error: {0}")]
    Transport(TransportError),
}

impl DrmError {
    /// Status the HTTP layer answers with for this failure.
    pub fn status_code(&self) -> StatusCode {
        match self {
            DrmError::Validation(_) | DrmError::UserRejected(_) => StatusCode::BAD_REQUEST,
            DrmError::NotConnected => StatusCode::CONFLICT,
            DrmError::ProviderMissing => StatusCode::SERVICE_UNAVAILABLE,
            DrmError::Registry(RegistryError::NotFound(_)) => StatusCode::NOT_FOUND,
            DrmError::Registry(_)
            | DrmError::NetworkMismatch(_)
            | DrmError::AddressNotFound
            | DrmError::Reverted(_)
            | DrmError::Transport(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

// A declined approval is its own category no matter which call the wallet
// rejected, so the conversion inspects the numeric code.
impl From<TransportError> for DrmError {
    fn from(e: TransportError) -> Self {
        match &e {
            TransportError::Rpc(rpc) if rpc.code == USER_REJECTED_CODE => {
                DrmError::UserRejected(rpc.message.clone())
            }
            _ => DrmError::Transport(e),
        }
    }
}

pub type DrmResult<T> = Result<T, DrmError>;
