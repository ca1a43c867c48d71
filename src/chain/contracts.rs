//! Statically typed contract bindings and handles.
//!
//! Call encoding and event matching are fixed at build time; nothing here
//! guesses at runtime shapes. The factory spawns one DigitalAsset token
//! contract per registered application.

use std::str::FromStr;

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{sol, SolCall, SolEvent};

use crate::chain::signer::{TransactionReceipt, WalletSigner};
use crate::chain::transport::TransportError;
use crate::error::{DrmError, DrmResult};

sol! {
    interface DigitalAssetFactory {
        event TokenCreated(address indexed token, address indexed owner, string name, string symbol, uint256 initialSupply);
        function createToken(string name, string symbol, uint256 initialSupply);
    }

    interface DigitalAsset {
        function balanceOf(address owner) external view returns (uint256);
        function decimals() external view returns (uint8);
        function mint(address to, uint256 amount);
        function transfer(address to, uint256 amount) external returns (bool);
    }
}

/// Handle to the configured factory contract, bound to a session signer.
pub struct FactoryContract {
    address: Address,
    signer: WalletSigner,
}

impl FactoryContract {
    pub fn new(address: Address, signer: WalletSigner) -> Self {
        Self { address, signer }
    }

    /// Submits `createToken`, waits for one confirmation and reads the new
    /// contract address out of the emitted `TokenCreated` log.
    pub async fn create_token(
        &self,
        name: &str,
        symbol: &str,
        initial_supply: u64,
    ) -> DrmResult<(Address, String)> {
        let call = DigitalAssetFactory::createTokenCall {
            name: name.to_string(),
            symbol: symbol.to_string(),
            initialSupply: U256::from(initial_supply),
        };
        let receipt = self
            .signer
            .send_and_confirm(self.address, call.abi_encode())
            .await?;
        let token = created_token_address(&receipt).ok_or(DrmError::AddressNotFound)?;
        Ok((token, receipt.transaction_hash))
    }
}

/// Scans receipt logs for a `TokenCreated`-shaped event and extracts its
/// first argument, the created contract's address.
pub fn created_token_address(receipt: &TransactionReceipt) -> Option<Address> {
    let wanted: B256 = DigitalAssetFactory::TokenCreated::SIGNATURE_HASH;
    receipt.logs.iter().find_map(|log| {
        let first = log.topics.first()?;
        if B256::from_str(first).ok()? != wanted {
            return None;
        }
        let token_topic = log.topics.get(1)?;
        Some(Address::from_word(B256::from_str(token_topic).ok()?))
    })
}

/// Handle to one application's license token contract.
pub struct TokenContract {
    address: Address,
    signer: WalletSigner,
}

impl TokenContract {
    pub fn new(address: Address, signer: WalletSigner) -> Self {
        Self { address, signer }
    }

    pub async fn decimals(&self) -> DrmResult<u8> {
        let data = self
            .signer
            .call(self.address, DigitalAsset::decimalsCall {}.abi_encode())
            .await?;
        let value = decode_uint_word(&data)?;
        u64::try_from(value)
            .ok()
            .and_then(|v| u8::try_from(v).ok())
            .ok_or_else(|| {
                TransportError::InvalidResponse("implausible decimals value".to_string()).into()
            })
    }

    pub async fn balance_of(&self, owner: Address) -> DrmResult<U256> {
        let data = self
            .signer
            .call(self.address, DigitalAsset::balanceOfCall { owner }.abi_encode())
            .await?;
        decode_uint_word(&data)
    }

    /// Mints `amount` to `to`; returns the transaction hash after one
    /// confirmation.
    pub async fn mint(&self, to: Address, amount: U256) -> DrmResult<String> {
        let call = DigitalAsset::mintCall { to, amount };
        let receipt = self
            .signer
            .send_and_confirm(self.address, call.abi_encode())
            .await?;
        Ok(receipt.transaction_hash)
    }

    /// Transfers `amount` base units to `to`; returns the transaction hash
    /// after one confirmation.
    pub async fn transfer(&self, to: Address, amount: U256) -> DrmResult<String> {
        let call = DigitalAsset::transferCall { to, amount };
        let receipt = self
            .signer
            .send_and_confirm(self.address, call.abi_encode())
            .await?;
        Ok(receipt.transaction_hash)
    }
}

fn decode_uint_word(data: &[u8]) -> DrmResult<U256> {
    if data.is_empty() {
        return Err(TransportError::InvalidResponse("empty call result".to_string()).into());
    }
    let word = if data.len() >= 32 { &data[..32] } else { data };
    Ok(U256::from_be_slice(word))
}
