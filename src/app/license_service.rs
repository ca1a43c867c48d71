//! Orchestration of application registration, license emission/transfer and
//! balance lookups across the wallet session, the contracts and the
//! registry.
//!
//! State-changing flows touch two systems that are not transactional with
//! each other: the chain and the registry. A failure after the on-chain step
//! leaves that transaction standing; every mutation therefore returns the
//! transaction hash so the operator can reconcile the registry by hand.

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use serde::Serialize;
use utoipa::ToSchema;

use crate::chain::contracts::{FactoryContract, TokenContract};
use crate::chain::session::WalletSessionManager;
use crate::chain::units::{format_token_amount, whole_tokens_to_base_units};
use crate::domain::application::{parse_wallet_address, Application, NewApplication};
use crate::error::{DrmError, DrmResult};
use crate::registry::client::{ApplicationRegistry, UploadFile};

/// Default lifetime of a signed download link, in seconds.
pub const DEFAULT_DOWNLOAD_EXPIRY_SECS: u64 = 60;

/// Everything the registration flow needs from the caller.
#[derive(Debug, Clone)]
pub struct RegisterApplicationRequest {
    pub name: String,
    pub symbol: String,
    pub mainfile_name: String,
    pub initial_supply: Option<i64>,
    pub file: UploadFile,
}

/// Signed link plus the display metadata the download card shows.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DownloadInfo {
    pub signed_url: String,
    pub file_name: String,
    pub app_size_label: String,
}

pub struct LicenseService {
    session: Arc<WalletSessionManager>,
    registry: Arc<dyn ApplicationRegistry>,
    factory_address: Address,
}

impl LicenseService {
    pub fn new(
        session: Arc<WalletSessionManager>,
        registry: Arc<dyn ApplicationRegistry>,
        factory_address: Address,
    ) -> Self {
        Self {
            session,
            registry,
            factory_address,
        }
    }

    pub fn session(&self) -> &Arc<WalletSessionManager> {
        &self.session
    }

    pub fn registry(&self) -> &Arc<dyn ApplicationRegistry> {
        &self.registry
    }

    /// Registers a new application: token creation on-chain first, then the
    /// bundle upload and metadata insert. When the registry step fails the
    /// created contract stands; the returned hash identifies it.
    pub async fn register_application(
        &self,
        request: RegisterApplicationRequest,
    ) -> DrmResult<(Application, String)> {
        validate_registration(&request)?;
        let signer = self.session.signer().await?;
        let initial_supply = request.initial_supply.unwrap_or(0);

        let factory = FactoryContract::new(self.factory_address, signer.clone());
        let (token_address, tx_hash) = factory
            .create_token(&request.name, &request.symbol, initial_supply as u64)
            .await?;
        println!(
            "> LicenseService: token contract {} created in tx {}",
            token_address, tx_hash
        );

        let metadata = NewApplication {
            name: request.name,
            symbol: request.symbol,
            owner_wallet: signer.address().to_string(),
            contract_address: token_address.to_string(),
            licences_emited: initial_supply,
            mainfile_name: request.mainfile_name,
        };
        let application = self
            .registry
            .create_application(metadata, &request.file)
            .await?;
        println!(
            "> LicenseService: application {} registered under key {}",
            application.id, application.application_id
        );
        Ok((application, tx_hash))
    }

    /// Mints `amount` licenses to the session wallet, then bumps the
    /// registry counter. The counter moves only after the mint confirmed.
    pub async fn emit_licenses(
        &self,
        application_id: i64,
        amount: i64,
    ) -> DrmResult<(Application, String)> {
        if amount <= 0 {
            return Err(DrmError::Validation(
                "Amount must be greater than 0".to_string(),
            ));
        }
        let signer = self.session.signer().await?;
        let application = self.registry.get_application(application_id).await?;
        let token = TokenContract::new(contract_address_of(&application)?, signer.clone());

        let tx_hash = token.mint(signer.address(), U256::from(amount as u64)).await?;
        println!(
            "> LicenseService: minted {} licenses for application {} in tx {}",
            amount, application_id, tx_hash
        );

        let updated = self
            .registry
            .increment_license_count(application_id, amount)
            .await?;
        Ok((updated, tx_hash))
    }

    /// Transfers whole license tokens to another wallet. All validation
    /// happens before any network traffic.
    pub async fn transfer_license(
        &self,
        application_id: i64,
        to_wallet: &str,
        quantity: u64,
    ) -> DrmResult<String> {
        let to = parse_wallet_address(to_wallet)?;
        let signer = self.session.signer().await?;
        if to == signer.address() {
            return Err(DrmError::Validation(
                "You cannot transfer a license to your own wallet".to_string(),
            ));
        }
        if quantity == 0 {
            return Err(DrmError::Validation(
                "Quantity must be greater than 0".to_string(),
            ));
        }

        let application = self.registry.get_application(application_id).await?;
        let token = TokenContract::new(contract_address_of(&application)?, signer);
        let decimals = token.decimals().await?;
        let amount = whole_tokens_to_base_units(quantity, decimals)?;
        let tx_hash = token.transfer(to, amount).await?;
        println!(
            "> LicenseService: transferred {} license(s) of application {} to {} in tx {}",
            quantity, application_id, to, tx_hash
        );
        Ok(tx_hash)
    }

    /// Best-effort license balance of the session wallet, as a display
    /// string. Never errors; failures degrade to "0".
    pub async fn license_balance(&self, application_id: i64) -> String {
        match self.try_license_balance(application_id).await {
            Ok(balance) => balance,
            Err(e) => {
                eprintln!(
                    "> LicenseService: balance lookup for application {} failed: {}",
                    application_id, e
                );
                "0".to_string()
            }
        }
    }

    async fn try_license_balance(&self, application_id: i64) -> DrmResult<String> {
        let signer = self.session.signer().await?;
        let application = self.registry.get_application(application_id).await?;
        let token = TokenContract::new(contract_address_of(&application)?, signer.clone());
        let balance = token.balance_of(signer.address()).await?;
        let decimals = token.decimals().await?;
        Ok(format_token_amount(balance, decimals))
    }

    /// Applications owned by `owner_wallet`, defaulting to the session
    /// wallet.
    pub async fn list_applications(&self, owner_wallet: Option<&str>) -> DrmResult<Vec<Application>> {
        let owner = match owner_wallet {
            Some(wallet) => parse_wallet_address(wallet)?.to_string(),
            None => self
                .session
                .connected()
                .await
                .ok_or(DrmError::NotConnected)?
                .address_string(),
        };
        Ok(self.registry.list_applications(&owner).await?)
    }

    pub async fn get_application(&self, application_id: i64) -> DrmResult<Application> {
        Ok(self.registry.get_application(application_id).await?)
    }

    /// Signed download link plus display metadata for the stored bundle.
    pub async fn download_info(
        &self,
        application_id: i64,
        expires_in_secs: u64,
    ) -> DrmResult<DownloadInfo> {
        let application = self.registry.get_application(application_id).await?;
        let signed_url = self
            .registry
            .download_url(&application.application_id, expires_in_secs)
            .await?;
        Ok(DownloadInfo {
            signed_url,
            file_name: application.mainfile_name.clone(),
            app_size_label: application.human_size(),
        })
    }
}

fn contract_address_of(application: &Application) -> DrmResult<Address> {
    parse_wallet_address(&application.contract_address).map_err(|_| {
        DrmError::Validation(format!(
            "Application {} has no usable contract address",
            application.id
        ))
    })
}

fn validate_registration(request: &RegisterApplicationRequest) -> DrmResult<()> {
    if request.name.trim().is_empty() {
        return Err(DrmError::Validation("Name is required".to_string()));
    }
    let symbol_len = request.symbol.chars().count();
    if symbol_len == 0 || symbol_len > 8 {
        return Err(DrmError::Validation(
            "Symbol must be between 1 and 8 characters".to_string(),
        ));
    }
    if !request.mainfile_name.contains('.') {
        return Err(DrmError::Validation(
            "Main file name must include an extension".to_string(),
        ));
    }
    if !request.file.file_name.to_lowercase().ends_with(".zip") {
        return Err(DrmError::Validation(
            "Application bundle must be a .zip file".to_string(),
        ));
    }
    if request.file.bytes.is_empty() {
        return Err(DrmError::Validation(
            "Application bundle is required".to_string(),
        ));
    }
    if request.initial_supply.is_some_and(|supply| supply < 0) {
        return Err(DrmError::Validation(
            "Initial supply cannot be negative".to_string(),
        ));
    }
    Ok(())
}
