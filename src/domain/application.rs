//! Application registry entities and the account-identifier parsing used on
//! every user-supplied wallet address.

use std::str::FromStr;

use alloy_primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{DrmError, DrmResult};

/// One registered application, as the registry collaborator stores it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Application {
    pub id: i64,
    /// Opaque storage key of the uploaded bundle.
    pub application_id: String,
    pub name: String,
    pub symbol: String,
    pub owner_wallet: String,
    /// License token contract; written exactly once, at registration, from
    /// the factory's creation event.
    pub contract_address: String,
    /// Only ever grows, and only through the license-emission flow.
    pub licences_emited: i64,
    pub mainfile_name: String,
    /// Bundle size in bytes.
    pub app_size: i64,
    pub created_at: DateTime<Utc>,
}

impl Application {
    /// Human-readable bundle size, as the dashboard renders it.
    pub fn human_size(&self) -> String {
        format_file_size(self.app_size)
    }
}

/// Metadata captured at registration; the registry client fills in the
/// storage key and byte size while persisting.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewApplication {
    pub name: String,
    pub symbol: String,
    pub owner_wallet: String,
    pub contract_address: String,
    pub licences_emited: i64,
    pub mainfile_name: String,
}

/// Parses a user-supplied account identifier.
///
/// Uniform-case hex passes as-is; mixed-case input must carry a valid
/// EIP-55 checksum, matching what wallet tooling accepts.
pub fn parse_wallet_address(input: &str) -> DrmResult<Address> {
    let s = input.trim();
    let invalid = || DrmError::Validation(format!("Invalid wallet address: {}", input));

    let hex_part = s.strip_prefix("0x").ok_or_else(invalid)?;
    if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let has_lower = hex_part.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = hex_part.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        Address::parse_checksummed(s, None)
            .map_err(|_| DrmError::Validation(format!("Invalid wallet address checksum: {}", input)))
    } else {
        Address::from_str(s).map_err(|_| invalid())
    }
}

/// 1024-based size label with up to two decimals, trailing zeros dropped.
pub fn format_file_size(bytes: i64) -> String {
    if bytes <= 0 {
        return "0 Bytes".to_string();
    }
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
    let exp = (((bytes as f64).ln() / 1024f64.ln()).floor() as usize).min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exp as i32);
    let rendered = format!("{:.2}", value);
    let rendered = rendered.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", rendered, UNITS[exp])
}
