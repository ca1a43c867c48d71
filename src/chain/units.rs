//! Whole-token / base-unit conversion and display formatting.

use alloy_primitives::utils::{format_units, parse_units};
use alloy_primitives::U256;

use crate::error::{DrmError, DrmResult};

/// Scales a whole-token quantity into base units for a token with the given
/// decimals configuration.
pub fn whole_tokens_to_base_units(quantity: u64, decimals: u8) -> DrmResult<U256> {
    let parsed = parse_units(&quantity.to_string(), decimals).map_err(|e| {
        DrmError::Validation(format!("Unsupported token decimals configuration: {}", e))
    })?;
    Ok(parsed.get_absolute())
}

/// Renders a raw balance as a human decimal string with trailing zeros
/// trimmed: 2500000000000000000 at 18 decimals shows as "2.5".
pub fn format_token_amount(raw: U256, decimals: u8) -> String {
    match format_units(raw, decimals) {
        Ok(s) => trim_decimal_string(&s),
        Err(_) => raw.to_string(),
    }
}

fn trim_decimal_string(s: &str) -> String {
    if !s.contains('.') {
        return s.to_string();
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
