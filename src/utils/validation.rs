//! Validation utilities for user input.
//!
//! This module provides reusable validation functions for command arguments.

use crate::error::{GlyphBotsError, Result};

/// Total supply of the GlyphBots collection.
pub const MAX_TOKEN_ID: u32 = 11_111;

/// Validate a GlyphBots token id.
///
/// Token ids are numbered from 1 to 11111.
///
/// # Examples
///
/// ```
/// use glyphbots::utils::validation::validate_token_id;
///
/// assert!(validate_token_id(1).is_ok());
/// assert!(validate_token_id(11111).is_ok());
/// assert!(validate_token_id(0).is_err());
/// assert!(validate_token_id(11112).is_err());
/// ```
pub fn validate_token_id(token_id: u32) -> Result<()> {
    if token_id == 0 || token_id > MAX_TOKEN_ID {
        return Err(GlyphBotsError::Validation(format!(
            "Token id must be between 1 and {}, got {}",
            MAX_TOKEN_ID, token_id
        )));
    }

    Ok(())
}

/// Validate an Ethereum address (`0x` followed by 40 hex digits).
pub fn is_eth_address(address: &str) -> bool {
    match address.strip_prefix("0x") {
        Some(hex) => hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_token_id() {
        assert!(validate_token_id(1).is_ok());
        assert!(validate_token_id(4242).is_ok());
        assert!(validate_token_id(MAX_TOKEN_ID).is_ok());

        assert!(validate_token_id(0).is_err());
        assert!(validate_token_id(MAX_TOKEN_ID + 1).is_err());
    }

    #[test]
    fn test_is_eth_address() {
        assert!(is_eth_address("0x52bd3b2dc8a0bf4e6c1e5f0a7b0c0d7e9f1a2b3c"));
        assert!(is_eth_address("0x0000000000000000000000000000000000000000"));

        assert!(!is_eth_address("52bd3b2dc8a0bf4e6c1e5f0a7b0c0d7e9f1a2b3c"));
        assert!(!is_eth_address("0x1234"));
        assert!(!is_eth_address("0xZZbd3b2dc8a0bf4e6c1e5f0a7b0c0d7e9f1a2b3c"));
    }
}
