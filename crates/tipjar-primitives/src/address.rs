//! Recipient address validation and display helpers.

use alloy::primitives::Address;
use std::str::FromStr;

use crate::{PrimitivesError, Result};

pub const ADDRESS_PREFIX: &str = "0x";
const ADDRESS_HEX_LEN: usize = 40;

/// Parse a user supplied address.
///
/// All-lowercase hex is accepted as is. Any uppercase digit means the input claims
/// to be EIP-55 encoded and the checksum must match.
pub fn parse_address(input: &str) -> Result<Address> {
    let input = input.trim();
    let hex = input
        .strip_prefix(ADDRESS_PREFIX)
        .ok_or_else(|| PrimitivesError::InvalidAddress("missing 0x prefix".into()))?;

    if hex.len() != ADDRESS_HEX_LEN || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(PrimitivesError::InvalidAddress(format!(
            "expected {ADDRESS_HEX_LEN} hex digits, got {:?}",
            hex
        )));
    }

    if hex.chars().any(|c| c.is_ascii_uppercase()) {
        Address::parse_checksummed(input, None)
            .map_err(|e| PrimitivesError::InvalidAddress(e.to_string()))
    } else {
        Address::from_str(input).map_err(|e| PrimitivesError::InvalidAddress(e.to_string()))
    }
}

#[must_use]
pub fn is_valid_address(input: &str) -> bool {
    parse_address(input).is_ok()
}

/// EIP-55 string form.
#[must_use]
pub fn checksum(address: &Address) -> String {
    address.to_checksum(None)
}

/// `0xd8dA6B...A96045` style shortening for display.
#[must_use]
pub fn short_address(address: &Address) -> String {
    let full = checksum(address);
    format!("{}...{}", &full[..8], &full[full.len() - 6..])
}
