use alloy::primitives::{keccak256, B256};

use crate::{PrimitivesError, Result};

/// Lower-case and trim a name before hashing.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Check a normalized name has no empty labels and no whitespace or control
/// characters.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(PrimitivesError::InvalidName("empty name".into()));
    }
    if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(PrimitivesError::InvalidName(format!(
            "{name:?} contains whitespace"
        )));
    }
    if name.split('.').any(str::is_empty) {
        return Err(PrimitivesError::InvalidName(format!(
            "{name:?} has an empty label"
        )));
    }
    Ok(())
}

/// EIP-137 namehash.
#[must_use]
pub fn namehash(name: &str) -> B256 {
    let mut node = B256::ZERO;
    if name.is_empty() {
        return node;
    }

    for label in name.rsplit('.') {
        let label_hash = keccak256(label.as_bytes());
        node = keccak256([node.as_slice(), label_hash.as_slice()].concat());
    }
    node
}
