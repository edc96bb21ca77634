//! Chain constants for Base and its testnet.

use alloy::primitives::{address, Address};

pub const BASE_CHAIN_ID: u64 = 8453;
pub const BASE_SEPOLIA_CHAIN_ID: u64 = 84532;

pub const BASE_PUBLIC_RPC_URL: &str = "https://mainnet.base.org";

/// Reserved suffix for Basenames.
pub const BASENAME_SUFFIX: &str = ".base.eth";
/// Basenames registry on Base mainnet.
pub const BASENAME_REGISTRY_ADDRESS: Address =
    address!("b94704422c2a1e396835a571837aa5ae53285a95");

/// Whether the wallet is connected to the chain the transfer must happen on.
#[must_use]
pub fn chain_check(connected_chain_id: u64, required_chain_id: u64) -> bool {
    connected_chain_id == required_chain_id
}

#[must_use]
pub fn chain_name(chain_id: u64) -> String {
    match chain_id {
        BASE_CHAIN_ID => "Base".to_string(),
        BASE_SEPOLIA_CHAIN_ID => "Base Sepolia".to_string(),
        other => format!("chain {other}"),
    }
}
