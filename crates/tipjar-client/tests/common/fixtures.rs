use rstest::*;
use tipjar_primitives::alloy::primitives::{address, utils::parse_ether, Address, U256};
use tipjar_primitives::call::{build_call, TransferCall};
use tipjar_primitives::chains::BASE_CHAIN_ID;
use tipjar_primitives::sponsorship::{negotiate_sponsorship, SponsorshipCapability};

use super::helpers::MockWallet;

pub const VITALIK: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";
pub const DEAD: &str = "0x000000000000000000000000000000000000dEaD";
pub const PAYMASTER_URL: &str = "https://paymaster.example.org/rpc";

#[fixture]
pub fn sender() -> Address {
    address!("70997970C51812dc3A010C7d01b50e0d17dc79C8")
}

#[fixture]
pub fn vitalik() -> Address {
    address!("d8dA6BF26964aF9D7eEd9e03E53415D37aA96045")
}

#[fixture]
pub fn tip_call() -> TransferCall {
    build_call(VITALIK, "0.002").unwrap()
}

#[fixture]
pub fn funded_wallet(sender: Address) -> MockWallet {
    MockWallet::new(sender, BASE_CHAIN_ID, parse_ether("1").unwrap())
}

#[fixture]
pub fn sponsorship() -> SponsorshipCapability {
    negotiate_sponsorship(Some(PAYMASTER_URL)).unwrap()
}

pub fn ether(amount: &str) -> U256 {
    parse_ether(amount).unwrap()
}
