use alloy::primitives::{Address, Bytes, U256};
use serde::Serialize;

use crate::address::parse_address;
use crate::amount::parse_amount;
use crate::Result;

/// A native-asset transfer, ready to hand to a wallet.
///
/// Only constructible from a validated address and a strictly positive amount, so a
/// `TransferCall` in hand is always sendable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferCall {
    to: Address,
    value: U256,
    data: Bytes,
}

impl TransferCall {
    pub fn new(recipient: &str, amount: &str) -> Result<Self> {
        let to = parse_address(recipient)?;
        let value = parse_amount(amount)?;
        Ok(Self {
            to,
            value,
            data: Bytes::new(),
        })
    }

    pub fn to(&self) -> Address {
        self.to
    }

    /// Amount in wei.
    pub fn value(&self) -> U256 {
        self.value
    }

    /// Always empty for a plain transfer.
    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

/// Build the transfer call for the current inputs, or `None` when they are not
/// sendable yet.
#[must_use]
pub fn build_call(recipient: &str, amount: &str) -> Option<TransferCall> {
    match TransferCall::new(recipient, amount) {
        Ok(call) => Some(call),
        Err(e) => {
            tracing::debug!("transfer call not buildable: {}", e);
            None
        }
    }
}
