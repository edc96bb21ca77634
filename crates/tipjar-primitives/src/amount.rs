//! Native-asset amount parsing and formatting.

use alloy::primitives::{utils::parse_ether, U256};

use crate::{PrimitivesError, Result};

/// Wei per ether is 10^18, so at most 18 fractional digits are representable.
const ETHER_DECIMALS: usize = 18;

pub const DEFAULT_TIP_AMOUNT: &str = "0.002";

/// A quick-pick tip amount and its approximate fiat label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountPreset {
    pub value: &'static str,
    pub label: &'static str,
}

pub const AMOUNT_PRESETS: [AmountPreset; 4] = [
    AmountPreset {
        value: "0.0004",
        label: "$1",
    },
    AmountPreset {
        value: "0.002",
        label: "$5",
    },
    AmountPreset {
        value: "0.004",
        label: "$10",
    },
    AmountPreset {
        value: "0.01",
        label: "$25",
    },
];

#[must_use]
pub fn is_preset(amount: &str) -> bool {
    AMOUNT_PRESETS.iter().any(|p| p.value == amount.trim())
}

/// Parse a decimal ether amount into wei.
///
/// Only unsigned decimal notation is accepted (`1`, `0.5`, `.5`, `5.`). The result
/// must be strictly positive.
pub fn parse_amount(amount: &str) -> Result<U256> {
    let amount = amount.trim();
    let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));

    if whole.is_empty() && fraction.is_empty() {
        return Err(PrimitivesError::InvalidAmount("empty amount".into()));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(PrimitivesError::InvalidAmount(format!(
            "{amount:?} is not a decimal number"
        )));
    }
    if fraction.len() > ETHER_DECIMALS {
        return Err(PrimitivesError::InvalidAmount(format!(
            "more than {ETHER_DECIMALS} decimal places"
        )));
    }

    let normalized = match (whole.is_empty(), fraction.is_empty()) {
        (true, _) => format!("0.{fraction}"),
        (false, true) => whole.to_string(),
        (false, false) => format!("{whole}.{fraction}"),
    };

    let wei = parse_ether(&normalized).map_err(|e| PrimitivesError::InvalidAmount(e.to_string()))?;
    if wei.is_zero() {
        return Err(PrimitivesError::InvalidAmount(
            "amount must be greater than zero".into(),
        ));
    }

    Ok(wei)
}

/// Format a wei balance as ether rounded half-up to 4 decimal places.
#[must_use]
pub fn format_balance(wei: U256) -> String {
    let unit = U256::from(10u64).pow(U256::from(14u64));
    let scaled = (wei + unit / U256::from(2u64)) / unit;
    let ten_thousand = U256::from(10_000u64);
    let whole = scaled / ten_thousand;
    let fraction = scaled % ten_thousand;
    format!("{whole}.{:0>4}", fraction.to_string())
}
