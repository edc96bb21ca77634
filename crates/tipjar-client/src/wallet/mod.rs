//! Wallet and network context consumed by the submitter.

use async_trait::async_trait;
use thiserror::Error;
use tipjar_primitives::alloy::primitives::{Address, TxHash, U256};
use tipjar_primitives::call::TransferCall;
use tipjar_primitives::lifecycle::{SubmissionFailure, SubmissionHandle};
use tipjar_primitives::resolution::ErrorKind;
use tipjar_primitives::sponsorship::SponsorshipCapability;

pub mod rpc;

/// EIP-1193 "user rejected request".
pub const USER_REJECTED_CODE: i64 = 4001;
/// JSON-RPC "method not found".
pub const METHOD_NOT_FOUND_CODE: i64 = -32601;
/// EIP-1474 "method not supported".
pub const METHOD_NOT_SUPPORTED_CODE: i64 = -32004;
const INVALID_REQUEST_CODE: i64 = -32600;
const INTERNAL_ERROR_CODE: i64 = -32603;

const UNSUPPORTED_HINTS: [&str; 5] = [
    "not allowed",
    "not supported",
    "unsupported",
    "does not exist",
    "not available",
];

const REJECTED_FALLBACK_MESSAGE: &str = "Request rejected in wallet";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("wallet not connected")]
    NotConnected,
    #[error("{0}")]
    Rejected(String),
    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("{0}")]
    Rpc(String),
    #[error("wallet does not support {0}")]
    Unsupported(String),
    #[error("transaction {0} reverted")]
    Reverted(TxHash),
    #[error("timed out waiting for confirmation")]
    Timeout,
}

impl WalletError {
    /// Classify a json-rpc error response.
    pub fn from_rpc_response(code: i64, message: &str) -> Self {
        if code == USER_REJECTED_CODE {
            WalletError::Rejected(message.to_string())
        } else if is_unsupported_method(code, message) {
            WalletError::Unsupported(message.to_string())
        } else if message.to_lowercase().contains("insufficient funds") {
            WalletError::InsufficientFunds(message.to_string())
        } else {
            WalletError::Rpc(message.to_string())
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            WalletError::Rejected(_) => ErrorKind::UserRejected,
            WalletError::Timeout => ErrorKind::NetworkFailure,
            WalletError::NotConnected
            | WalletError::InsufficientFunds(_)
            | WalletError::Rpc(_)
            | WalletError::Unsupported(_)
            | WalletError::Reverted(_) => ErrorKind::SubmissionFailed,
        }
    }

    /// The user-facing failure recorded in the lifecycle.
    pub fn to_failure(&self) -> SubmissionFailure {
        let message = match self {
            WalletError::Rejected(reason) if reason.trim().is_empty() => {
                REJECTED_FALLBACK_MESSAGE.to_string()
            }
            other => other.to_string(),
        };
        SubmissionFailure::new(self.kind(), message)
    }
}

/// Public nodes refuse `wallet_*` methods with a variety of codes; only the generic
/// ones need the message to confirm it.
fn is_unsupported_method(code: i64, message: &str) -> bool {
    match code {
        METHOD_NOT_FOUND_CODE | METHOD_NOT_SUPPORTED_CODE => true,
        INVALID_REQUEST_CODE | INTERNAL_ERROR_CODE => {
            let message = message.to_lowercase();
            UNSUPPORTED_HINTS.iter().any(|hint| message.contains(hint))
        }
        _ => false,
    }
}

/// The connected wallet and the network it is on.
///
/// Implementations own signing and broadcasting; the submitter only sequences the
/// calls and interprets the outcomes.
#[async_trait]
pub trait TransferWallet: Send + Sync {
    /// Connected account, if any.
    async fn account(&self) -> Option<Address>;

    async fn chain_id(&self) -> Result<u64, WalletError>;

    /// Ask the wallet to move to another network.
    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError>;

    async fn balance(&self, account: Address) -> Result<U256, WalletError>;

    /// Sign and broadcast. Returns once the wallet has accepted the call.
    async fn send_transfer(
        &self,
        call: &TransferCall,
        capability: Option<&SponsorshipCapability>,
    ) -> Result<SubmissionHandle, WalletError>;

    /// Wait for inclusion. Returns the hash of the confirmed transaction.
    async fn confirm(&self, handle: &SubmissionHandle) -> Result<TxHash, WalletError>;
}
