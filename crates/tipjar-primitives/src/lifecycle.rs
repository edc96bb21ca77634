//! Transfer submission lifecycle.
//!
//! ```text
//! idle -> building -> pending -> success
//! building | pending -> error
//! error | success -> idle   (explicit reset only)
//! ```

use alloy::primitives::TxHash;
use serde::Serialize;
use std::fmt;

use crate::resolution::ErrorKind;

/// Shown when the underlying failure carries no usable message.
pub const FALLBACK_FAILURE_MESSAGE: &str = "Transaction failed. Check your wallet.";

/// What a wallet hands back once it has accepted a call for broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "id", rename_all = "camelCase")]
pub enum SubmissionHandle {
    /// A plain transaction broadcast by the wallet.
    Transaction(TxHash),
    /// An EIP-5792 call bundle, identified by the wallet's bundle id.
    CallBundle(String),
}

impl fmt::Display for SubmissionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionHandle::Transaction(hash) => write!(f, "transaction {hash}"),
            SubmissionHandle::CallBundle(id) => write!(f, "call bundle {id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl SubmissionFailure {
    /// Blank messages are replaced with [`FALLBACK_FAILURE_MESSAGE`].
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            FALLBACK_FAILURE_MESSAGE.to_string()
        } else {
            message
        };
        Self { kind, message }
    }
}

impl fmt::Display for SubmissionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum LifecycleState {
    #[default]
    Idle,
    Building,
    Pending {
        handle: SubmissionHandle,
    },
    Success {
        tx_hash: TxHash,
    },
    Error(SubmissionFailure),
}

impl LifecycleState {
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleState::Idle => "idle",
            LifecycleState::Building => "building",
            LifecycleState::Pending { .. } => "pending",
            LifecycleState::Success { .. } => "success",
            LifecycleState::Error(_) => "error",
        }
    }

    /// Success and error hold until an explicit reset.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LifecycleState::Success { .. } | LifecycleState::Error(_)
        )
    }

    /// In flight: a new trigger must be ignored.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            LifecycleState::Building | LifecycleState::Pending { .. }
        )
    }

    pub fn can_transition_to(&self, next: &LifecycleState) -> bool {
        use LifecycleState::*;
        matches!(
            (self, next),
            (Idle, Building)
                | (Building, Pending { .. })
                | (Pending { .. }, Success { .. })
                | (Building | Pending { .. }, Error(_))
                | (Success { .. } | Error(_), Idle)
        )
    }
}
