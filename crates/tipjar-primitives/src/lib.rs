//! Core types for tipjar
//!
//! Pure, network-free building blocks shared by the resolver and the submission
//! orchestrator. Alloy types are re-exported from here so every crate in the
//! workspace resolves the same versions.

pub mod alloy {
    pub mod primitives {
        pub use ::alloy::primitives::{
            address, b256, bytes, keccak256, utils, Address, Bytes, TxHash, B256, U256,
        };
    }

    pub mod network {
        pub use ::alloy::network::{
            Ethereum, EthereumWallet, Network, ReceiptResponse, TransactionBuilder,
        };
    }

    pub mod providers {
        pub use ::alloy::providers::{PendingTransactionConfig, Provider, ProviderBuilder};
    }

    pub mod transports {
        pub use ::alloy::transports::{RpcError, Transport, TransportErrorKind};
    }

    pub mod signers {
        pub use ::alloy::signers::local::PrivateKeySigner;
    }
}

pub mod abi;
pub mod address;
pub mod amount;
pub mod call;
pub mod chains;
pub mod env;
pub mod error;
pub mod lifecycle;
pub mod resolution;
pub mod sponsorship;
pub mod utils;

pub use error::{PrimitivesError, Result};
