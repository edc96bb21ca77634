use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tipjar_primitives::alloy::network::{Network, ReceiptResponse, TransactionBuilder};
use tipjar_primitives::alloy::primitives::{Address, TxHash, U256};
use tipjar_primitives::alloy::providers::{PendingTransactionConfig, Provider};
use tipjar_primitives::alloy::transports::{RpcError, Transport, TransportErrorKind};
use tipjar_primitives::call::TransferCall;
use tipjar_primitives::lifecycle::SubmissionHandle;
use tipjar_primitives::sponsorship::SponsorshipCapability;

use super::{TransferWallet, WalletError};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

fn classify(err: RpcError<TransportErrorKind>) -> WalletError {
    match err.as_error_resp() {
        Some(payload) => WalletError::from_rpc_response(payload.code, &payload.message),
        None => WalletError::Rpc(err.to_string()),
    }
}

/// [`TransferWallet`] over an alloy provider whose fillers hold the signer.
///
/// Sponsored calls go through EIP-5792 `wallet_sendCalls` with a `paymasterService`
/// capability. When the endpoint does not implement it the transfer is sent as a
/// plain transaction and the sender pays gas.
pub struct RpcWallet<T, P, N> {
    rpc_provider: P,
    account: Address,
    confirmation_timeout: Duration,
    poll_interval: Duration,
    phantom_data: PhantomData<(T, N)>,
}

impl<T, P, N> RpcWallet<T, P, N>
where
    T: Transport + Clone,
    P: Provider<T, N> + Clone,
    N: Network,
{
    pub fn new(rpc_provider: P, account: Address, confirmation_timeout: Duration) -> Self {
        Self {
            rpc_provider,
            account,
            confirmation_timeout,
            poll_interval: DEFAULT_POLL_INTERVAL,
            phantom_data: PhantomData,
        }
    }

    /// How often `wallet_getCallsStatus` is polled for sponsored bundles.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    async fn send_transaction(&self, call: &TransferCall) -> Result<SubmissionHandle, WalletError> {
        let tx = N::TransactionRequest::default()
            .with_from(self.account)
            .with_to(call.to())
            .with_value(call.value())
            .with_input(call.data().clone());

        let pending = self
            .rpc_provider
            .send_transaction(tx)
            .await
            .map_err(classify)?;

        Ok(SubmissionHandle::Transaction(*pending.tx_hash()))
    }

    async fn send_calls(
        &self,
        call: &TransferCall,
        capability: &SponsorshipCapability,
    ) -> Result<SubmissionHandle, WalletError> {
        let chain_id = self.chain_id().await?;
        let params = json!({
            "version": "1.0",
            "chainId": format!("{chain_id:#x}"),
            "from": self.account,
            "calls": [{ "to": call.to(), "value": call.value(), "data": call.data() }],
            "capabilities": capability.to_capabilities(),
        });

        let response: Value = self
            .rpc_provider
            .raw_request("wallet_sendCalls".into(), [params])
            .await
            .map_err(classify)?;

        bundle_id(&response).map(SubmissionHandle::CallBundle)
    }

    async fn confirm_transaction(&self, tx_hash: TxHash) -> Result<TxHash, WalletError> {
        let watch = async {
            self.rpc_provider
                .watch_pending_transaction(PendingTransactionConfig::new(tx_hash))
                .await
                .map_err(|e| WalletError::Rpc(e.to_string()))?
                .await
                .map_err(|e| WalletError::Rpc(e.to_string()))
        };
        tokio::time::timeout(self.confirmation_timeout, watch)
            .await
            .map_err(|_| WalletError::Timeout)??;

        let receipt = self
            .rpc_provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(classify)?
            .ok_or_else(|| WalletError::Rpc(format!("no receipt for {tx_hash}")))?;

        if !receipt.status() {
            return Err(WalletError::Reverted(tx_hash));
        }
        Ok(tx_hash)
    }

    async fn confirm_bundle(&self, id: &str) -> Result<TxHash, WalletError> {
        let poll = async {
            loop {
                let status: Value = self
                    .rpc_provider
                    .raw_request("wallet_getCallsStatus".into(), [id.to_string()])
                    .await
                    .map_err(classify)?;

                if let Some(tx_hash) = bundle_outcome(&status)? {
                    return Ok(tx_hash);
                }
                tokio::time::sleep(self.poll_interval).await;
            }
        };

        tokio::time::timeout(self.confirmation_timeout, poll)
            .await
            .map_err(|_| WalletError::Timeout)?
    }
}

impl<T, P, N> fmt::Debug for RpcWallet<T, P, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcWallet")
            .field("account", &self.account)
            .field("confirmation_timeout", &self.confirmation_timeout)
            .finish()
    }
}

#[async_trait]
impl<T, P, N> TransferWallet for RpcWallet<T, P, N>
where
    T: Transport + Clone,
    P: Provider<T, N> + Clone,
    N: Network,
{
    async fn account(&self) -> Option<Address> {
        Some(self.account)
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        self.rpc_provider.get_chain_id().await.map_err(classify)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        tracing::info!("requesting switch to chain {}", chain_id);
        let _: Value = self
            .rpc_provider
            .raw_request(
                "wallet_switchEthereumChain".into(),
                [json!({ "chainId": format!("{chain_id:#x}") })],
            )
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn balance(&self, account: Address) -> Result<U256, WalletError> {
        self.rpc_provider.get_balance(account).await.map_err(classify)
    }

    async fn send_transfer(
        &self,
        call: &TransferCall,
        capability: Option<&SponsorshipCapability>,
    ) -> Result<SubmissionHandle, WalletError> {
        let Some(capability) = capability else {
            return self.send_transaction(call).await;
        };

        match self.send_calls(call, capability).await {
            Err(WalletError::Unsupported(reason)) => {
                tracing::warn!("sponsored calls unsupported ({}), sender pays gas", reason);
                self.send_transaction(call).await
            }
            other => other,
        }
    }

    async fn confirm(&self, handle: &SubmissionHandle) -> Result<TxHash, WalletError> {
        match handle {
            SubmissionHandle::Transaction(tx_hash) => self.confirm_transaction(*tx_hash).await,
            SubmissionHandle::CallBundle(id) => self.confirm_bundle(id).await,
        }
    }
}

/// `wallet_sendCalls` returns either the bundle id or `{ "id": ... }`.
fn bundle_id(response: &Value) -> Result<String, WalletError> {
    match response {
        Value::String(id) => Ok(id.clone()),
        Value::Object(map) => map
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| WalletError::Rpc("wallet_sendCalls response missing id".into())),
        other => Err(WalletError::Rpc(format!(
            "unexpected wallet_sendCalls response: {other}"
        ))),
    }
}

/// Interpret a `wallet_getCallsStatus` response.
///
/// Accepts both the string statuses (`PENDING`, `CONFIRMED`) and the numeric codes
/// (1xx pending, 200 confirmed, 4xx-6xx failed). `Ok(None)` means keep waiting.
fn bundle_outcome(status: &Value) -> Result<Option<TxHash>, WalletError> {
    let confirmed = match status.get("status") {
        Some(Value::String(s)) => match s.to_uppercase().as_str() {
            "PENDING" => false,
            "CONFIRMED" => true,
            other => return Err(WalletError::Rpc(format!("call bundle {}", other.to_lowercase()))),
        },
        Some(Value::Number(n)) => match n.as_u64() {
            Some(100..=199) => false,
            Some(200) => true,
            Some(code) => return Err(WalletError::Rpc(format!("call bundle failed with status {code}"))),
            None => return Err(WalletError::Rpc(format!("bad call bundle status {n}"))),
        },
        _ => return Err(WalletError::Rpc("call bundle status missing".into())),
    };

    if !confirmed {
        return Ok(None);
    }

    let receipt = status
        .get("receipts")
        .and_then(Value::as_array)
        .and_then(|receipts| receipts.first())
        .ok_or_else(|| WalletError::Rpc("confirmed call bundle has no receipts".into()))?;

    let tx_hash = receipt
        .get("transactionHash")
        .and_then(Value::as_str)
        .and_then(|hash| TxHash::from_str(hash).ok())
        .ok_or_else(|| WalletError::Rpc("receipt missing transaction hash".into()))?;

    match receipt.get("status").and_then(Value::as_str) {
        Some("0x0") => Err(WalletError::Reverted(tx_hash)),
        _ => Ok(Some(tx_hash)),
    }
}
