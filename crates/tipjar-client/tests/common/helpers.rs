use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tipjar_client::api::directory::{DirectoryError, IdentityDirectory, IdentityProfile};
use tipjar_client::resolver::name_service::{NameService, NameServiceError};
use tipjar_client::resolver::Resolve;
use tipjar_client::wallet::{TransferWallet, WalletError};
use tipjar_primitives::alloy::primitives::{Address, TxHash, B256, U256};
use tipjar_primitives::call::TransferCall;
use tipjar_primitives::lifecycle::SubmissionHandle;
use tipjar_primitives::resolution::{ResolutionKind, ResolutionResult};
use tipjar_primitives::sponsorship::SponsorshipCapability;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Wallet double with scripted outcomes and call counters.
pub struct MockWallet {
    pub account: Option<Address>,
    pub chain_id: AtomicU64,
    pub balance: U256,
    pub send_outcome: Result<SubmissionHandle, WalletError>,
    pub confirm_outcome: Result<TxHash, WalletError>,
    pub confirm_delay: Duration,
    pub sends: AtomicUsize,
    pub confirms: AtomicUsize,
    pub switches: AtomicUsize,
    pub last_capability: Mutex<Option<SponsorshipCapability>>,
}

impl MockWallet {
    pub fn new(account: Address, chain_id: u64, balance: U256) -> Self {
        Self {
            account: Some(account),
            chain_id: AtomicU64::new(chain_id),
            balance,
            send_outcome: Ok(SubmissionHandle::Transaction(TxHash::repeat_byte(0x11))),
            confirm_outcome: Ok(TxHash::repeat_byte(0x11)),
            confirm_delay: Duration::ZERO,
            sends: AtomicUsize::new(0),
            confirms: AtomicUsize::new(0),
            switches: AtomicUsize::new(0),
            last_capability: Mutex::new(None),
        }
    }

    pub fn disconnected(mut self) -> Self {
        self.account = None;
        self
    }

    pub fn with_send_outcome(mut self, outcome: Result<SubmissionHandle, WalletError>) -> Self {
        self.send_outcome = outcome;
        self
    }

    pub fn with_confirm_outcome(mut self, outcome: Result<TxHash, WalletError>) -> Self {
        self.confirm_outcome = outcome;
        self
    }

    pub fn with_confirm_delay(mut self, delay: Duration) -> Self {
        self.confirm_delay = delay;
        self
    }

    pub fn send_count(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }

    pub fn last_capability(&self) -> Option<SponsorshipCapability> {
        self.last_capability.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransferWallet for MockWallet {
    async fn account(&self) -> Option<Address> {
        self.account
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        Ok(self.chain_id.load(Ordering::SeqCst))
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        self.switches.fetch_add(1, Ordering::SeqCst);
        self.chain_id.store(chain_id, Ordering::SeqCst);
        Ok(())
    }

    async fn balance(&self, _account: Address) -> Result<U256, WalletError> {
        Ok(self.balance)
    }

    async fn send_transfer(
        &self,
        _call: &TransferCall,
        capability: Option<&SponsorshipCapability>,
    ) -> Result<SubmissionHandle, WalletError> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        *self.last_capability.lock().unwrap() = capability.cloned();
        self.send_outcome.clone()
    }

    async fn confirm(&self, _handle: &SubmissionHandle) -> Result<TxHash, WalletError> {
        self.confirms.fetch_add(1, Ordering::SeqCst);
        if !self.confirm_delay.is_zero() {
            tokio::time::sleep(self.confirm_delay).await;
        }
        self.confirm_outcome.clone()
    }
}

/// Name service answering from a fixed table. Clones share the call counter.
#[derive(Clone, Default)]
pub struct StubNameService {
    names: HashMap<String, Address>,
    calls: Arc<AtomicUsize>,
}

impl StubNameService {
    pub fn with_name(mut self, name: &str, address: Address) -> Self {
        self.names.insert(name.to_string(), address);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NameService for StubNameService {
    async fn resolve_name(&self, name: &str) -> Result<Option<Address>, NameServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.names.get(name).copied())
    }
}

/// Identity directory that counts lookups and never finds anyone.
#[derive(Clone, Default)]
pub struct CountingDirectory {
    calls: Arc<AtomicUsize>,
}

impl CountingDirectory {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityDirectory for CountingDirectory {
    async fn lookup_username(&self, _username: &str) -> Result<IdentityProfile, DirectoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(DirectoryError::NotFound)
    }
}

/// Resolver that takes a per-input amount of time and records what it resolved.
/// Clones share the record.
#[derive(Clone, Default)]
pub struct DelayedResolver {
    delays: HashMap<String, Duration>,
    resolved: Arc<Mutex<Vec<String>>>,
}

impl DelayedResolver {
    pub fn with_delay(mut self, input: &str, delay: Duration) -> Self {
        self.delays.insert(input.to_string(), delay);
        self
    }

    pub fn resolved_inputs(&self) -> Vec<String> {
        self.resolved.lock().unwrap().clone()
    }
}

/// Deterministic address per input so results can be told apart.
pub fn address_for(input: &str) -> Address {
    Address::repeat_byte(input.bytes().fold(0u8, |acc, b| acc.wrapping_add(b)))
}

#[async_trait]
impl Resolve for DelayedResolver {
    async fn resolve(&self, input: &str) -> ResolutionResult {
        if let Some(delay) = self.delays.get(input) {
            tokio::time::sleep(*delay).await;
        }
        self.resolved.lock().unwrap().push(input.to_string());
        ResolutionResult::resolved(ResolutionKind::SocialIdentity, address_for(input))
    }
}

/// Json-rpc node double. `handler` maps `(method, params)` to a result or an
/// error `(code, message)`; the reply echoes the request id.
pub async fn mock_rpc_node<F>(handler: F) -> MockServer
where
    F: Fn(&str, &Value) -> Result<Value, (i64, String)> + Send + Sync + 'static,
{
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(move |request: &Request| {
            let body: Value = serde_json::from_slice(&request.body).unwrap();
            let rpc_method = body["method"].as_str().unwrap_or_default();
            let reply = match handler(rpc_method, &body["params"]) {
                Ok(result) => json!({ "jsonrpc": "2.0", "id": body["id"], "result": result }),
                Err((code, message)) => json!({
                    "jsonrpc": "2.0",
                    "id": body["id"],
                    "error": { "code": code, "message": message }
                }),
            };
            ResponseTemplate::new(200).set_body_json(reply)
        })
        .mount(&server)
        .await;
    server
}

/// Methods the node double received, in order.
pub async fn rpc_methods(server: &MockServer) -> Vec<String> {
    rpc_requests(server)
        .await
        .into_iter()
        .map(|(rpc_method, _)| rpc_method)
        .collect()
}

/// `(method, params)` of every request the node double received.
pub async fn rpc_requests(server: &MockServer) -> Vec<(String, Value)> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| {
            let body: Value = serde_json::from_slice(&request.body).unwrap();
            (body["method"].as_str().unwrap_or_default().to_string(), body["params"].clone())
        })
        .collect()
}

/// Abi word holding an address, as returned by `eth_call`.
pub fn address_word(address: Address) -> Value {
    json!(B256::left_padding_from(address.as_slice()))
}

/// Target of an `eth_call`.
pub fn call_target(params: &Value) -> Address {
    params[0]["to"].as_str().unwrap().parse().unwrap()
}
