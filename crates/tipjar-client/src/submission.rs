//! Transfer submission orchestrator.
//!
//! [`TransferSubmitter`] owns one lifecycle and drives it through a connected
//! [`TransferWallet`]. Each successful trigger yields the states it passes through as
//! a stream; observers that are not driving the submission can [`subscribe`] instead.
//!
//! [`subscribe`]: TransferSubmitter::subscribe

use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::Stream;
use tipjar_primitives::amount::format_balance;
use tipjar_primitives::chains::chain_name;
use tipjar_primitives::lifecycle::{LifecycleState, SubmissionFailure, SubmissionHandle};
use tipjar_primitives::resolution::ErrorKind;
use tokio::sync::watch;

use crate::wallet::{TransferWallet, WalletError};

pub use tipjar_primitives::call::{build_call, TransferCall};
pub use tipjar_primitives::chains::chain_check;
pub use tipjar_primitives::sponsorship::{negotiate_sponsorship, SponsorshipCapability};

/// States entered by one submission, in order.
pub type LifecycleStream<'a> = Pin<Box<dyn Stream<Item = LifecycleState> + Send + 'a>>;

const ABANDONED_MESSAGE: &str = "submission abandoned";

pub struct TransferSubmitter<W> {
    wallet: W,
    required_chain_id: u64,
    state: watch::Sender<LifecycleState>,
    celebration: AtomicBool,
}

impl<W> TransferSubmitter<W> {
    /// Apply `next` if the lifecycle allows it from the current state.
    fn transition(&self, next: LifecycleState) -> bool {
        self.state.send_if_modified(|current| {
            if !current.can_transition_to(&next) {
                tracing::debug!(
                    "rejected lifecycle transition {} -> {}",
                    current.name(),
                    next.name()
                );
                return false;
            }
            tracing::info!("submission {} -> {}", current.name(), next.name());
            *current = next;
            true
        })
    }

    fn fail(&self, failure: SubmissionFailure) -> LifecycleState {
        tracing::warn!("submission failed ({:?}): {}", failure.kind, failure.message);
        let state = LifecycleState::Error(failure);
        self.transition(state.clone());
        state
    }
}

impl<W: TransferWallet> TransferSubmitter<W> {
    /// `required_chain_id` is the only chain a transfer may be signed on.
    pub fn new(wallet: W, required_chain_id: u64) -> Self {
        let (state, _) = watch::channel(LifecycleState::Idle);
        Self {
            wallet,
            required_chain_id,
            state,
            celebration: AtomicBool::new(false),
        }
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    pub fn required_chain_id(&self) -> u64 {
        self.required_chain_id
    }

    pub fn state(&self) -> LifecycleState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// Whether a trigger with `call` would start a submission.
    pub fn can_submit(&self, call: Option<&TransferCall>) -> bool {
        call.is_some() && matches!(*self.state.borrow(), LifecycleState::Idle)
    }

    /// Return to `Idle` after a success or an error. Any other state is left alone.
    pub fn reset(&self) -> bool {
        let reset = self.transition(LifecycleState::Idle);
        if reset {
            self.celebration.store(false, Ordering::SeqCst);
        }
        reset
    }

    /// True once after each success, false until the next one.
    pub fn take_celebration(&self) -> bool {
        self.celebration.swap(false, Ordering::SeqCst)
    }

    pub async fn chain_matches(&self) -> Result<bool, WalletError> {
        let connected = self.wallet.chain_id().await?;
        Ok(chain_check(connected, self.required_chain_id))
    }

    pub async fn switch_to_required_chain(&self) -> Result<(), WalletError> {
        self.wallet.switch_chain(self.required_chain_id).await
    }

    /// Start a submission.
    ///
    /// The `Idle -> Building` claim happens before this returns, so a second trigger
    /// while the first is in flight gets an empty stream and never reaches the wallet.
    /// A `None` call is likewise a no-op. Dropping the stream before it finishes
    /// leaves the submitter in `Error` rather than stuck mid-flight.
    pub fn submit(
        &self,
        call: Option<TransferCall>,
        capability: Option<SponsorshipCapability>,
    ) -> LifecycleStream<'_> {
        let Some(call) = call else {
            tracing::debug!("submission triggered without a valid transfer");
            return Box::pin(futures::stream::empty());
        };

        if !self.transition(LifecycleState::Building) {
            tracing::warn!("submission already {}, ignoring trigger", self.state().name());
            return Box::pin(futures::stream::empty());
        }

        // Built outside the generator so it also fires if the stream is never polled.
        let guard = AbandonGuard {
            submitter: self,
            armed: true,
        };

        Box::pin(async_stream::stream! {
            let mut guard = guard;
            yield LifecycleState::Building;

            let handle = match self.broadcast(&call, capability.as_ref()).await {
                Ok(handle) => handle,
                Err(failure) => {
                    guard.armed = false;
                    yield self.fail(failure);
                    return;
                }
            };

            let pending = LifecycleState::Pending { handle: handle.clone() };
            self.transition(pending.clone());
            yield pending;

            match self.wallet.confirm(&handle).await {
                Ok(tx_hash) => {
                    let success = LifecycleState::Success { tx_hash };
                    self.transition(success.clone());
                    self.celebration.store(true, Ordering::SeqCst);
                    guard.armed = false;
                    yield success;
                }
                Err(e) => {
                    guard.armed = false;
                    yield self.fail(e.to_failure());
                }
            }
        })
    }

    async fn broadcast(
        &self,
        call: &TransferCall,
        capability: Option<&SponsorshipCapability>,
    ) -> Result<SubmissionHandle, SubmissionFailure> {
        let connected = self.wallet.chain_id().await.map_err(|e| e.to_failure())?;
        if !chain_check(connected, self.required_chain_id) {
            return Err(SubmissionFailure::new(
                ErrorKind::ChainMismatch,
                format!(
                    "wallet is on {}, switch to {}",
                    chain_name(connected),
                    chain_name(self.required_chain_id)
                ),
            ));
        }

        let account = self
            .wallet
            .account()
            .await
            .ok_or_else(|| WalletError::NotConnected.to_failure())?;

        let balance = self
            .wallet
            .balance(account)
            .await
            .map_err(|e| e.to_failure())?;
        if balance < call.value() {
            let reason = format!("balance is {} ETH", format_balance(balance));
            return Err(WalletError::InsufficientFunds(reason).to_failure());
        }

        if capability.is_some() {
            tracing::info!("sending {} wei to {} with gas sponsorship", call.value(), call.to());
        } else {
            tracing::info!("sending {} wei to {}", call.value(), call.to());
        }

        self.wallet
            .send_transfer(call, capability)
            .await
            .map_err(|e| e.to_failure())
    }
}

impl<W> std::fmt::Debug for TransferSubmitter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferSubmitter")
            .field("required_chain_id", &self.required_chain_id)
            .field("state", &*self.state.borrow())
            .finish()
    }
}

struct AbandonGuard<'a, W> {
    submitter: &'a TransferSubmitter<W>,
    armed: bool,
}

impl<W> Drop for AbandonGuard<'_, W> {
    fn drop(&mut self) {
        if self.armed {
            self.submitter.fail(SubmissionFailure::new(
                ErrorKind::SubmissionFailed,
                ABANDONED_MESSAGE,
            ));
        }
    }
}
