//! Debounced, supersession-safe resolution for interactive input.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tipjar_primitives::resolution::ResolutionResult;
use tokio_util::sync::CancellationToken;

use super::Resolve;

/// A resolution result that was accepted as current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettledResolution {
    pub sequence: u64,
    pub input: String,
    pub result: ResolutionResult,
}

#[derive(Debug, Default)]
struct SessionState {
    sequence: u64,
    latest: Option<SettledResolution>,
}

/// Drives a resolver from a stream of input edits.
///
/// Each edit gets a sequence number. Only the edit holding the newest sequence may
/// settle a result, whatever order the lookups finish in. Lookups already in flight
/// are never aborted; a superseded one simply has its result dropped.
#[derive(Debug)]
pub struct ResolutionSession<R> {
    resolver: R,
    quiet_period: Duration,
    state: Mutex<SessionState>,
    shutdown: CancellationToken,
}

impl<R: Resolve> ResolutionSession<R> {
    pub fn new(resolver: R, quiet_period: Duration) -> Self {
        Self {
            resolver,
            quiet_period,
            state: Mutex::new(SessionState::default()),
            shutdown: CancellationToken::new(),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Handle an input edit.
    ///
    /// Empty input settles immediately. Otherwise waits out the quiet period, then
    /// resolves. Returns the settled result, or `None` if a newer edit arrived or the
    /// session was closed first.
    pub async fn submit_input(&self, input: &str) -> Option<ResolutionResult> {
        if self.shutdown.is_cancelled() {
            return None;
        }

        let sequence = {
            let mut state = self.state();
            state.sequence += 1;
            state.sequence
        };

        let input = input.trim();
        if input.is_empty() {
            let result = ResolutionResult::empty();
            return self.settle(sequence, input, result);
        }

        tokio::select! {
            _ = self.shutdown.cancelled() => return None,
            _ = tokio::time::sleep(self.quiet_period) => {}
        }

        if !self.is_current(sequence) {
            tracing::debug!("input {:?} superseded before lookup", input);
            return None;
        }

        let result = self.resolver.resolve(input).await;
        self.settle(sequence, input, result)
    }

    fn is_current(&self, sequence: u64) -> bool {
        self.state().sequence == sequence
    }

    fn settle(&self, sequence: u64, input: &str, result: ResolutionResult) -> Option<ResolutionResult> {
        let mut state = self.state();
        if state.sequence != sequence || self.shutdown.is_cancelled() {
            tracing::debug!("discarding stale resolution for {:?}", input);
            return None;
        }

        state.latest = Some(SettledResolution {
            sequence,
            input: input.to_string(),
            result: result.clone(),
        });
        Some(result)
    }

    /// Most recently settled result.
    pub fn latest(&self) -> Option<SettledResolution> {
        self.state().latest.clone()
    }

    /// True while the newest edit has not settled yet.
    pub fn is_resolving(&self) -> bool {
        let state = self.state();
        let settled = state.latest.as_ref().map_or(0, |latest| latest.sequence);
        !self.shutdown.is_cancelled() && state.sequence > settled
    }

    /// Tear down: pending quiet periods end without a lookup and nothing settles
    /// afterwards.
    pub fn close(&self) {
        self.shutdown.cancel();
    }
}
