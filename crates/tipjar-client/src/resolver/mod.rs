//! Recipient resolution.
//!
//! User input is matched against an ordered list of strategies and the first one
//! that claims it produces the result. The standard order is literal address, then
//! name service, then social identity: unambiguous and offline first, the most
//! permissive and failure prone last.

use std::fmt;

use async_trait::async_trait;
use tipjar_primitives::alloy::network::Network;
use tipjar_primitives::alloy::providers::Provider;
use tipjar_primitives::alloy::transports::Transport;
use tipjar_primitives::resolution::{ResolutionError, ResolutionKind, ResolutionResult};

use crate::api::directory::{DirectoryApiClient, IdentityDirectory};
use crate::config::ClientConfig;
use crate::error::Result;

pub mod identity;
pub mod literal;
pub mod name_service;
pub mod session;

use identity::SocialIdentityStrategy;
use literal::LiteralAddressStrategy;
use name_service::{NameService, NameServiceStrategy, RegistryNameService};

/// One way of turning user input into an address.
#[async_trait]
pub trait ResolutionStrategy: Send + Sync {
    fn kind(&self) -> ResolutionKind;

    /// Whether this strategy claims the (trimmed, non-empty) input. Must not do I/O.
    fn matches(&self, input: &str) -> bool;

    /// Resolve a claimed input. Failures are reported inside the result.
    async fn resolve(&self, input: &str) -> ResolutionResult;
}

/// Anything that can resolve raw recipient input.
#[async_trait]
pub trait Resolve: Send + Sync {
    async fn resolve(&self, input: &str) -> ResolutionResult;
}

pub struct RecipientResolver {
    strategies: Vec<Box<dyn ResolutionStrategy>>,
}

impl RecipientResolver {
    /// A resolver with no strategies; add them in priority order.
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    pub fn with_strategy(mut self, strategy: impl ResolutionStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    /// Literal address, then name service under `name_suffix`, then identity directory.
    pub fn standard<S, D>(name_service: S, name_suffix: &str, directory: D) -> Self
    where
        S: NameService + 'static,
        D: IdentityDirectory + 'static,
    {
        Self::new()
            .with_strategy(LiteralAddressStrategy)
            .with_strategy(NameServiceStrategy::new(name_service, name_suffix))
            .with_strategy(SocialIdentityStrategy::new(directory))
    }

    /// Standard resolver wired to the configured registry and identity directory.
    pub fn from_config<T, P, N>(config: &ClientConfig, rpc_provider: P) -> Result<Self>
    where
        T: Transport + Clone,
        P: Provider<T, N> + Clone + 'static,
        N: Network,
    {
        let name_service = RegistryNameService::new(rpc_provider, config.name_registry);
        let directory = DirectoryApiClient::new(
            config.identity_api_url()?,
            config.identity_api_key.clone(),
        )?;
        if !directory.is_configured() {
            tracing::warn!("identity directory api key not set, username lookups disabled");
        }

        Ok(Self::standard(name_service, &config.name_suffix, directory))
    }

    pub fn strategy_kinds(&self) -> Vec<ResolutionKind> {
        self.strategies.iter().map(|s| s.kind()).collect()
    }

    /// Resolve raw input. Never fails; errors are carried in the result.
    pub async fn resolve(&self, input: &str) -> ResolutionResult {
        let input = input.trim();
        if input.is_empty() {
            return ResolutionResult::empty();
        }

        match self.strategies.iter().find(|s| s.matches(input)) {
            Some(strategy) => {
                tracing::debug!("resolving {:?} as {:?}", input, strategy.kind());
                strategy.resolve(input).await
            }
            None => ResolutionResult::failed(
                ResolutionKind::Unresolved,
                ResolutionError::Unsupported,
            ),
        }
    }
}

impl Default for RecipientResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RecipientResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecipientResolver")
            .field("strategies", &self.strategy_kinds())
            .finish()
    }
}

#[async_trait]
impl Resolve for RecipientResolver {
    async fn resolve(&self, input: &str) -> ResolutionResult {
        RecipientResolver::resolve(self, input).await
    }
}
