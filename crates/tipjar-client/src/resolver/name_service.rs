use std::fmt;
use std::marker::PhantomData;

use async_trait::async_trait;
use thiserror::Error;
use tipjar_primitives::abi::name_registry::{AddrResolver, NameRegistry};
use tipjar_primitives::alloy::network::Network;
use tipjar_primitives::alloy::primitives::Address;
use tipjar_primitives::alloy::providers::Provider;
use tipjar_primitives::alloy::transports::Transport;
use tipjar_primitives::resolution::{ResolutionError, ResolutionKind, ResolutionResult};
use tipjar_primitives::utils::{namehash, normalize_name, validate_name};

use super::ResolutionStrategy;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameServiceError {
    #[error("registry call failed: {0}")]
    Registry(String),
    #[error("resolver call failed: {0}")]
    Resolver(String),
}

/// Read access to an on-chain name registry.
#[async_trait]
pub trait NameService: Send + Sync {
    /// Address record for a normalized name, `None` if it is not registered.
    async fn resolve_name(&self, name: &str) -> Result<Option<Address>, NameServiceError>;
}

/// Name service backed by an ENS-style registry contract read over rpc.
pub struct RegistryNameService<T, P, N> {
    rpc_provider: P,
    registry_address: Address,
    phantom_data: PhantomData<(T, N)>,
}

impl<T, P, N> RegistryNameService<T, P, N>
where
    T: Transport + Clone,
    P: Provider<T, N> + Clone,
    N: Network,
{
    pub fn new(rpc_provider: P, registry_address: Address) -> Self {
        Self {
            rpc_provider,
            registry_address,
            phantom_data: PhantomData,
        }
    }
}

impl<T, P, N> fmt::Debug for RegistryNameService<T, P, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryNameService")
            .field("registry_address", &self.registry_address)
            .finish()
    }
}

#[async_trait]
impl<T, P, N> NameService for RegistryNameService<T, P, N>
where
    T: Transport + Clone,
    P: Provider<T, N> + Clone,
    N: Network,
{
    async fn resolve_name(&self, name: &str) -> Result<Option<Address>, NameServiceError> {
        let node = namehash(name);

        let registry = NameRegistry::new(self.registry_address, self.rpc_provider.clone());
        let resolver_address = registry
            .resolver(node)
            .call()
            .await
            .map_err(|e| NameServiceError::Registry(e.to_string()))?
            .resolverAddress;

        if resolver_address == Address::ZERO {
            tracing::debug!("no resolver set for {}", name);
            return Ok(None);
        }

        let resolver = AddrResolver::new(resolver_address, self.rpc_provider.clone());
        let resolved = resolver
            .addr(node)
            .call()
            .await
            .map_err(|e| NameServiceError::Resolver(e.to_string()))?
            .resolvedAddress;

        Ok((resolved != Address::ZERO).then_some(resolved))
    }
}

/// Claims names ending in the reserved suffix and looks them up in a [`NameService`].
#[derive(Debug)]
pub struct NameServiceStrategy<S> {
    name_service: S,
    suffix: String,
}

impl<S: NameService> NameServiceStrategy<S> {
    pub fn new(name_service: S, suffix: &str) -> Self {
        Self {
            name_service,
            suffix: normalize_name(suffix),
        }
    }
}

#[async_trait]
impl<S: NameService> ResolutionStrategy for NameServiceStrategy<S> {
    fn kind(&self) -> ResolutionKind {
        ResolutionKind::NameService
    }

    fn matches(&self, input: &str) -> bool {
        normalize_name(input).ends_with(&self.suffix)
    }

    async fn resolve(&self, input: &str) -> ResolutionResult {
        let name = normalize_name(input);
        if let Err(e) = validate_name(&name) {
            tracing::debug!("rejecting name: {}", e);
            return ResolutionResult::failed(ResolutionKind::NameService, ResolutionError::InvalidName);
        }

        match self.name_service.resolve_name(&name).await {
            Ok(Some(address)) => {
                tracing::info!("resolved {} to {}", name, address);
                ResolutionResult::resolved(ResolutionKind::NameService, address)
            }
            Ok(None) => {
                ResolutionResult::failed(ResolutionKind::NameService, ResolutionError::NameNotFound)
            }
            Err(e) => {
                tracing::warn!("name lookup for {} failed: {}", name, e);
                ResolutionResult::failed(
                    ResolutionKind::NameService,
                    ResolutionError::NameLookupFailed(e.to_string()),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tipjar_primitives::alloy::primitives::address;

    struct FixedNameService {
        answer: Result<Option<Address>, NameServiceError>,
        calls: AtomicUsize,
    }

    impl FixedNameService {
        fn new(answer: Result<Option<Address>, NameServiceError>) -> Self {
            Self {
                answer,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl NameService for FixedNameService {
        async fn resolve_name(&self, _name: &str) -> Result<Option<Address>, NameServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.clone()
        }
    }

    #[test]
    fn test_matches_suffix_case_insensitively() {
        let strategy = NameServiceStrategy::new(FixedNameService::new(Ok(None)), ".base.eth");
        assert!(strategy.matches("Vitalik.BASE.eth"));
        assert!(!strategy.matches("vitalik.eth"));
        assert!(!strategy.matches("base.eth"));
    }

    #[tokio::test]
    async fn test_malformed_name_skips_lookup() {
        let strategy = NameServiceStrategy::new(FixedNameService::new(Ok(None)), ".base.eth");
        let result = strategy.resolve("a..base.eth").await;
        assert_eq!(result.error(), Some(&ResolutionError::InvalidName));
        assert_eq!(strategy.name_service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_lookup_failure_is_described() {
        let strategy = NameServiceStrategy::new(
            FixedNameService::new(Err(NameServiceError::Registry("timeout".into()))),
            ".base.eth",
        );
        let result = strategy.resolve("jesse.base.eth").await;
        assert_eq!(
            result.error().map(ToString::to_string).as_deref(),
            Some("name lookup failed: registry call failed: timeout")
        );
        assert_eq!(result.kind(), ResolutionKind::NameService);
    }

    #[tokio::test]
    async fn test_resolved_name() {
        let owner = address!("d8dA6BF26964aF9D7eEd9e03E53415D37aA96045");
        let strategy = NameServiceStrategy::new(FixedNameService::new(Ok(Some(owner))), ".base.eth");
        let result = strategy.resolve("vitalik.base.eth").await;
        assert_eq!(result.address(), Some(owner));
    }
}
