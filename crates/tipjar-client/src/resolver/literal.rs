use async_trait::async_trait;
use tipjar_primitives::address::{is_valid_address, parse_address};
use tipjar_primitives::resolution::{ResolutionError, ResolutionKind, ResolutionResult};

use super::ResolutionStrategy;

/// Claims input that is already a valid address and resolves it offline.
///
/// Anything else, including `0x` handles that merely look like hex, falls through
/// to the later strategies.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralAddressStrategy;

#[async_trait]
impl ResolutionStrategy for LiteralAddressStrategy {
    fn kind(&self) -> ResolutionKind {
        ResolutionKind::LiteralAddress
    }

    fn matches(&self, input: &str) -> bool {
        is_valid_address(input)
    }

    async fn resolve(&self, input: &str) -> ResolutionResult {
        match parse_address(input) {
            Ok(address) => ResolutionResult::resolved(ResolutionKind::LiteralAddress, address),
            Err(e) => {
                tracing::debug!("rejecting literal address: {}", e);
                ResolutionResult::failed(
                    ResolutionKind::LiteralAddress,
                    ResolutionError::InvalidAddress,
                )
            }
        }
    }
}
