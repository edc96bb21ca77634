use async_trait::async_trait;
use tipjar_primitives::address::parse_address;
use tipjar_primitives::resolution::{ResolutionError, ResolutionKind, ResolutionResult};

use super::ResolutionStrategy;
use crate::api::directory::{DirectoryError, IdentityDirectory};

/// Fallback strategy: treats any input as a social username.
#[derive(Debug)]
pub struct SocialIdentityStrategy<D> {
    directory: D,
}

impl<D: IdentityDirectory> SocialIdentityStrategy<D> {
    pub fn new(directory: D) -> Self {
        Self { directory }
    }
}

/// Strip one leading `@`, trim and lower-case.
pub fn normalize_username(input: &str) -> String {
    let input = input.trim();
    input.strip_prefix('@').unwrap_or(input).trim().to_lowercase()
}

fn failed(error: ResolutionError) -> ResolutionResult {
    ResolutionResult::failed(ResolutionKind::SocialIdentity, error)
}

#[async_trait]
impl<D: IdentityDirectory> ResolutionStrategy for SocialIdentityStrategy<D> {
    fn kind(&self) -> ResolutionKind {
        ResolutionKind::SocialIdentity
    }

    fn matches(&self, _input: &str) -> bool {
        true
    }

    async fn resolve(&self, input: &str) -> ResolutionResult {
        let username = normalize_username(input);
        if username.is_empty() {
            return failed(ResolutionError::InvalidUsername);
        }

        let profile = match self.directory.lookup_username(&username).await {
            Ok(profile) => profile,
            Err(DirectoryError::NotFound) => return failed(ResolutionError::UserNotFound),
            Err(DirectoryError::MissingApiKey) => {
                return failed(ResolutionError::DirectoryNotConfigured)
            }
            Err(e) => {
                tracing::warn!("identity lookup for {} failed: {}", username, e);
                return failed(ResolutionError::IdentityLookupFailed(e.to_string()));
            }
        };

        let Some(verified) = profile.first_verified_address() else {
            return failed(ResolutionError::NoVerifiedAddress);
        };

        match parse_address(&verified.to_lowercase()) {
            Ok(address) => {
                tracing::info!("resolved @{} to {}", username, address);
                ResolutionResult::resolved(ResolutionKind::SocialIdentity, address)
                    .with_profile(profile.label(), profile.pfp_url.clone())
            }
            Err(e) => {
                tracing::warn!("directory returned unusable address for {}: {}", username, e);
                failed(ResolutionError::IdentityLookupFailed(e.to_string()))
            }
        }
    }
}
