use serde_json::{json, Value};
use url::Url;

use crate::{PrimitivesError, Result};

/// A paymaster endpoint the wallet may use to sponsor gas for a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SponsorshipCapability {
    service_url: Url,
}

impl SponsorshipCapability {
    pub fn parse(configured: &str) -> Result<Self> {
        let configured = configured.trim();
        if configured.is_empty() {
            return Err(PrimitivesError::InvalidSponsorshipUrl("empty url".into()));
        }

        let service_url = Url::parse(configured)
            .map_err(|e| PrimitivesError::InvalidSponsorshipUrl(e.to_string()))?;

        if !matches!(service_url.scheme(), "http" | "https") || service_url.host().is_none() {
            return Err(PrimitivesError::InvalidSponsorshipUrl(format!(
                "{configured} is not an http(s) url"
            )));
        }

        Ok(Self { service_url })
    }

    pub fn service_url(&self) -> &Url {
        &self.service_url
    }

    /// Wallet capability object, as sent alongside `wallet_sendCalls`.
    pub fn to_capabilities(&self) -> Value {
        json!({ "paymasterService": { "url": self.service_url.as_str() } })
    }
}

/// Decide whether gas sponsorship is requested for a submission.
///
/// Anything other than a well-formed http(s) url means the sender pays gas.
#[must_use]
pub fn negotiate_sponsorship(configured: Option<&str>) -> Option<SponsorshipCapability> {
    let configured = configured?;
    match SponsorshipCapability::parse(configured) {
        Ok(capability) => Some(capability),
        Err(e) => {
            tracing::warn!("sponsorship disabled: {}", e);
            None
        }
    }
}
