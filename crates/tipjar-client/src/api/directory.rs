use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client, StatusCode,
};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::error::{ClientError, Result};

const USER_BY_USERNAME_PATH: &str = "v2/farcaster/user/by_username";
const API_KEY_HEADER: &str = "api_key";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("identity directory api key is not configured")]
    MissingApiKey,
    #[error("user not found")]
    NotFound,
    #[error("identity directory returned status {0}")]
    Status(u16),
    #[error("identity directory request failed: {0}")]
    Transport(String),
    #[error("failed to decode identity directory response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VerifiedAddresses {
    #[serde(default)]
    pub eth_addresses: Vec<String>,
}

/// The subset of a directory user profile needed to pick a recipient.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IdentityProfile {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub pfp_url: Option<String>,
    #[serde(default)]
    pub verified_addresses: VerifiedAddresses,
}

impl IdentityProfile {
    pub fn first_verified_address(&self) -> Option<&str> {
        self.verified_addresses
            .eth_addresses
            .first()
            .map(String::as_str)
    }

    /// Display name, falling back to the username when blank.
    pub fn label(&self) -> Option<String> {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .or(Some(self.username.as_str()).filter(|name| !name.is_empty()))
            .map(str::to_string)
    }
}

#[derive(Debug, Deserialize)]
struct UserEnvelope {
    #[serde(default)]
    user: IdentityProfile,
}

/// Maps social usernames to their verified on-chain addresses.
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    async fn lookup_username(
        &self,
        username: &str,
    ) -> core::result::Result<IdentityProfile, DirectoryError>;
}

/// Identity directory over the Neynar user-by-username endpoint.
#[derive(Debug, Clone)]
pub struct DirectoryApiClient {
    api_key: Option<String>,
    client: Client,
    base_url: Url,
}

impl DirectoryApiClient {
    pub fn new(base_url: Url, api_key: Option<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ClientError::HttpClientError(e.to_string()))?;

        Ok(Self {
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            client,
            base_url,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl IdentityDirectory for DirectoryApiClient {
    async fn lookup_username(
        &self,
        username: &str,
    ) -> core::result::Result<IdentityProfile, DirectoryError> {
        let api_key = self.api_key.as_deref().ok_or(DirectoryError::MissingApiKey)?;

        let mut url = self
            .base_url
            .join(USER_BY_USERNAME_PATH)
            .map_err(|e| DirectoryError::Transport(e.to_string()))?;
        url.query_pairs_mut().append_pair("username", username);

        tracing::debug!("looking up identity {}", username);

        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, api_key)
            .send()
            .await
            .map_err(|e| DirectoryError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(DirectoryError::NotFound);
        }
        if !status.is_success() {
            return Err(DirectoryError::Status(status.as_u16()));
        }

        let envelope = response
            .json::<UserEnvelope>()
            .await
            .map_err(|e| DirectoryError::Decode(e.to_string()))?;

        Ok(envelope.user)
    }
}
