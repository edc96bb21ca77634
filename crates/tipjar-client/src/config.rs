//! Client Configurations

use std::{fs, str::FromStr, time::Duration};

use serde::Deserialize;
use tipjar_primitives::alloy::primitives::Address;
use tipjar_primitives::chains::{
    BASENAME_REGISTRY_ADDRESS, BASENAME_SUFFIX, BASE_CHAIN_ID, BASE_PUBLIC_RPC_URL,
};
use tipjar_primitives::env::Environment;
use tipjar_primitives::sponsorship::{negotiate_sponsorship, SponsorshipCapability};
use tracing::Level;
use url::Url;

use crate::error::{ClientError, Result};

pub const DEFAULT_IDENTITY_API_URL: &str = "https://api.neynar.com/";
pub const DEFAULT_DEBOUNCE_MS: u64 = 700;
pub const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    #[serde(default = "default_name_registry")]
    pub name_registry: Address,
    #[serde(default = "default_name_suffix")]
    pub name_suffix: String,
    #[serde(default = "default_identity_api_url")]
    pub identity_api_url: String,
    /// Identity lookups fail with a "not configured" error without it.
    #[serde(default)]
    pub identity_api_key: Option<String>,
    /// Gas sponsorship is skipped without it.
    #[serde(default)]
    pub sponsorship_url: Option<String>,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_confirmation_timeout_secs")]
    pub confirmation_timeout_secs: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_rpc_url() -> String {
    BASE_PUBLIC_RPC_URL.to_string()
}

fn default_chain_id() -> u64 {
    BASE_CHAIN_ID
}

fn default_name_registry() -> Address {
    BASENAME_REGISTRY_ADDRESS
}

fn default_name_suffix() -> String {
    BASENAME_SUFFIX.to_string()
}

fn default_identity_api_url() -> String {
    DEFAULT_IDENTITY_API_URL.to_string()
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_confirmation_timeout_secs() -> u64 {
    DEFAULT_CONFIRMATION_TIMEOUT_SECS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            chain_id: default_chain_id(),
            name_registry: default_name_registry(),
            name_suffix: default_name_suffix(),
            identity_api_url: default_identity_api_url(),
            identity_api_key: None,
            sponsorship_url: None,
            debounce_ms: default_debounce_ms(),
            confirmation_timeout_secs: default_confirmation_timeout_secs(),
            log_level: default_log_level(),
        }
    }
}

impl ClientConfig {
    /// Load a json config file. Missing fields take their defaults.
    pub fn from_file(path: &str) -> Result<Self> {
        let data = fs::read_to_string(path)
            .map_err(|e| ClientError::ConfigError(format!("failed to read {path}: {e}")))?;
        let config: ClientConfig = serde_json::from_str(&data)
            .map_err(|e| ClientError::ConfigError(format!("failed to parse {path}: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from process environment variables (call `dotenv().ok()` first to pick up
    /// a `.env` file).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let environment = get("ENV")
            .map(|v| Environment::parse(&v))
            .unwrap_or(Environment::Development);

        let rpc_url = match (get("RPC_URL"), environment) {
            (Some(url), _) => url,
            (None, Environment::Production) => {
                return Err(ClientError::ConfigError(
                    "RPC_URL must be set in production".into(),
                ))
            }
            (None, Environment::Development) => default_rpc_url(),
        };

        let mut config = ClientConfig {
            rpc_url,
            identity_api_key: get("NEYNAR_API_KEY"),
            sponsorship_url: get("PAYMASTER_URL"),
            ..Default::default()
        };

        if let Some(chain_id) = get("CHAIN_ID") {
            config.chain_id = parse_var("CHAIN_ID", &chain_id)?;
        }
        if let Some(registry) = get("NAME_REGISTRY") {
            config.name_registry = Address::from_str(&registry)
                .map_err(|e| ClientError::ConfigError(format!("NAME_REGISTRY: {e}")))?;
        }
        if let Some(suffix) = get("NAME_SUFFIX") {
            config.name_suffix = suffix;
        }
        if let Some(url) = get("IDENTITY_API_URL") {
            config.identity_api_url = url;
        }
        if let Some(ms) = get("RESOLVE_DEBOUNCE_MS") {
            config.debounce_ms = parse_var("RESOLVE_DEBOUNCE_MS", &ms)?;
        }
        if let Some(secs) = get("CONFIRMATION_TIMEOUT_SECS") {
            config.confirmation_timeout_secs = parse_var("CONFIRMATION_TIMEOUT_SECS", &secs)?;
        }
        if let Some(level) = get("LOG_LEVEL") {
            config.log_level = level;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.rpc_url()?;
        self.identity_api_url()?;
        self.log_level()?;
        if !self.name_suffix.starts_with('.') || self.name_suffix.len() < 2 {
            return Err(ClientError::ConfigError(format!(
                "name suffix {:?} must start with '.'",
                self.name_suffix
            )));
        }
        Ok(())
    }

    pub fn rpc_url(&self) -> Result<Url> {
        Url::parse(&self.rpc_url).map_err(|e| ClientError::UrlParsingError(e.to_string()))
    }

    pub fn identity_api_url(&self) -> Result<Url> {
        Url::parse(&self.identity_api_url)
            .map_err(|e| ClientError::UrlParsingError(e.to_string()))
    }

    pub fn log_level(&self) -> Result<Level> {
        Level::from_str(&self.log_level)
            .map_err(|_| ClientError::ConfigError(format!("bad log level {}", self.log_level)))
    }

    pub fn sponsorship(&self) -> Option<SponsorshipCapability> {
        negotiate_sponsorship(self.sponsorship_url.as_deref())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| ClientError::ConfigError(format!("{key}: {e}")))
}
