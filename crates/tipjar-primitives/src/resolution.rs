//! Recipient resolution results.

use alloy::primitives::Address;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// How a recipient was (or was attempted to be) identified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionKind {
    LiteralAddress,
    NameService,
    SocialIdentity,
    Unresolved,
}

/// Coarse failure category shared by resolution and submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    Unverified,
    NetworkFailure,
    ChainMismatch,
    UserRejected,
    SubmissionFailed,
}

/// Why a recipient could not be resolved. The display strings are shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("invalid address")]
    InvalidAddress,
    #[error("invalid name")]
    InvalidName,
    #[error("not found")]
    NameNotFound,
    #[error("name lookup failed: {0}")]
    NameLookupFailed(String),
    #[error("invalid username")]
    InvalidUsername,
    #[error("user not found")]
    UserNotFound,
    #[error("no verified address")]
    NoVerifiedAddress,
    #[error("resolution failed")]
    IdentityLookupFailed(String),
    #[error("identity directory not configured")]
    DirectoryNotConfigured,
    #[error("unsupported recipient")]
    Unsupported,
}

impl ResolutionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolutionError::InvalidAddress
            | ResolutionError::InvalidName
            | ResolutionError::InvalidUsername
            | ResolutionError::Unsupported => ErrorKind::InvalidInput,
            ResolutionError::NameNotFound | ResolutionError::UserNotFound => ErrorKind::NotFound,
            ResolutionError::NoVerifiedAddress => ErrorKind::Unverified,
            ResolutionError::NameLookupFailed(_)
            | ResolutionError::IdentityLookupFailed(_)
            | ResolutionError::DirectoryNotConfigured => ErrorKind::NetworkFailure,
        }
    }
}

/// Outcome of one resolution attempt.
///
/// At most one of `address` and `error` is set; neither means there was no input.
/// Profile metadata only ever accompanies a resolved address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResult {
    address: Option<Address>,
    kind: ResolutionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar_url: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_error"
    )]
    error: Option<ResolutionError>,
}

impl ResolutionResult {
    /// Nothing typed yet.
    pub fn empty() -> Self {
        Self {
            address: None,
            kind: ResolutionKind::Unresolved,
            display_name: None,
            avatar_url: None,
            error: None,
        }
    }

    pub fn resolved(kind: ResolutionKind, address: Address) -> Self {
        Self {
            address: Some(address),
            kind,
            ..Self::empty()
        }
    }

    pub fn failed(kind: ResolutionKind, error: ResolutionError) -> Self {
        Self {
            kind,
            error: Some(error),
            ..Self::empty()
        }
    }

    /// Attach profile metadata. Ignored unless the result carries an address.
    pub fn with_profile(mut self, display_name: Option<String>, avatar_url: Option<String>) -> Self {
        if self.address.is_some() {
            self.display_name = display_name;
            self.avatar_url = avatar_url;
        }
        self
    }

    pub fn address(&self) -> Option<Address> {
        self.address
    }

    pub fn kind(&self) -> ResolutionKind {
        self.kind
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }

    pub fn error(&self) -> Option<&ResolutionError> {
        self.error.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.address.is_none() && self.error.is_none()
    }

    pub fn is_resolved(&self) -> bool {
        self.address.is_some()
    }
}

impl Default for ResolutionResult {
    fn default() -> Self {
        Self::empty()
    }
}

fn serialize_error<S: Serializer>(
    error: &Option<ResolutionError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(error) => serializer.serialize_str(&error.to_string()),
        None => serializer.serialize_none(),
    }
}
