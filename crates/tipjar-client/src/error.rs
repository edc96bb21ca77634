use tipjar_primitives::PrimitivesError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Config error: {0}")]
    ConfigError(String),
    #[error("Failed to build http client: {0}")]
    HttpClientError(String),
    #[error("Failed to parse url: {0}")]
    UrlParsingError(String),
    #[error("Wallet error: {0}")]
    WalletError(#[from] crate::wallet::WalletError),
    #[error("Primitives error: {0}")]
    PrimitivesError(#[from] PrimitivesError),
}

pub type Result<T> = core::result::Result<T, ClientError>;
