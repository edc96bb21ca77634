use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrimitivesError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid sponsorship url: {0}")]
    InvalidSponsorshipUrl(String),
}

pub type Result<T> = core::result::Result<T, PrimitivesError>;
