use thiserror::Error;

/// Errors raised by the PXL currency domain.
#[derive(Error, Debug)]
pub enum CurrencyError {
    /// A query ran before `initialize` completed successfully.
    #[error("PXL currency data is not initialized; call initialize first")]
    NotInitialized,

    #[error("Invalid currency data: {0}")]
    InvalidData(String),

    #[error("Unknown tier '{0}'")]
    UnknownTier(String),

    #[error("Currency cache error: {0}")]
    CacheError(String),
}
