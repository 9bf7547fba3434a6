//! Crypto errors.

use thiserror::Error;

/// Failures decoding keys and addresses.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Invalid prefix in a human-readable address
    #[error("Invalid address prefix: expected 'P-', got '{0}'")]
    InvalidAddressPrefix(String),

    /// Address string has no payload after the prefix
    #[error("Invalid address format: {0}")]
    InvalidAddressFormat(String),

    /// Invalid base58 encoding
    #[error("Invalid base58 encoding: {0}")]
    InvalidBase58(String),

    /// Invalid hex encoding
    #[error("Invalid hex encoding: {0}")]
    InvalidHex(String),

    /// Invalid key length
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },
}
