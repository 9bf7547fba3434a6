//! Store errors.

use std::path::PathBuf;

use subnetctl_crypto::CryptoError;
use subnetctl_types::Network;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Failures reading or writing subnet state on disk.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A sidecar, bundle or transaction file is not valid JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Key material could not be decoded.
    #[error("Key error: {0}")]
    Crypto(#[from] CryptoError),

    /// No sidecar exists for the subnet.
    #[error("subnet '{0}' not found")]
    SubnetNotFound(String),

    /// A config bundle file is missing.
    #[error("{file} for subnet '{subnet}' not found")]
    BundleFileNotFound { subnet: String, file: &'static str },

    /// Transaction file is missing.
    #[error("transaction file not found: {}", .0.display())]
    ArtifactNotFound(PathBuf),

    /// No key with the given name.
    #[error("key '{0}' not found")]
    KeyNotFound(String),

    /// A record with this name already exists.
    #[error("'{0}' already exists")]
    AlreadyExists(String),

    /// The network entry is already populated.
    #[error("subnet '{subnet}' is already deployed to {network}")]
    AlreadyDeployed { subnet: String, network: Network },

    /// The network entry is absent.
    #[error("subnet '{subnet}' is not deployed to {network}")]
    NotDeployed { subnet: String, network: Network },

    /// Stored data is well-formed but inconsistent.
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl StoreError {
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        StoreError::InvalidData(msg.into())
    }

    /// Whether the error reports an absent record.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::SubnetNotFound(_)
                | StoreError::BundleFileNotFound { .. }
                | StoreError::ArtifactNotFound(_)
                | StoreError::KeyNotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::AlreadyDeployed {
            subnet: "sub1".to_string(),
            network: Network::Local,
        };
        assert_eq!(err.to_string(), "subnet 'sub1' is already deployed to local");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let store_err: StoreError = io_err.into();
        assert!(matches!(store_err, StoreError::Io(_)));
        assert!(!store_err.is_not_found());
    }

    #[test]
    fn test_not_found_classification() {
        assert!(StoreError::SubnetNotFound("x".into()).is_not_found());
        assert!(StoreError::ArtifactNotFound(PathBuf::from("tx.json")).is_not_found());
        assert!(!StoreError::AlreadyExists("x".into()).is_not_found());
    }
}
