//! Error types for the operations layer.
//!
//! This module defines the `OpsError` enum returned by every operation in
//! this crate. Precondition violations are reported as-is; nothing here is
//! retried or recovered silently.

use std::path::PathBuf;

use subnetctl_crypto::Address;
use subnetctl_node::NodeError;
use subnetctl_store::StoreError;
use subnetctl_types::{ErrorCode, Network, TypesError};
use subnetctl_version::VersionError;
use thiserror::Error;

/// Result type for operations.
pub type OpsResult<T> = std::result::Result<T, OpsError>;

/// Errors that can occur during subnet operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OpsError {
    // =========================================================================
    // Lifecycle Errors
    // =========================================================================
    /// A subnet, VM registration or validator with this identity already exists.
    #[error("{0} already exists")]
    AlreadyExists(String),

    /// The subnet already has state on the network.
    #[error("subnet '{subnet}' is already deployed to {network}")]
    AlreadyDeployed { subnet: String, network: Network },

    /// The subnet was already converted to elastic on the network.
    #[error("subnet '{subnet}' is already elastic on {network}")]
    AlreadyElastic { subnet: String, network: Network },

    /// The subnet has no state on the network.
    #[error("subnet '{subnet}' is not deployed to {network}")]
    NotDeployed { subnet: String, network: Network },

    /// The subnet has not been converted to elastic on the network.
    #[error("subnet '{subnet}' is not elastic on {network}")]
    NotElastic { subnet: String, network: Network },

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    /// The signer is not one of the transaction's required authorizers.
    #[error("{0} is not a required authorizer of this transaction")]
    UnauthorizedSigner(Address),

    /// The signer already contributed a signature.
    #[error("{0} has already signed this transaction")]
    AlreadySigned(Address),

    /// Not enough signatures to commit.
    #[error("transaction has {have} of {need} required signatures")]
    InsufficientSignatures { have: usize, need: u32 },

    /// A collected signature does not verify against the transaction.
    #[error("signature from {0} does not verify")]
    InvalidSignature(Address),

    /// No local key can sign for the operation.
    #[error("no key available: {0}")]
    KeyUnavailable(String),

    // =========================================================================
    // External Errors
    // =========================================================================
    /// The node control plane reported a failure.
    #[error("node operation failed: {message}")]
    External {
        message: String,
        /// Output captured from the node, if any.
        diagnostics: Option<String>,
    },

    /// The descriptor publisher reported a failure.
    #[error("publisher error: {0}")]
    Publisher(String),

    // =========================================================================
    // Request Errors
    // =========================================================================
    /// The request is malformed or not valid in the current state.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// The operator declined a confirmation.
    #[error("operation cancelled")]
    Cancelled,

    /// A caller-supplied input file is missing or unreadable.
    #[error("cannot read {}: {source}", .path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // =========================================================================
    // Wrapped Errors
    // =========================================================================
    /// Storage error.
    #[error("{0}")]
    Store(#[from] StoreError),

    /// Version resolution error.
    #[error("{0}")]
    Version(#[from] VersionError),

    /// Type validation error.
    #[error("{0}")]
    Types(#[from] TypesError),

    /// I/O outside the store (node config files, plugin directory).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<NodeError> for OpsError {
    fn from(err: NodeError) -> Self {
        OpsError::External {
            diagnostics: err.diagnostics().map(str::to_string),
            message: err.to_string(),
        }
    }
}

impl OpsError {
    /// Create an invalid operation error.
    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        OpsError::InvalidOperation(msg.into())
    }

    /// Create a key unavailable error.
    pub fn key_unavailable(msg: impl Into<String>) -> Self {
        OpsError::KeyUnavailable(msg.into())
    }

    /// Create an input error for a caller-supplied file.
    pub fn input(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        OpsError::Input {
            path: path.into(),
            source,
        }
    }

    /// Whether the error reports an absent subnet, file or artifact.
    pub fn is_not_found(&self) -> bool {
        match self {
            OpsError::Store(e) => e.is_not_found(),
            OpsError::Input { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Captured collaborator output, if any.
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            OpsError::External { diagnostics, .. } => diagnostics.as_deref(),
            _ => None,
        }
    }

    /// Get the stable error code for this error.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            // Lifecycle errors
            Self::AlreadyExists(_) => ErrorCode::AlreadyExists,
            Self::AlreadyDeployed { .. } => ErrorCode::AlreadyDeployed,
            Self::AlreadyElastic { .. } => ErrorCode::AlreadyElastic,
            Self::NotDeployed { .. } => ErrorCode::NotDeployed,
            Self::NotElastic { .. } => ErrorCode::NotElastic,

            // Authorization errors
            Self::UnauthorizedSigner(_) => ErrorCode::UnauthorizedSigner,
            Self::AlreadySigned(_) => ErrorCode::AlreadySigned,
            Self::InsufficientSignatures { .. } => ErrorCode::InsufficientSignatures,
            Self::InvalidSignature(_) => ErrorCode::InvalidSignature,
            Self::KeyUnavailable(_) => ErrorCode::KeyUnavailable,

            // External errors
            Self::External { .. } | Self::Publisher(_) => ErrorCode::ExternalOperation,

            // Request errors
            Self::InvalidOperation(_) | Self::Types(_) => ErrorCode::InvalidOperation,
            Self::Cancelled => ErrorCode::Cancelled,
            Self::Input { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                ErrorCode::NotFound
            }
            Self::Input { .. } => ErrorCode::InvalidOperation,

            // Wrapped errors
            Self::Store(e) => match e {
                StoreError::SubnetNotFound(_)
                | StoreError::BundleFileNotFound { .. }
                | StoreError::ArtifactNotFound(_) => ErrorCode::NotFound,
                StoreError::KeyNotFound(_) => ErrorCode::KeyUnavailable,
                StoreError::AlreadyExists(_) => ErrorCode::AlreadyExists,
                StoreError::AlreadyDeployed { .. } => ErrorCode::AlreadyDeployed,
                StoreError::NotDeployed { .. } => ErrorCode::NotDeployed,
                StoreError::InvalidData(_) | StoreError::Crypto(_) => ErrorCode::InvalidOperation,
                StoreError::Io(_) | StoreError::Serialization(_) => ErrorCode::InternalError,
            },
            Self::Version(e) => match e {
                VersionError::Incompatible { .. } => ErrorCode::IncompatibleVersion,
                VersionError::ArtifactUnreadable { .. } => ErrorCode::ArtifactUnreadable,
                VersionError::InvalidTable(_) | VersionError::Io(_) => ErrorCode::InternalError,
            },
            Self::Io(_) => ErrorCode::InternalError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_keep_their_code() {
        let err: OpsError = StoreError::SubnetNotFound("missing".into()).into();
        assert_eq!(err.error_code(), ErrorCode::NotFound);
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "subnet 'missing' not found");

        let err: OpsError = StoreError::AlreadyDeployed {
            subnet: "sub1".into(),
            network: Network::Local,
        }
        .into();
        assert_eq!(err.error_code(), ErrorCode::AlreadyDeployed);
    }

    #[test]
    fn test_version_errors() {
        let err: OpsError = VersionError::incompatible("v0.0.1", "no mapping").into();
        assert_eq!(err.error_code(), ErrorCode::IncompatibleVersion);

        let err: OpsError = VersionError::unreadable("/vm", "no output").into();
        assert_eq!(err.error_code(), ErrorCode::ArtifactUnreadable);
    }

    #[test]
    fn test_node_error_keeps_diagnostics() {
        let err: OpsError = NodeError::Rpc {
            method: "platform.issueSignedTx".into(),
            code: -32000,
            message: "insufficient funds".into(),
            diagnostics: Some("fee payer balance 0".into()),
        }
        .into();
        assert_eq!(err.error_code(), ErrorCode::ExternalOperation);
        assert_eq!(err.diagnostics(), Some("fee payer balance 0"));
        assert!(err.to_string().contains("insufficient funds"));
    }

    #[test]
    fn test_missing_input_is_not_found() {
        let err = OpsError::input(
            "/tmp/genesis.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.is_not_found());
        assert_eq!(err.error_code(), ErrorCode::NotFound);
    }
}
