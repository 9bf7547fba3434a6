//! Error codes and type-level validation errors.
//!
//! [`ErrorCode`] is the stable, user-facing classification every operation
//! error maps onto. The CLI prints it next to the message and derives its exit
//! code from it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable error codes surfaced to operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
#[non_exhaustive]
pub enum ErrorCode {
    // =========================================================================
    // Lifecycle Errors (0x0001 - 0x00FF)
    // =========================================================================
    /// Referenced subnet or artifact is absent
    NotFound = 0x0001,
    /// A subnet with this name (or VM registration) already exists
    AlreadyExists = 0x0002,
    /// The subnet is already deployed to the network
    AlreadyDeployed = 0x0003,
    /// The subnet has already been converted to elastic
    AlreadyElastic = 0x0004,
    /// The subnet has not been deployed to the network
    NotDeployed = 0x0005,
    /// The subnet has not been converted to elastic
    NotElastic = 0x0006,

    // =========================================================================
    // Version Errors (0x0100 - 0x01FF)
    // =========================================================================
    /// No safe VM/runtime pairing exists
    IncompatibleVersion = 0x0100,
    /// VM binary could not be inspected
    ArtifactUnreadable = 0x0101,

    // =========================================================================
    // Authorization Errors (0x0200 - 0x02FF)
    // =========================================================================
    /// Signer is not a required authorizer
    UnauthorizedSigner = 0x0200,
    /// Signer has already contributed a signature
    AlreadySigned = 0x0201,
    /// Not enough signatures to commit
    InsufficientSignatures = 0x0202,
    /// A stored signature does not verify
    InvalidSignature = 0x0203,
    /// No local key is available for a required address
    KeyUnavailable = 0x0204,

    // =========================================================================
    // External Errors (0x0300 - 0x03FF)
    // =========================================================================
    /// Node control plane or publisher reported a failure
    ExternalOperation = 0x0300,

    // =========================================================================
    // Request Errors (0x0400 - 0x04FF)
    // =========================================================================
    /// The request is malformed or not valid in the current state
    InvalidOperation = 0x0400,
    /// The operator declined a confirmation
    Cancelled = 0x0401,

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Storage or serialization failure
    InternalError = 0xFFFF,
}

impl ErrorCode {
    /// Get the numeric code value
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Returns true for guard violations the operator can resolve by changing the request.
    pub fn is_precondition(&self) -> bool {
        (0x0001..=0x00FF).contains(&self.code())
    }

    /// Get a user-friendly suggestion for recovering from this error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::NotFound => Some("Check the name or path. Use 'subnetctl describe' to list subnets."),
            Self::AlreadyExists => Some("Pick another name or pass --force to overwrite."),
            Self::AlreadyDeployed => Some("The subnet is already live on this network. Use 'subnetctl describe' to see its ids."),
            Self::AlreadyElastic => Some("The subnet is already elastic. Use 'subnetctl join --elastic' to stake."),
            Self::NotDeployed => Some("Deploy the subnet to this network first with 'subnetctl deploy'."),
            Self::NotElastic => Some("Convert the subnet first with 'subnetctl transform'."),
            Self::IncompatibleVersion => Some("Pick a VM version listed in the compatibility table or pass a matching --runtime-version."),
            Self::ArtifactUnreadable => Some("Check the VM binary exists, is executable, and supports --version."),
            Self::UnauthorizedSigner => Some("Sign with one of the addresses listed as required authorizers."),
            Self::AlreadySigned => Some("This key already signed. Pass the file to another authorizer."),
            Self::InsufficientSignatures => Some("Collect more signatures with 'subnetctl transaction sign' before committing."),
            Self::InvalidSignature => Some("The transaction file was modified after signing. Re-create it."),
            Self::KeyUnavailable => Some("Import the key with 'subnetctl key import'."),
            Self::ExternalOperation => Some("Inspect the node output above, then re-run the command."),
            Self::InvalidOperation => Some("Check the command arguments."),
            Self::Cancelled => None,
            Self::InternalError => Some("Check file permissions in the data directory."),
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::AlreadyExists => "ALREADY_EXISTS",
            ErrorCode::AlreadyDeployed => "ALREADY_DEPLOYED",
            ErrorCode::AlreadyElastic => "ALREADY_ELASTIC",
            ErrorCode::NotDeployed => "NOT_DEPLOYED",
            ErrorCode::NotElastic => "NOT_ELASTIC",
            ErrorCode::IncompatibleVersion => "INCOMPATIBLE_VERSION",
            ErrorCode::ArtifactUnreadable => "ARTIFACT_UNREADABLE",
            ErrorCode::UnauthorizedSigner => "UNAUTHORIZED_SIGNER",
            ErrorCode::AlreadySigned => "ALREADY_SIGNED",
            ErrorCode::InsufficientSignatures => "INSUFFICIENT_SIGNATURES",
            ErrorCode::InvalidSignature => "INVALID_SIGNATURE",
            ErrorCode::KeyUnavailable => "KEY_UNAVAILABLE",
            ErrorCode::ExternalOperation => "EXTERNAL_OPERATION",
            ErrorCode::InvalidOperation => "INVALID_OPERATION",
            ErrorCode::Cancelled => "CANCELLED",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        f.write_str(s)
    }
}

/// Validation failures raised while building or parsing types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid version string: {0}")]
    InvalidVersion(String),

    #[error("invalid subnet name '{0}': use 1-64 ASCII letters and digits")]
    InvalidSubnetName(String),

    #[error("invalid node id '{0}': expected NodeID-<id>")]
    InvalidNodeId(String),

    #[error("invalid elastic config: {0}")]
    InvalidElasticConfig(String),

    #[error("failed to encode signing payload: {0}")]
    Encoding(String),
}

/// Result type alias for type-level validation.
pub type Result<T> = std::result::Result<T, TypesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_range() {
        assert!(ErrorCode::AlreadyDeployed.is_precondition());
        assert!(!ErrorCode::ExternalOperation.is_precondition());
        assert!(!ErrorCode::InternalError.is_precondition());
    }

    #[test]
    fn test_display_codes() {
        assert_eq!(ErrorCode::AlreadyElastic.to_string(), "ALREADY_ELASTIC");
        assert_eq!(ErrorCode::InsufficientSignatures.code(), 0x0202);
    }
}
