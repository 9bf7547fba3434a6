//! CLI error types.

use subnetctl_types::ErrorCode;
use thiserror::Error;

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;

/// CLI error enum wrapping all crate errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operations error.
    #[error("{0}")]
    Ops(#[from] subnetctl_ops::OpsError),

    /// Store error.
    #[error("{0}")]
    Store(#[from] subnetctl_store::StoreError),

    /// Version table error.
    #[error("{0}")]
    Version(#[from] subnetctl_version::VersionError),

    /// Node client construction error.
    #[error("{0}")]
    Node(#[from] subnetctl_node::NodeError),

    /// Invalid identifier or value on the command line.
    #[error("{0}")]
    Types(#[from] subnetctl_types::TypesError),

    /// IO error.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// User-facing error with actionable message.
    #[error("{0}")]
    User(String),

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(String),
}

impl CliError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a user-facing error.
    pub fn user(msg: impl Into<String>) -> Self {
        Self::User(msg.into())
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors: 1
            Self::User(_) | Self::Types(_) => 1,
            // Not found: 2
            Self::FileNotFound(_) => 2,
            Self::Ops(e) if e.is_not_found() => 2,
            Self::Store(e) if e.is_not_found() => 2,
            // Config errors: 3
            Self::Config(_) | Self::Toml(_) | Self::Version(_) => 3,
            // Precondition failures: 4
            Self::Ops(e) if e.error_code().is_precondition() => 4,
            // Node errors: 5
            Self::Node(_) => 5,
            Self::Ops(e) if e.error_code() == ErrorCode::ExternalOperation => 5,
            // Store errors: 6
            Self::Store(_) => 6,
            // Other operation errors: 8
            Self::Ops(_) => 8,
            // IO errors: 9
            Self::Io(_) => 9,
            // JSON errors: 10
            Self::Json(_) => 10,
        }
    }

    /// Get the stable error code for this error.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Ops(e) => e.error_code(),
            Self::Store(e) if e.is_not_found() => ErrorCode::NotFound,
            Self::FileNotFound(_) => ErrorCode::NotFound,
            Self::Version(subnetctl_version::VersionError::ArtifactUnreadable { .. }) => {
                ErrorCode::ArtifactUnreadable
            }
            Self::Version(_) => ErrorCode::IncompatibleVersion,
            Self::Node(_) => ErrorCode::ExternalOperation,
            Self::User(_) | Self::Types(_) => ErrorCode::InvalidOperation,
            Self::Config(_)
            | Self::Toml(_)
            | Self::Store(_)
            | Self::Io(_)
            | Self::Json(_) => ErrorCode::InternalError,
        }
    }

    /// Diagnostic output captured from the node, if any.
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            Self::Ops(e) => e.diagnostics(),
            Self::Node(e) => e.diagnostics(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use subnetctl_ops::OpsError;
    use subnetctl_store::StoreError;
    use subnetctl_types::Network;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::user("bad").exit_code(), 1);
        assert_eq!(CliError::config("bad").exit_code(), 3);
        assert_eq!(
            CliError::from(StoreError::SubnetNotFound("sub1".into())).exit_code(),
            2
        );
        assert_eq!(
            CliError::from(OpsError::from(StoreError::SubnetNotFound("sub1".into()))).exit_code(),
            2
        );
    }

    #[test]
    fn test_precondition_errors_exit_with_four() {
        let err = CliError::from(OpsError::NotDeployed {
            subnet: "sub1".into(),
            network: Network::Testnet,
        });
        assert_eq!(err.exit_code(), 4);
        assert_eq!(err.error_code(), ErrorCode::NotDeployed);
    }

    #[test]
    fn test_external_failure_keeps_diagnostics() {
        let err = CliError::from(OpsError::External {
            message: "rejected".into(),
            diagnostics: Some("node log".into()),
        });
        assert_eq!(err.exit_code(), 5);
        assert_eq!(err.diagnostics(), Some("node log"));
    }
}
