//! Error types for version resolution.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for version operations.
pub type VersionResult<T> = std::result::Result<T, VersionError>;

/// Errors that can occur while resolving versions or inspecting VM binaries.
#[derive(Debug, Error)]
pub enum VersionError {
    /// No safe VM/runtime pairing exists.
    #[error("incompatible version {requested}: {reason}")]
    Incompatible { requested: String, reason: String },

    /// The VM binary could not be inspected.
    #[error("cannot read protocol version from {}: {reason}", .path.display())]
    ArtifactUnreadable { path: PathBuf, reason: String },

    /// The compatibility table is malformed.
    #[error("invalid compatibility table: {0}")]
    InvalidTable(String),

    /// I/O error while reading a compatibility table.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl VersionError {
    pub fn incompatible(requested: impl ToString, reason: impl Into<String>) -> Self {
        VersionError::Incompatible {
            requested: requested.to_string(),
            reason: reason.into(),
        }
    }

    pub fn unreadable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        VersionError::ArtifactUnreadable {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VersionError::incompatible("v9.9.9", "no mapping in compatibility table");
        assert_eq!(
            err.to_string(),
            "incompatible version v9.9.9: no mapping in compatibility table"
        );

        let err = VersionError::unreadable("/vms/x", "exit status 1");
        assert!(err.to_string().contains("/vms/x"));
    }
}
