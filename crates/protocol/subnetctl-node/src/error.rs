//! Error types for the node control plane.

use thiserror::Error;

/// Result type alias for control-plane operations.
pub type NodeResult<T> = Result<T, NodeError>;

/// Errors reported by, or while talking to, the node control plane.
///
/// Every variant carries whatever the node said so the operator can act on
/// it. Nothing here is retried automatically.
#[derive(Debug, Error)]
pub enum NodeError {
    /// The node answered with a JSON-RPC error.
    #[error("node rejected {method} (code {code}): {message}")]
    Rpc {
        method: String,
        code: i64,
        message: String,
        diagnostics: Option<String>,
    },

    /// The request never got a well-formed answer.
    #[error("transport error calling {method}: {message}")]
    Transport { method: String, message: String },

    /// HTTP status other than success.
    #[error("{method} failed with HTTP status {status}")]
    Http {
        method: String,
        status: u16,
        diagnostics: String,
    },

    /// The answer did not have the expected shape.
    #[error("invalid response to {method}: {message}")]
    InvalidResponse { method: String, message: String },

    /// The node is reachable but not ready.
    #[error("node not ready: {0}")]
    NotReady(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl NodeError {
    /// Captured output from the node, when it sent any beyond the message.
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            NodeError::Rpc { diagnostics, .. } => diagnostics.as_deref(),
            NodeError::Http { diagnostics, .. } => Some(diagnostics.as_str()),
            _ => None,
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        NodeError::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_exposed() {
        let err = NodeError::Rpc {
            method: "platform.issueSignedTx".into(),
            code: -32000,
            message: "insufficient funds".into(),
            diagnostics: Some("fee payer balance 0".into()),
        };
        assert_eq!(err.diagnostics(), Some("fee payer balance 0"));
        assert!(err.to_string().contains("insufficient funds"));

        assert!(NodeError::NotReady("bootstrapping".into()).diagnostics().is_none());
    }
}
