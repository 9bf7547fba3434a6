//! Operator confirmation.

use crate::error::OpsResult;

/// Asks the operator to approve a destructive step.
///
/// The CLI answers with an interactive prompt; tests answer from a script.
pub trait Confirmer: Send + Sync {
    /// Return `true` if the operator approves.
    fn confirm(&self, prompt: &str) -> OpsResult<bool>;
}

/// Approves everything. Used when the operator passed `--yes` up front.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirmer for AssumeYes {
    fn confirm(&self, prompt: &str) -> OpsResult<bool> {
        tracing::debug!(prompt, "Confirmation assumed");
        Ok(true)
    }
}
