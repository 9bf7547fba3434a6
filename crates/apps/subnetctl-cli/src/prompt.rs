//! Terminal confirmations.

use dialoguer::{theme::ColorfulTheme, Confirm};
use std::io::{self, IsTerminal};

use subnetctl_ops::{Confirmer, OpsError, OpsResult};

/// Whether stdin is a terminal someone can answer from.
pub fn is_interactive() -> bool {
    std::io::stdin().is_terminal()
}

/// Ask a yes/no question. Defaults to no.
pub fn confirm(prompt: &str) -> io::Result<bool> {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| io::Error::other(e.to_string()))
}

/// Answers operation confirmations on the terminal.
///
/// Without a terminal there is nobody to ask, so the operation is refused
/// and the operator is pointed at `--force`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalConfirmer;

impl Confirmer for TerminalConfirmer {
    fn confirm(&self, prompt: &str) -> OpsResult<bool> {
        if !is_interactive() {
            return Err(OpsError::invalid_operation(format!(
                "{} (not a terminal; pass --force to skip confirmation)",
                prompt
            )));
        }
        Ok(confirm(prompt)?)
    }
}
