//! Shell completions command.

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::{Cli, CompletionShell};
use crate::error::{CliError, CliResult};

/// Generate the completion script for a shell.
pub fn completions(shell: CompletionShell) -> CliResult<String> {
    let mut cmd = Cli::command();
    let shell = match shell {
        CompletionShell::Bash => Shell::Bash,
        CompletionShell::Zsh => Shell::Zsh,
        CompletionShell::Fish => Shell::Fish,
        CompletionShell::PowerShell => Shell::PowerShell,
    };

    let mut script = Vec::new();
    generate(shell, &mut cmd, "subnetctl", &mut script);
    String::from_utf8(script)
        .map_err(|e| CliError::user(format!("completion script is not UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_bash() {
        let script = completions(CompletionShell::Bash).unwrap();
        assert!(script.contains("subnetctl"));
        assert!(script.contains("add-validator"));
    }

    #[test]
    fn test_completions_other_shells() {
        for shell in [
            CompletionShell::Zsh,
            CompletionShell::Fish,
            CompletionShell::PowerShell,
        ] {
            assert!(!completions(shell).unwrap().is_empty());
        }
    }
}
