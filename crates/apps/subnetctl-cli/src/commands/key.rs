//! Key management commands.

use std::path::Path;

use crate::context::SubnetContext;
use crate::error::{CliError, CliResult};
use crate::output::{KeyDeleteOutput, KeyImportOutput, KeyListOutput, OutputFormat, Render};
use crate::prompt;

/// Execute the key import command.
pub fn key_import(
    ctx: &SubnetContext,
    format: OutputFormat,
    name: &str,
    file: &Path,
    force: bool,
) -> CliResult<String> {
    if !file.is_file() {
        return Err(CliError::FileNotFound(file.display().to_string()));
    }
    let key = ctx.ops.state.keys.import(name, file, force)?;
    Ok(KeyImportOutput { key }.render(format))
}

/// Execute the key list command.
pub fn key_list(ctx: &SubnetContext, format: OutputFormat) -> CliResult<String> {
    let keys = ctx.ops.state.keys.list()?;
    Ok(KeyListOutput { keys }.render(format))
}

/// Execute the key delete command. Prompts first unless `force`.
pub fn key_delete(
    ctx: &SubnetContext,
    format: OutputFormat,
    name: &str,
    force: bool,
) -> CliResult<String> {
    if !ctx.ops.state.keys.exists(name) {
        return Err(subnetctl_store::StoreError::KeyNotFound(name.to_string()).into());
    }

    if !force {
        if !prompt::is_interactive() {
            return Err(CliError::user(
                "Refusing to delete a key without confirmation. Pass --force.",
            ));
        }
        if !prompt::confirm(&format!("Delete key '{}'? This cannot be undone.", name))? {
            return Err(CliError::user("Cancelled."));
        }
    }

    ctx.ops.state.keys.delete(name)?;
    Ok(KeyDeleteOutput {
        name: name.to_string(),
    }
    .render(format))
}
