//! Subnet configuration commands: create, configure, delete, import, describe, list.

use std::path::{Path, PathBuf};

use subnetctl_ops::{CreateRequest, ImportSource, VmSelection};
use subnetctl_types::VersionRequest;

use crate::context::SubnetContext;
use crate::error::CliResult;
use crate::output::{
    ConfigureOutput, DeleteOutput, DescribeOutput, ListOutput, OutputFormat, Render,
    SubnetCreatedOutput,
};

/// Execute the create command.
#[allow(clippy::too_many_arguments)]
pub async fn create(
    ctx: &SubnetContext,
    format: OutputFormat,
    name: &str,
    genesis: &Path,
    vm_version: VersionRequest,
    custom_vm: Option<PathBuf>,
    token_name: Option<String>,
    force: bool,
) -> CliResult<String> {
    let vm = match custom_vm {
        Some(binary) => VmSelection::Custom { binary },
        None => VmSelection::SubnetEvm(vm_version),
    };
    let mut request = CreateRequest::new(name, vm, genesis).with_force(force);
    if let Some(token_name) = token_name {
        request = request.with_token_name(token_name);
    }

    let sidecar = ctx.ops.create(request).await?;
    Ok(SubnetCreatedOutput {
        sidecar,
        imported_from: None,
    }
    .render(format))
}

/// Execute the configure command.
pub fn configure(
    ctx: &SubnetContext,
    format: OutputFormat,
    name: &str,
    chain_config: Option<&Path>,
    per_node_chain_config: Option<&Path>,
) -> CliResult<String> {
    let written = ctx.ops.configure(name, chain_config, per_node_chain_config)?;
    Ok(ConfigureOutput {
        subnet: name.to_string(),
        written,
    }
    .render(format))
}

/// Execute the delete command. Prompts first unless `force`.
pub fn delete(
    ctx: &SubnetContext,
    format: OutputFormat,
    name: &str,
    force: bool,
) -> CliResult<String> {
    ctx.ops.delete(name, force)?;
    Ok(DeleteOutput {
        subnet: name.to_string(),
    }
    .render(format))
}

/// Execute the import command.
pub async fn import(
    ctx: &SubnetContext,
    format: OutputFormat,
    source: &str,
    name: Option<&str>,
) -> CliResult<String> {
    let source: ImportSource = source.parse()?;
    let sidecar = ctx.ops.import_subnet(&source, name).await?;
    Ok(SubnetCreatedOutput {
        sidecar,
        imported_from: Some(source.to_string()),
    }
    .render(format))
}

/// Execute the describe command.
pub fn describe(ctx: &SubnetContext, format: OutputFormat, name: &str) -> CliResult<String> {
    let description = ctx.ops.describe(name)?;
    Ok(DescribeOutput { description }.render(format))
}

/// Execute the list command.
pub fn list(ctx: &SubnetContext, format: OutputFormat) -> CliResult<String> {
    let subnets = ctx.ops.list_subnets()?;
    Ok(ListOutput { subnets }.render(format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{mock_context, write_genesis};
    use crate::error::CliError;
    use subnetctl_ops::OpsError;
    use tempfile::TempDir;

    async fn create_sub1(ctx: &SubnetContext, temp_dir: &TempDir) -> CliResult<String> {
        create(
            ctx,
            OutputFormat::Json,
            "sub1",
            &write_genesis(temp_dir),
            VersionRequest::Latest,
            None,
            Some("TOK".to_string()),
            false,
        )
        .await
    }

    #[tokio::test]
    async fn test_create_describe_list() {
        let temp_dir = TempDir::new().unwrap();
        let (ctx, _) = mock_context(&temp_dir);

        let output = create_sub1(&ctx, &temp_dir).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["sidecar"]["name"], "sub1");
        assert_eq!(json["sidecar"]["vm"]["kind"], "subnet_evm");

        let described = describe(&ctx, OutputFormat::Json, "sub1").unwrap();
        let json: serde_json::Value = serde_json::from_str(&described).unwrap();
        assert_eq!(json["bundle_files"][0], "genesis.json");
        assert_eq!(json["sidecar"]["token_name"], "TOK");

        let listed = list(&ctx, OutputFormat::Human).unwrap();
        assert!(listed.contains("sub1"));
    }

    #[tokio::test]
    async fn test_create_twice_needs_force() {
        let temp_dir = TempDir::new().unwrap();
        let (ctx, _) = mock_context(&temp_dir);

        create_sub1(&ctx, &temp_dir).await.unwrap();
        let err = create_sub1(&ctx, &temp_dir).await.unwrap_err();
        assert!(matches!(err, CliError::Ops(OpsError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_delete_declined_keeps_subnet() {
        let temp_dir = TempDir::new().unwrap();
        let (ctx, _) = mock_context(&temp_dir);
        create_sub1(&ctx, &temp_dir).await.unwrap();

        let err = delete(&ctx, OutputFormat::Human, "sub1", false).unwrap_err();
        assert!(matches!(err, CliError::Ops(OpsError::Cancelled)));
        assert!(describe(&ctx, OutputFormat::Human, "sub1").is_ok());

        delete(&ctx, OutputFormat::Human, "sub1", true).unwrap();
        let err = describe(&ctx, OutputFormat::Human, "sub1").unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_configure_writes_overlay() {
        let temp_dir = TempDir::new().unwrap();
        let (ctx, _) = mock_context(&temp_dir);
        create_sub1(&ctx, &temp_dir).await.unwrap();

        let chain_config = temp_dir.path().join("chain.json");
        std::fs::write(&chain_config, br#"{"pruning-enabled":false}"#).unwrap();

        let output = configure(
            &ctx,
            OutputFormat::Json,
            "sub1",
            Some(chain_config.as_path()),
            None,
        )
        .unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["written"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_import_rejects_malformed_source() {
        let temp_dir = TempDir::new().unwrap();
        let (ctx, _) = mock_context(&temp_dir);

        let err = import(&ctx, OutputFormat::Human, "no-slash", None)
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Ops(OpsError::InvalidOperation(_))));
    }
}
