//! Validator commands and network queries.

use subnetctl_ops::{AddValidatorRequest, RemoveValidatorRequest};
use subnetctl_types::{NetworkSelection, NodeId};

use crate::cli::AuthArgs;
use crate::context::SubnetContext;
use crate::error::CliResult;
use crate::output::{OutputFormat, Render, StatsOutput, TxOutput, ValidatorsOutput};
use crate::progress::with_spinner;

/// Execute the add-validator command.
#[allow(clippy::too_many_arguments)]
pub async fn add_validator(
    ctx: &SubnetContext,
    format: OutputFormat,
    name: &str,
    selection: NetworkSelection,
    node_id: NodeId,
    weight: Option<u64>,
    start_time: Option<u64>,
    duration_secs: u64,
    auth: AuthArgs,
) -> CliResult<String> {
    let mut request = AddValidatorRequest::new(node_id, duration_secs);
    request.weight = weight;
    request.start_time = start_time;
    request.subnet_auth_keys = auth.subnet_auth_keys;
    request.output_tx_path = auth.output_tx_path;

    let outcome = with_spinner(
        "Adding validator...",
        format,
        ctx.ops.add_validator(name, selection, request),
    )
    .await?;

    Ok(TxOutput {
        operation: "add-validator",
        subnet: name.to_string(),
        network: selection.target,
        outcome,
    }
    .render(format))
}

/// Execute the remove-validator command.
pub async fn remove_validator(
    ctx: &SubnetContext,
    format: OutputFormat,
    name: &str,
    selection: NetworkSelection,
    node_id: NodeId,
    auth: AuthArgs,
) -> CliResult<String> {
    let mut request = RemoveValidatorRequest::new(node_id);
    request.subnet_auth_keys = auth.subnet_auth_keys;
    request.output_tx_path = auth.output_tx_path;

    let outcome = with_spinner(
        "Removing validator...",
        format,
        ctx.ops.remove_validator(name, selection, request),
    )
    .await?;

    Ok(TxOutput {
        operation: "remove-validator",
        subnet: name.to_string(),
        network: selection.target,
        outcome,
    }
    .render(format))
}

/// Execute the validators command.
pub async fn validators(
    ctx: &SubnetContext,
    format: OutputFormat,
    name: &str,
    selection: NetworkSelection,
) -> CliResult<String> {
    let validators = ctx.ops.list_validators(name, selection).await?;
    Ok(ValidatorsOutput {
        subnet: name.to_string(),
        network: selection.target,
        validators,
    }
    .render(format))
}

/// Execute the stats command.
pub async fn stats(
    ctx: &SubnetContext,
    format: OutputFormat,
    name: &str,
    selection: NetworkSelection,
) -> CliResult<String> {
    let stats = ctx.ops.stats(name, selection).await?;
    Ok(StatsOutput {
        subnet: name.to_string(),
        network: selection.target,
        stats,
    }
    .render(format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::deploy::{deploy, DeployArgs};
    use crate::commands::subnet::create;
    use crate::commands::test_support::{mock_context, write_genesis};
    use crate::error::CliError;
    use subnetctl_ops::OpsError;
    use subnetctl_types::{Network, VersionRequest};
    use tempfile::TempDir;

    const DAY: u64 = 24 * 60 * 60;

    async fn deployed(temp_dir: &TempDir) -> SubnetContext {
        let (ctx, _) = mock_context(temp_dir);
        create(
            &ctx,
            OutputFormat::Human,
            "sub1",
            &write_genesis(temp_dir),
            VersionRequest::Latest,
            None,
            None,
            false,
        )
        .await
        .unwrap();
        deploy(
            &ctx,
            OutputFormat::Human,
            "sub1",
            NetworkSelection::new(Network::Local),
            DeployArgs::default(),
        )
        .await
        .unwrap();
        ctx
    }

    fn node(n: u32) -> NodeId {
        NodeId::parse(&format!("NodeID-Cli{}", n)).unwrap()
    }

    #[tokio::test]
    async fn test_validator_lifecycle_on_local() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = deployed(&temp_dir).await;
        let local = NetworkSelection::new(Network::Local);

        let output = add_validator(
            &ctx,
            OutputFormat::Json,
            "sub1",
            local,
            node(1),
            None,
            None,
            2 * DAY,
            AuthArgs::default(),
        )
        .await
        .unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["outcome"]["status"], "committed");

        let listed = validators(&ctx, OutputFormat::Human, "sub1", local)
            .await
            .unwrap();
        assert!(listed.contains("NodeID-Cli1"));

        let output = stats(&ctx, OutputFormat::Json, "sub1", local).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["validator_count"], 1);

        remove_validator(&ctx, OutputFormat::Human, "sub1", local, node(1), AuthArgs::default())
            .await
            .unwrap();
        let output = stats(&ctx, OutputFormat::Json, "sub1", local).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["validator_count"], 0);
    }

    #[tokio::test]
    async fn test_validators_before_deploy() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = deployed(&temp_dir).await;

        let err = validators(
            &ctx,
            OutputFormat::Human,
            "sub1",
            NetworkSelection::new(Network::Mainnet),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CliError::Ops(OpsError::NotDeployed { .. })));
        assert_eq!(err.exit_code(), 4);
    }
}
