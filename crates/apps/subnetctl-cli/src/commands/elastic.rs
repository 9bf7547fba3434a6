//! Elastic conversion and delegation commands.

use std::path::PathBuf;

use subnetctl_ops::{StakeRequest, TransformRequest};
use subnetctl_types::{ElasticConfig, NetworkSelection, NodeId};

use crate::cli::AuthArgs;
use crate::context::SubnetContext;
use crate::error::{CliError, CliResult};
use crate::output::{OutputFormat, Render, TxOutput};
use crate::progress::with_spinner;

/// Arguments of the transform command.
#[derive(Debug, Clone, Default)]
pub struct TransformArgs {
    pub token_name: Option<String>,
    pub token_symbol: Option<String>,
    pub denomination: u8,
    pub elastic_config: Option<PathBuf>,
    pub transform_validators: Option<u64>,
    pub key: Option<String>,
    pub auth: AuthArgs,
}

impl TransformArgs {
    /// Parameters from a JSON file, or the defaults for the named token.
    fn elastic_config(&self) -> CliResult<ElasticConfig> {
        if let Some(path) = &self.elastic_config {
            let contents = std::fs::read_to_string(path)
                .map_err(|_| CliError::FileNotFound(path.display().to_string()))?;
            return Ok(serde_json::from_str(&contents)?);
        }
        match (&self.token_name, &self.token_symbol) {
            (Some(name), Some(symbol)) => Ok(ElasticConfig::with_defaults(
                name.as_str(),
                symbol.as_str(),
                self.denomination,
            )),
            _ => Err(CliError::user(
                "give --token-name and --token-symbol, or --elastic-config",
            )),
        }
    }
}

/// Execute the transform command.
pub async fn transform(
    ctx: &SubnetContext,
    format: OutputFormat,
    name: &str,
    selection: NetworkSelection,
    args: TransformArgs,
) -> CliResult<String> {
    let mut request = TransformRequest::new(args.elastic_config()?);
    request.transform_validators = args.transform_validators;
    request.fee_key = ctx.fee_key(args.key);
    request.subnet_auth_keys = args.auth.subnet_auth_keys;
    request.output_tx_path = args.auth.output_tx_path;

    let outcome = with_spinner(
        "Converting subnet to elastic...",
        format,
        ctx.ops.transform_elastic(name, selection, request),
    )
    .await?;

    Ok(TxOutput {
        operation: "transform",
        subnet: name.to_string(),
        network: selection.target,
        outcome,
    }
    .render(format))
}

/// Execute the delegate command.
#[allow(clippy::too_many_arguments)]
pub async fn delegate(
    ctx: &SubnetContext,
    format: OutputFormat,
    name: &str,
    selection: NetworkSelection,
    node_id: NodeId,
    stake_amount: u64,
    duration_secs: u64,
    start_time: Option<u64>,
    key: Option<String>,
) -> CliResult<String> {
    let mut request = StakeRequest::new(node_id, stake_amount, duration_secs);
    request.start_time = start_time;
    request.staker_key = ctx.fee_key(key);

    let outcome = with_spinner(
        "Delegating stake...",
        format,
        ctx.ops.add_permissionless_delegator(name, selection, request),
    )
    .await?;

    Ok(TxOutput {
        operation: "delegate",
        subnet: name.to_string(),
        network: selection.target,
        outcome,
    }
    .render(format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::deploy::{deploy, DeployArgs};
    use crate::commands::subnet::create;
    use crate::commands::test_support::{mock_context, write_genesis};
    use subnetctl_ops::OpsError;
    use subnetctl_types::{Network, TxKind, VersionRequest};
    use tempfile::TempDir;

    fn token_args() -> TransformArgs {
        TransformArgs {
            token_name: Some("Stake Token".to_string()),
            token_symbol: Some("STK".to_string()),
            denomination: 9,
            ..TransformArgs::default()
        }
    }

    #[test]
    fn test_config_requires_token_or_file() {
        let err = TransformArgs::default().elastic_config().unwrap_err();
        assert!(matches!(err, CliError::User(_)));

        let config = token_args().elastic_config().unwrap();
        assert_eq!(config.token_symbol, "STK");
        config.validate().unwrap();
    }

    #[test]
    fn test_config_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("elastic.json");
        let mut config = ElasticConfig::with_defaults("File Token", "FTK", 6);
        config.min_delegator_stake = 50;
        std::fs::write(&path, serde_json::to_vec(&config).unwrap()).unwrap();

        let args = TransformArgs {
            elastic_config: Some(path),
            ..TransformArgs::default()
        };
        let loaded = args.elastic_config().unwrap();
        assert_eq!(loaded.min_delegator_stake, 50);
        assert_eq!(loaded.token_name, "File Token");
    }

    #[tokio::test]
    async fn test_transform_on_local_then_again() {
        let temp_dir = TempDir::new().unwrap();
        let (ctx, control_plane) = mock_context(&temp_dir);
        let local = NetworkSelection::new(Network::Local);
        create(
            &ctx,
            OutputFormat::Human,
            "sub1",
            &write_genesis(&temp_dir),
            VersionRequest::Latest,
            None,
            None,
            false,
        )
        .await
        .unwrap();

        let err = transform(&ctx, OutputFormat::Human, "sub1", local, token_args())
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Ops(OpsError::NotDeployed { .. })));

        deploy(&ctx, OutputFormat::Human, "sub1", local, DeployArgs::default())
            .await
            .unwrap();
        transform(&ctx, OutputFormat::Human, "sub1", local, token_args())
            .await
            .unwrap();
        assert!(control_plane
            .submitted_kinds()
            .contains(&TxKind::TransformElastic));

        let err = transform(&ctx, OutputFormat::Human, "sub1", local, token_args())
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Ops(OpsError::AlreadyElastic { .. })));
    }
}
