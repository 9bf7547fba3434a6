//! Join command.

use std::path::PathBuf;

use subnetctl_ops::{JoinRequest, StakeRequest};
use subnetctl_types::{NetworkSelection, NodeId};

use crate::cli::StakeArgs;
use crate::context::SubnetContext;
use crate::error::{CliError, CliResult};
use crate::output::{JoinOutput, OutputFormat, Render};
use crate::progress::with_spinner;

/// Arguments of the join command.
#[derive(Debug, Clone)]
pub struct JoinArgs {
    pub node_config: Option<PathBuf>,
    pub plugin_dir: Option<PathBuf>,
    pub force_write: bool,
    pub elastic: bool,
    pub node_id: Option<NodeId>,
    pub stake: StakeArgs,
    pub key: Option<String>,
}

impl JoinArgs {
    fn stake_request(&self, staker_key: Option<String>) -> CliResult<Option<StakeRequest>> {
        if !self.elastic {
            return Ok(None);
        }
        let missing = |flag: &str| CliError::user(format!("--elastic needs {}", flag));
        let node_id = self.node_id.clone().ok_or_else(|| missing("--node-id"))?;
        let amount = self.stake.stake_amount.ok_or_else(|| missing("--stake-amount"))?;
        let duration = self
            .stake
            .stake_duration
            .ok_or_else(|| missing("--stake-duration"))?;

        let mut request = StakeRequest::new(node_id, amount, duration);
        request.start_time = self.stake.start_time;
        request.staker_key = staker_key;
        Ok(Some(request))
    }
}

/// Execute the join command.
pub async fn join(
    ctx: &SubnetContext,
    format: OutputFormat,
    name: &str,
    selection: NetworkSelection,
    args: JoinArgs,
) -> CliResult<String> {
    let stake = args.stake_request(ctx.fee_key(args.key.clone()))?;
    let request = JoinRequest {
        node_config_path: args.node_config,
        plugin_dir: args.plugin_dir,
        force_write: args.force_write,
        stake,
    };

    let outcome = with_spinner(
        "Joining subnet...",
        format,
        ctx.ops.join(name, selection, request),
    )
    .await?;

    Ok(JoinOutput {
        subnet: name.to_string(),
        network: selection.target,
        outcome,
    }
    .render(format))
}
