//! Deploy command and registration of existing deployments.

use std::path::PathBuf;

use subnetctl_crypto::Address;
use subnetctl_ops::DeployRequest;
use subnetctl_store::Signer;
use subnetctl_types::{ChainId, NetworkSelection, NetworkState, SemVer, SubnetId};
use tracing::debug;

use crate::context::SubnetContext;
use crate::error::{CliError, CliResult};
use crate::output::{DeployOutput, OutputFormat, RegisterOutput, Render};
use crate::progress::with_spinner;

/// Arguments of the deploy command.
#[derive(Debug, Clone, Default)]
pub struct DeployArgs {
    pub control_keys: Vec<Address>,
    pub threshold: Option<u32>,
    pub subnet_auth_keys: Vec<Address>,
    pub runtime_version: Option<SemVer>,
    pub mainnet_chain_id: Option<u64>,
    pub key: Option<String>,
    pub output_tx_path: Option<PathBuf>,
}

/// Execute the deploy command.
///
/// On public networks with no control keys given, the fee key's address
/// becomes the only control key.
pub async fn deploy(
    ctx: &SubnetContext,
    format: OutputFormat,
    name: &str,
    selection: NetworkSelection,
    args: DeployArgs,
) -> CliResult<String> {
    let network = selection.target;
    let fee_key = ctx.fee_key(args.key);

    let mut control_keys = args.control_keys;
    if network.is_public() && control_keys.is_empty() {
        let key = fee_key.as_deref().ok_or_else(|| {
            CliError::user(format!(
                "deploying to {} needs --control-keys or a fee key (--key or keys.default_key)",
                network
            ))
        })?;
        let address = ctx.ops.state.keys.load(key)?.address();
        debug!(key, %address, "Using fee key as the control key");
        control_keys.push(address);
    }
    let threshold = args.threshold.unwrap_or(1);

    let request = DeployRequest {
        control_keys,
        threshold,
        subnet_auth_keys: args.subnet_auth_keys,
        runtime_version: args.runtime_version,
        mainnet_chain_id: args.mainnet_chain_id,
        fee_key,
        output_tx_path: args.output_tx_path,
    };

    let message = format!("Deploying {} to {}...", name, network);
    let outcome = with_spinner(&message, format, ctx.ops.deploy(name, selection, request)).await?;

    Ok(DeployOutput {
        subnet: name.to_string(),
        network,
        outcome,
    }
    .render(format))
}

/// Execute the register command.
#[allow(clippy::too_many_arguments)]
pub fn register(
    ctx: &SubnetContext,
    format: OutputFormat,
    name: &str,
    selection: NetworkSelection,
    subnet_id: &str,
    chain_id: Option<&str>,
    control_keys: Vec<Address>,
    threshold: u32,
    force: bool,
) -> CliResult<String> {
    if subnet_id.trim().is_empty() {
        return Err(CliError::user("--subnet-id must not be empty"));
    }
    let network = selection.target;
    let mut state = NetworkState::new(SubnetId::new(subnet_id.trim()), control_keys, threshold);
    if let Some(chain_id) = chain_id {
        state = state.with_chain_id(ChainId::new(chain_id.trim()));
    }

    let sidecar = ctx.ops.register_deployment(name, network, state, force)?;
    let state = sidecar
        .network(network)
        .cloned()
        .ok_or_else(|| CliError::user(format!("no {} entry recorded for '{}'", network, name)))?;

    Ok(RegisterOutput {
        subnet: name.to_string(),
        network,
        state,
    }
    .render(format))
}
