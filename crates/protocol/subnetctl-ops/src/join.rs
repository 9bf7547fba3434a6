//! Preparing a node to validate a subnet.
//!
//! 1. Add the subnet id to the node config's `track-subnets` list
//! 2. Install the VM binary in the node's plugin directory, named by VM id
//! 3. On elastic subnets, optionally stake the node in

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use subnetctl_store::atomic::copy_atomic;
use subnetctl_store::{write_json_atomic, ConfigBundleStore};
use subnetctl_types::{NetworkSelection, SubnetId, Vm};
use tracing::{debug, info};

use crate::deploy::chain_vm_id;
use crate::elastic::StakeRequest;
use crate::error::{OpsError, OpsResult};
use crate::subnet_ops::{deployed_state, SubnetOperations, TxOutcome};

/// Node config key listing the subnets a node syncs.
pub const TRACK_SUBNETS_KEY: &str = "track-subnets";

/// Parameters of `join`.
#[derive(Debug, Clone, Default)]
pub struct JoinRequest {
    /// Node config file to update. Created if missing.
    pub node_config_path: Option<PathBuf>,
    /// Node plugin directory to install the VM binary into.
    pub plugin_dir: Option<PathBuf>,
    /// Track only this subnet, dropping any others already listed.
    pub force_write: bool,
    /// Stake the node in (elastic subnets only).
    pub stake: Option<StakeRequest>,
}

/// What `join` changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinOutcome {
    pub subnet_id: SubnetId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_config: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stake: Option<TxOutcome>,
}

/// Add `subnet_id` to a node config's comma-separated `track-subnets` entry.
///
/// With `force_write` the entry is replaced by `subnet_id` alone.
pub fn merge_tracked_subnets(
    config: &mut Map<String, Value>,
    subnet_id: &SubnetId,
    force_write: bool,
) -> OpsResult<()> {
    let mut tracked: Vec<String> = match config.get(TRACK_SUBNETS_KEY) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(list)) => list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        Some(other) => {
            return Err(OpsError::invalid_operation(format!(
                "{} must be a comma-separated string, found {}",
                TRACK_SUBNETS_KEY, other
            )))
        }
    };

    if force_write {
        tracked.clear();
    }
    if !tracked.iter().any(|s| s == subnet_id.as_str()) {
        tracked.push(subnet_id.to_string());
    }
    config.insert(TRACK_SUBNETS_KEY.to_string(), Value::String(tracked.join(",")));
    Ok(())
}

fn read_node_config(path: &Path) -> OpsResult<Map<String, Value>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
        Err(e) => return Err(OpsError::input(path, e)),
    };
    match serde_json::from_slice(&bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(OpsError::invalid_operation(format!(
            "{} is not a JSON object",
            path.display()
        ))),
        Err(e) => Err(OpsError::invalid_operation(format!(
            "{} is not valid JSON: {}",
            path.display(),
            e
        ))),
    }
}

impl SubnetOperations {
    /// Configure a node to validate a deployed subnet.
    pub async fn join(
        &self,
        name: &str,
        selection: NetworkSelection,
        request: JoinRequest,
    ) -> OpsResult<JoinOutcome> {
        let network = selection.target;
        let sidecar = self.load_deployed(name, network)?;
        let state = deployed_state(&sidecar, network)?;

        if request.stake.is_some() && !state.elastic {
            return Err(OpsError::NotElastic {
                subnet: name.to_string(),
                network,
            });
        }

        let node_config = match &request.node_config_path {
            Some(path) => {
                let mut config = read_node_config(path)?;
                merge_tracked_subnets(&mut config, &state.subnet_id, request.force_write)?;
                write_json_atomic(path, &Value::Object(config))?;
                debug!(path = %path.display(), "Updated node config");
                Some(path.clone())
            }
            None => None,
        };

        let plugin = match &request.plugin_dir {
            Some(dir) => self.install_plugin(name, &sidecar.vm, dir)?,
            None => None,
        };

        let stake = match request.stake {
            Some(stake) => Some(self.join_with_stake(name, selection, stake).await?),
            None => None,
        };

        info!(
            subnet = name,
            %network,
            subnet_id = %state.subnet_id,
            staked = stake.is_some(),
            "Node configured to validate subnet"
        );
        Ok(JoinOutcome {
            subnet_id: state.subnet_id.clone(),
            node_config,
            plugin,
            stake,
        })
    }

    /// Copy the subnet's VM binary to `<plugin_dir>/<vm id>`.
    ///
    /// Subnets on the standard EVM have no binary of their own; the node ships it.
    fn install_plugin(&self, name: &str, vm: &Vm, plugin_dir: &Path) -> OpsResult<Option<PathBuf>> {
        let binary = self.state.bundles.vm_binary_path(name);
        match vm {
            Vm::SubnetEvm { .. } => return Ok(None),
            Vm::Registered { .. } if !binary.is_file() => return Ok(None),
            Vm::Custom if !binary.is_file() => {
                return Err(OpsError::invalid_operation(format!(
                    "VM binary for subnet '{}' is missing from {}",
                    name,
                    binary.display()
                )))
            }
            _ => {}
        }

        let dest = plugin_dir.join(chain_vm_id(name, vm));
        copy_atomic(&binary, &dest)?;
        info!(subnet = name, plugin = %dest.display(), "Installed VM plugin");
        Ok(Some(dest))
    }
}
