//! Subnet configuration operations.
//!
//! # Write Order
//!
//! `create` and `import_subnet` write in this order:
//!
//! 1. Genesis (and VM binary, for custom or shipped VMs)
//! 2. Sidecar
//! 3. Overlays (`configure`, later)
//!
//! A subnet exists exactly when its sidecar does, so an interrupted create
//! leaves at most a dangling genesis that the next create overwrites.
//! `delete` removes the sidecar first for the same reason.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use subnetctl_store::{BundleFile, ConfigBundleStore, SidecarStore, StoreError};
use subnetctl_types::{
    validate_subnet_name, NetworkState, Sidecar, VersionRequest, Vm,
};
use tracing::{debug, info};

use crate::error::{OpsError, OpsResult};
use crate::publisher::ImportSource;
use crate::subnet_ops::SubnetOperations;

/// The VM a new subnet runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmSelection {
    /// An operator-supplied binary.
    Custom { binary: PathBuf },
    /// The standard EVM at a pinned or the latest version.
    SubnetEvm(VersionRequest),
}

/// Parameters of `create`.
#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub name: String,
    pub vm: VmSelection,
    pub genesis: PathBuf,
    pub token_name: Option<String>,
    /// Replace an existing subnet of the same name.
    pub force: bool,
}

impl CreateRequest {
    pub fn new(name: impl Into<String>, vm: VmSelection, genesis: impl AsRef<Path>) -> Self {
        Self {
            name: name.into(),
            vm,
            genesis: genesis.as_ref().to_path_buf(),
            token_name: None,
            force: false,
        }
    }

    pub fn with_token_name(mut self, token_name: impl Into<String>) -> Self {
        self.token_name = Some(token_name.into());
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

/// A subnet and the parts of its bundle present on disk.
#[derive(Debug, Clone, Serialize)]
pub struct SubnetDescription {
    pub sidecar: Sidecar,
    pub bundle_files: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vm_binary: Option<PathBuf>,
}

const DESCRIBED_FILES: [BundleFile; 5] = [
    BundleFile::Genesis,
    BundleFile::MainnetGenesis,
    BundleFile::ChainConfig,
    BundleFile::PerNodeChainConfig,
    BundleFile::ElasticConfig,
];

fn read_input(path: &Path) -> OpsResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| OpsError::input(path, e))
}

fn parse_json(path: &Path, bytes: &[u8]) -> OpsResult<Value> {
    serde_json::from_slice(bytes).map_err(|e| {
        OpsError::invalid_operation(format!("{} is not valid JSON: {}", path.display(), e))
    })
}

impl SubnetOperations {
    /// Create a subnet from a genesis file.
    ///
    /// Fails with `AlreadyExists` if the name is taken, unless `force` is set.
    pub async fn create(&self, request: CreateRequest) -> OpsResult<Sidecar> {
        let name = request.name.as_str();
        validate_subnet_name(name)?;

        if self.state.sidecars.exists(name) && !request.force {
            return Err(OpsError::AlreadyExists(format!("subnet '{}'", name)));
        }

        let genesis = read_input(&request.genesis)?;
        parse_json(&request.genesis, &genesis)?;

        // Everything that can fail without side effects happens before the first write.
        let (vm, rpc_version, binary) = match &request.vm {
            VmSelection::Custom { binary } => {
                let rpc = self.resolver().extract_protocol_version(binary).await?;
                (Vm::Custom, rpc, Some(binary.as_path()))
            }
            VmSelection::SubnetEvm(version) => {
                let resolved = self.resolver().resolve_runtime_version(*version)?;
                (
                    Vm::SubnetEvm {
                        version: resolved.vm_version,
                    },
                    resolved.rpc_version,
                    None,
                )
            }
        };

        if self.state.sidecars.exists(name) {
            info!(subnet = name, "Replacing existing subnet");
            self.state.sidecars.delete(name)?;
            self.state.bundles.remove(name)?;
        }

        self.state.bundles.write(name, BundleFile::Genesis, &genesis)?;
        if let Some(binary) = binary {
            self.state.bundles.install_vm_binary(name, binary)?;
        }

        let mut sidecar = Sidecar::new(name, vm, rpc_version);
        if let Some(token) = &request.token_name {
            sidecar = sidecar.with_token_name(token);
        }
        self.state.sidecars.save(&sidecar)?;

        info!(
            subnet = name,
            vm = sidecar.vm.kind_name(),
            version = %sidecar.vm.version_label(),
            rpc_version,
            "Created subnet"
        );
        Ok(sidecar)
    }

    /// Install chain-config overlays. Either overlay may be given alone.
    pub fn configure(
        &self,
        name: &str,
        chain_config: Option<&Path>,
        per_node_chain_config: Option<&Path>,
    ) -> OpsResult<Vec<PathBuf>> {
        self.state.sidecars.load(name)?;

        if chain_config.is_none() && per_node_chain_config.is_none() {
            return Err(OpsError::invalid_operation(
                "give a chain config, a per-node chain config, or both",
            ));
        }

        let mut staged = Vec::new();
        if let Some(path) = chain_config {
            let bytes = read_input(path)?;
            parse_json(path, &bytes)?;
            staged.push((BundleFile::ChainConfig, bytes));
        }
        if let Some(path) = per_node_chain_config {
            let bytes = read_input(path)?;
            if !parse_json(path, &bytes)?.is_object() {
                return Err(OpsError::invalid_operation(format!(
                    "{} must map node ids to chain configs",
                    path.display()
                )));
            }
            staged.push((BundleFile::PerNodeChainConfig, bytes));
        }

        let mut written = Vec::new();
        for (file, bytes) in staged {
            written.push(self.state.bundles.write(name, file, &bytes)?);
            debug!(subnet = name, file = file.file_name(), "Wrote overlay");
        }
        info!(subnet = name, files = written.len(), "Configured subnet");
        Ok(written)
    }

    /// Delete a subnet and its whole bundle.
    ///
    /// Without `force`, the operator must confirm first.
    pub fn delete(&self, name: &str, force: bool) -> OpsResult<()> {
        if !self.state.sidecars.exists(name) {
            return Err(StoreError::SubnetNotFound(name.to_string()).into());
        }

        if !force {
            let prompt = format!("Delete subnet '{}' and all its configuration?", name);
            if !self.confirmer().confirm(&prompt)? {
                return Err(OpsError::Cancelled);
            }
        }

        self.state.sidecars.delete(name)?;
        self.state.bundles.remove(name)?;
        info!(subnet = name, "Deleted subnet");
        Ok(())
    }

    /// Import a published subnet under `name` (default: its published name).
    pub async fn import_subnet(
        &self,
        source: &ImportSource,
        name: Option<&str>,
    ) -> OpsResult<Sidecar> {
        if let Some(name) = name {
            validate_subnet_name(name)?;
            if self.state.sidecars.exists(name) {
                return Err(OpsError::AlreadyExists(format!("subnet '{}'", name)));
            }
        }

        let published = self.publisher().fetch(source).await?;
        let name = name.unwrap_or(&published.subnet.subnet);
        validate_subnet_name(name)?;
        if self.state.sidecars.exists(name) {
            return Err(OpsError::AlreadyExists(format!("subnet '{}'", name)));
        }

        for existing in self.state.sidecars.list()? {
            let sidecar = self.state.sidecars.load(&existing)?;
            if let Vm::Registered { vm_id, .. } = &sidecar.vm {
                if *vm_id == published.vm.vm_id {
                    return Err(OpsError::AlreadyExists(format!(
                        "VM {} (registered by subnet '{}')",
                        vm_id, existing
                    )));
                }
            }
        }

        self.state
            .bundles
            .write(name, BundleFile::Genesis, &published.genesis)?;
        if let Some(binary) = &published.binary {
            self.state.bundles.install_vm_binary(name, binary)?;
        }

        let mut sidecar = Sidecar::new(
            name,
            Vm::Registered {
                vm_id: published.vm.vm_id.clone(),
                version: published.vm.version.clone(),
            },
            published.vm.rpc_version,
        );
        sidecar.token_name = published.subnet.token_name.clone();
        sidecar.imported_from = Some(source.to_string());
        for (network, deployment) in &published.subnet.deployments {
            let mut state = NetworkState::new(
                deployment.subnet_id.clone(),
                deployment.control_keys.clone(),
                deployment.threshold,
            );
            state.chain_id = deployment.chain_id.clone();
            sidecar.networks.insert(*network, state);
        }
        self.state.sidecars.save(&sidecar)?;

        info!(subnet = name, %source, vm_id = %published.vm.vm_id, "Imported subnet");
        Ok(sidecar)
    }

    /// Show a subnet and which bundle files it has.
    pub fn describe(&self, name: &str) -> OpsResult<SubnetDescription> {
        let sidecar = self.state.sidecars.load(name)?;
        let bundle_files = DESCRIBED_FILES
            .iter()
            .filter(|f| self.state.bundles.has(name, **f))
            .map(|f| f.file_name())
            .collect();
        let binary = self.state.bundles.vm_binary_path(name);
        let vm_binary = binary.is_file().then_some(binary);

        Ok(SubnetDescription {
            sidecar,
            bundle_files,
            vm_binary,
        })
    }

    /// Names of all subnets.
    pub fn list_subnets(&self) -> OpsResult<Vec<String>> {
        Ok(self.state.sidecars.list()?)
    }
}

