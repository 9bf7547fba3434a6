//! Deploying subnets to a network.
//!
//! # Deploy
//!
//! 1. Reload the sidecar and reject networks it is already deployed to
//! 2. Resolve (or check an override of) the runtime version for the VM
//! 3. Make sure a node serving the network is up
//! 4. Create the subnet, paid and signed by the fee key
//! 5. Create the chain: online when one local key authorizes it, otherwise
//!    write a transaction file for the control keys
//! 6. Record the network entry (chain id pending on the offline path)
//!
//! If the node accepts the subnet but chain creation fails, nothing is
//! recorded locally. The orphaned subnet id is logged so the operator can
//! attach it with `register_deployment` or retry.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;
use subnetctl_crypto::{vm_id_for, Address};
use subnetctl_store::{BundleFile, ConfigBundleStore, LocalSigner, SidecarStore, Signer};
use subnetctl_types::{
    current_timestamp, ChainId, Network, NetworkSelection, NetworkState, SemVer, Sidecar,
    SubnetId, TransactionArtifact, TxPayload, VersionRequest, Vm, LOCAL_NETWORK_THRESHOLD,
};
use tracing::{debug, info, warn};

use crate::authorization::{
    choose_signing_path, required_authorizers, validate_control_policy, SigningPath,
};
use crate::error::{OpsError, OpsResult};
use crate::subnet_ops::{SubnetOperations, TxOutcome};
use crate::transaction::sign_artifact;

/// Parameters of `deploy`.
#[derive(Debug, Clone, Default)]
pub struct DeployRequest {
    /// Control keys of the new subnet. Ignored on the local network.
    pub control_keys: Vec<Address>,
    /// Signatures required to change the subnet. Ignored on the local network.
    pub threshold: u32,
    /// Control keys that authorize chain creation, when fewer than all are needed.
    pub subnet_auth_keys: Vec<Address>,
    /// Runtime release to use instead of the resolved one.
    pub runtime_version: Option<SemVer>,
    /// EVM chain id to stamp into the main network genesis variant.
    pub mainnet_chain_id: Option<u64>,
    /// Named key paying fees on public networks.
    pub fee_key: Option<String>,
    /// Where to write the chain creation transaction if it needs signatures.
    pub output_tx_path: Option<PathBuf>,
}

/// Result of `deploy`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployOutcome {
    pub subnet_id: SubnetId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<ChainId>,
    pub runtime_version: SemVer,
    pub chain_creation: TxOutcome,
}

/// EVM genesis with `config.chainId` replaced.
pub fn with_evm_chain_id(genesis: &[u8], chain_id: u64) -> OpsResult<Vec<u8>> {
    let mut value: Value = serde_json::from_slice(genesis)
        .map_err(|e| OpsError::invalid_operation(format!("genesis is not valid JSON: {}", e)))?;
    let config = value
        .get_mut("config")
        .and_then(Value::as_object_mut)
        .ok_or_else(|| OpsError::invalid_operation("genesis has no config object"))?;
    config.insert("chainId".to_string(), Value::from(chain_id));
    serde_json::to_vec_pretty(&value)
        .map_err(|e| OpsError::invalid_operation(format!("cannot encode genesis: {}", e)))
}

/// VM id the chain is created with.
pub fn chain_vm_id(name: &str, vm: &Vm) -> String {
    match vm {
        Vm::Registered { vm_id, .. } => vm_id.clone(),
        Vm::SubnetEvm { .. } => vm_id_for("subnetevm").to_base58(),
        Vm::Custom => vm_id_for(name).to_base58(),
    }
}

impl SubnetOperations {
    /// Runtime version a sidecar deploys against.
    fn runtime_for(&self, sidecar: &Sidecar, requested: Option<SemVer>) -> OpsResult<SemVer> {
        if let Some(runtime) = requested {
            self.resolver().check_runtime(&runtime, sidecar.rpc_version)?;
            return Ok(runtime);
        }
        let runtime = match &sidecar.vm {
            Vm::SubnetEvm { version } => {
                let resolved = self
                    .resolver()
                    .resolve_runtime_version(VersionRequest::Pinned(*version))?;
                if resolved.rpc_version != sidecar.rpc_version {
                    return Err(subnetctl_version::VersionError::incompatible(
                        version,
                        format!(
                            "compatibility table maps it to rpcchainvm={} but the subnet was created with {}",
                            resolved.rpc_version, sidecar.rpc_version
                        ),
                    )
                    .into());
                }
                resolved.runtime_version
            }
            Vm::Custom | Vm::Registered { .. } => {
                self.resolver().runtime_for_rpc(sidecar.rpc_version)?
            }
        };
        Ok(runtime)
    }

    /// Genesis bytes to deploy to `network`, writing the main network variant when asked.
    fn genesis_for(
        &self,
        sidecar: &Sidecar,
        network: Network,
        mainnet_chain_id: Option<u64>,
    ) -> OpsResult<Vec<u8>> {
        let bundles = &self.state.bundles;
        if network != Network::Mainnet {
            return Ok(bundles.read(&sidecar.name, BundleFile::Genesis)?);
        }

        if let Some(chain_id) = mainnet_chain_id {
            if !matches!(sidecar.vm, Vm::SubnetEvm { .. }) {
                return Err(OpsError::invalid_operation(
                    "a main network chain id only applies to EVM subnets",
                ));
            }
            let genesis = bundles.read(&sidecar.name, BundleFile::Genesis)?;
            let variant = with_evm_chain_id(&genesis, chain_id)?;
            bundles.write(&sidecar.name, BundleFile::MainnetGenesis, &variant)?;
            debug!(subnet = %sidecar.name, chain_id, "Wrote main network genesis");
            return Ok(variant);
        }

        let file = if bundles.has(&sidecar.name, BundleFile::MainnetGenesis) {
            BundleFile::MainnetGenesis
        } else {
            BundleFile::Genesis
        };
        Ok(bundles.read(&sidecar.name, file)?)
    }

    /// Deploy a subnet and its chain to a network.
    pub async fn deploy(
        &self,
        name: &str,
        selection: NetworkSelection,
        request: DeployRequest,
    ) -> OpsResult<DeployOutcome> {
        let network = selection.target;
        let sidecar = self.state.sidecars.load(name)?;
        if sidecar.is_deployed(network) {
            return Err(OpsError::AlreadyDeployed {
                subnet: name.to_string(),
                network,
            });
        }

        let (control_keys, threshold) = if network == Network::Local {
            (
                vec![LocalSigner::local_network().address()],
                LOCAL_NETWORK_THRESHOLD,
            )
        } else {
            validate_control_policy(&request.control_keys, request.threshold)?;
            (request.control_keys.clone(), request.threshold)
        };

        let runtime = self.runtime_for(&sidecar, request.runtime_version)?;
        let genesis = self.genesis_for(&sidecar, network, request.mainnet_chain_id)?;

        // The chain's authorizers are fixed before anything is submitted.
        let mut proposed = NetworkState::new(SubnetId::new(""), control_keys.clone(), threshold)
            .with_runtime_version(runtime.to_string());
        let chosen: &[Address] = if network == Network::Local {
            &[]
        } else {
            &request.subnet_auth_keys
        };
        let authorizers = required_authorizers(&proposed, chosen)?;
        let path = choose_signing_path(self.keyring(), &authorizers, threshold)?;
        if !path.is_online() && request.output_tx_path.is_none() {
            return Err(OpsError::invalid_operation(
                "chain creation needs signatures from keys not held here; supply a transaction file path",
            ));
        }
        let fee_signer = self.fee_signer(selection, request.fee_key.as_deref())?;

        self.control_plane()
            .ensure_running(selection.endpoint(), &runtime)
            .await?;

        let subnet_id = self
            .create_subnet(selection, fee_signer.as_ref(), control_keys, threshold)
            .await?;
        proposed.subnet_id = subnet_id.clone();

        let mut chain = TransactionArtifact::new(
            name,
            selection,
            TxPayload::CreateChain {
                subnet_id: subnet_id.clone(),
                chain_name: name.to_string(),
                vm_id: chain_vm_id(name, &sidecar.vm),
                genesis,
            },
            authorizers,
            threshold,
            current_timestamp(),
        );

        let (chain_id, chain_creation) = match path {
            SigningPath::Online(signer) => {
                sign_artifact(&mut chain, signer.as_ref())?;
                let receipt = self.submit_artifact(&chain).await.map_err(|e| {
                    warn!(
                        subnet = name,
                        %network,
                        subnet_id = %subnet_id,
                        error = %e,
                        "Subnet created but chain creation failed; nothing recorded"
                    );
                    e
                })?;
                let chain_id = ChainId::new(
                    receipt
                        .created_id
                        .clone()
                        .unwrap_or_else(|| receipt.tx_id.clone()),
                );
                proposed.chain_id = Some(chain_id.clone());
                (
                    Some(chain_id),
                    TxOutcome::Committed {
                        tx_id: receipt.tx_id,
                    },
                )
            }
            SigningPath::Offline => {
                let out = request
                    .output_tx_path
                    .as_deref()
                    .ok_or_else(|| OpsError::invalid_operation("no transaction file path"))?;
                self.save_transaction(out, &chain)?;
                (
                    None,
                    TxOutcome::Pending {
                        path: out.to_path_buf(),
                        pending_signers: chain.pending_signers(),
                    },
                )
            }
        };

        self.state
            .sidecars
            .set_network_state(name, network, proposed, false)
            .map_err(|e| {
                warn!(
                    subnet = name,
                    %network,
                    subnet_id = %subnet_id,
                    error = %e,
                    "Subnet deployed but sidecar not updated"
                );
                e
            })?;

        info!(
            subnet = name,
            %network,
            simulated = selection.simulate_public,
            subnet_id = %subnet_id,
            chain_pending = chain_id.is_none(),
            runtime = %runtime,
            "Deployed subnet"
        );
        Ok(DeployOutcome {
            subnet_id,
            chain_id,
            runtime_version: runtime,
            chain_creation,
        })
    }

    async fn create_subnet(
        &self,
        selection: NetworkSelection,
        fee_signer: &dyn Signer,
        control_keys: Vec<Address>,
        threshold: u32,
    ) -> OpsResult<SubnetId> {
        let fee_payer: BTreeSet<Address> = [fee_signer.address()].into_iter().collect();
        let mut tx = TransactionArtifact::new(
            "",
            selection,
            TxPayload::CreateSubnet {
                control_keys,
                threshold,
            },
            fee_payer,
            1,
            current_timestamp(),
        );
        sign_artifact(&mut tx, fee_signer)?;
        let receipt = self.submit_artifact(&tx).await?;
        Ok(SubnetId::new(
            receipt.created_id.unwrap_or(receipt.tx_id),
        ))
    }

    /// Attach known ids of an existing deployment to a subnet.
    ///
    /// With `force`, replaces an existing entry. This is a corrective path for
    /// state lost or made elsewhere; deploy never overwrites.
    pub fn register_deployment(
        &self,
        name: &str,
        network: Network,
        state: NetworkState,
        force: bool,
    ) -> OpsResult<Sidecar> {
        if !state.control_keys.is_empty() || state.threshold != 0 {
            validate_control_policy(&state.control_keys, state.threshold)?;
        }
        let sidecar = self
            .state
            .sidecars
            .set_network_state(name, network, state, force)?;
        info!(subnet = name, %network, force, "Registered deployment");
        Ok(sidecar)
    }
}
