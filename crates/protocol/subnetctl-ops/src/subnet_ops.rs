//! Main SubnetOperations implementation.
//!
//! `SubnetOperations` owns the local store and a handle to every external
//! collaborator. Its operations are split across modules by concern:
//!
//! - [`crate::subnet`] - create, configure, delete, import, describe
//! - [`crate::deploy`] - deploy and register existing deployments
//! - [`crate::validators`] - permissioned validators, listing, stats
//! - [`crate::elastic`] - elastic conversion, staking, delegation
//! - [`crate::join`] - node configuration for validating a subnet
//! - [`crate::transaction`] - signing and committing transaction files
//!
//! Every operation reloads the sidecar from disk before acting on it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use subnetctl_crypto::Address;
use subnetctl_node::{ControlPlane, TxReceipt};
use subnetctl_store::{
    save_artifact, BundleFile, ConfigBundleStore, Keyring, LocalSigner, SidecarStore, Signer,
    StoreError, SubnetState,
};
use subnetctl_types::{
    current_timestamp, ChainId, Delegation, Network, NetworkSelection, NetworkState, Sidecar,
    TransactionArtifact, TxPayload, ValidatorRecord,
};
use subnetctl_version::VersionResolver;
use tracing::{info, warn};

use crate::authorization::{choose_signing_path, SigningPath};
use crate::config::OpsConfig;
use crate::confirm::Confirmer;
use crate::error::{OpsError, OpsResult};
use crate::publisher::Publisher;
use crate::transaction::sign_artifact;

/// What happened to a transaction an operation produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TxOutcome {
    /// Signed here, accepted by the network and recorded in the sidecar.
    Committed { tx_id: String },
    /// Written to a transaction file awaiting signatures.
    Pending {
        path: PathBuf,
        pending_signers: Vec<Address>,
    },
}

impl TxOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, TxOutcome::Committed { .. })
    }

    /// Path of the transaction file, for pending outcomes.
    pub fn pending_path(&self) -> Option<&Path> {
        match self {
            TxOutcome::Pending { path, .. } => Some(path),
            TxOutcome::Committed { .. } => None,
        }
    }
}

/// Subnet lifecycle operations.
pub struct SubnetOperations {
    /// Local store.
    pub state: SubnetState,
    /// Operation defaults.
    pub config: OpsConfig,
    control_plane: Arc<dyn ControlPlane>,
    resolver: VersionResolver,
    publisher: Arc<dyn Publisher>,
    keyring: Arc<dyn Keyring>,
    confirmer: Arc<dyn Confirmer>,
}

impl SubnetOperations {
    /// Create operations over a store. Keys are read from the store's key directory.
    pub fn new(
        state: SubnetState,
        resolver: VersionResolver,
        control_plane: Arc<dyn ControlPlane>,
        publisher: Arc<dyn Publisher>,
        confirmer: Arc<dyn Confirmer>,
    ) -> Self {
        let keyring = Arc::new(state.keys.clone());
        Self {
            state,
            config: OpsConfig::default(),
            control_plane,
            resolver,
            publisher,
            keyring,
            confirmer,
        }
    }

    /// Replace the operation defaults.
    pub fn with_config(mut self, config: OpsConfig) -> Self {
        self.config = config;
        self
    }

    /// Sign with a different keyring (for example a hardware device).
    pub fn with_keyring(mut self, keyring: Arc<dyn Keyring>) -> Self {
        self.keyring = keyring;
        self
    }

    pub fn resolver(&self) -> &VersionResolver {
        &self.resolver
    }

    pub(crate) fn control_plane(&self) -> &dyn ControlPlane {
        self.control_plane.as_ref()
    }

    pub(crate) fn publisher(&self) -> &dyn Publisher {
        self.publisher.as_ref()
    }

    pub(crate) fn keyring(&self) -> &dyn Keyring {
        self.keyring.as_ref()
    }

    pub(crate) fn confirmer(&self) -> &dyn Confirmer {
        self.confirmer.as_ref()
    }

    // =========================================================================
    // Shared Helpers
    // =========================================================================

    /// Current time in seconds.
    pub(crate) fn now_secs(&self) -> u64 {
        current_timestamp() / 1000
    }

    /// Load a sidecar and require an entry for `network`.
    pub(crate) fn load_deployed(&self, name: &str, network: Network) -> OpsResult<Sidecar> {
        let sidecar = self.state.sidecars.load(name)?;
        if !sidecar.is_deployed(network) {
            return Err(OpsError::NotDeployed {
                subnet: name.to_string(),
                network,
            });
        }
        Ok(sidecar)
    }

    /// The key paying fees for a submission.
    ///
    /// Submissions that reach the local network use the pre-funded local key.
    pub(crate) fn fee_signer(
        &self,
        selection: NetworkSelection,
        key: Option<&str>,
    ) -> OpsResult<Box<dyn Signer>> {
        if selection.endpoint() == Network::Local {
            return Ok(Box::new(LocalSigner::local_network()));
        }
        let name = key.or(self.config.fee_key.as_deref()).ok_or_else(|| {
            OpsError::key_unavailable(format!(
                "no fee key given for {}; pass --key or set keys.default_key",
                selection.target
            ))
        })?;
        self.keyring().signer_named(name).map_err(|e| match e {
            StoreError::KeyNotFound(n) => OpsError::key_unavailable(format!("key '{}' not found", n)),
            other => other.into(),
        })
    }

    /// Validation window starting at `start` (or after the default delay).
    pub(crate) fn validation_window(
        &self,
        start: Option<u64>,
        duration_secs: u64,
        bounds: (u64, u64),
    ) -> OpsResult<(u64, u64)> {
        let (min, max) = bounds;
        if duration_secs < min || duration_secs > max {
            return Err(OpsError::invalid_operation(format!(
                "validation period of {}s is outside {}s..={}s",
                duration_secs, min, max
            )));
        }
        let now = self.now_secs();
        let start = match start {
            Some(start) => start,
            None => self.default_start(now)?,
        };
        if start < now {
            return Err(OpsError::invalid_operation("start time is in the past"));
        }
        let end = start.checked_add(duration_secs).ok_or_else(|| {
            OpsError::invalid_operation(format!(
                "start time {} plus {}s is out of range",
                start, duration_secs
            ))
        })?;
        Ok((start, end))
    }

    /// Start time after the configured delay.
    pub(crate) fn default_start(&self, now: u64) -> OpsResult<u64> {
        now.checked_add(self.config.start_delay_secs)
            .ok_or_else(|| OpsError::invalid_operation("start delay is out of range"))
    }

    /// Submit a fully signed artifact to the network that should receive it.
    pub(crate) async fn submit_artifact(
        &self,
        artifact: &TransactionArtifact,
    ) -> OpsResult<TxReceipt> {
        let receipt = self
            .control_plane
            .submit(artifact.selection().endpoint(), &artifact.to_signed_transaction())
            .await?;
        Ok(receipt)
    }

    /// Sign and commit now, or write a transaction file, per the branch rule.
    pub(crate) async fn execute(
        &self,
        mut artifact: TransactionArtifact,
        output: Option<&Path>,
    ) -> OpsResult<TxOutcome> {
        match choose_signing_path(
            self.keyring(),
            &artifact.required_authorizers,
            artifact.threshold,
        )? {
            SigningPath::Online(signer) => {
                sign_artifact(&mut artifact, signer.as_ref())?;
                let receipt = self.submit_artifact(&artifact).await?;
                self.record_committed(&artifact, &receipt)?;
                Ok(TxOutcome::Committed {
                    tx_id: receipt.tx_id,
                })
            }
            SigningPath::Offline => {
                let path = output.ok_or_else(|| {
                    OpsError::invalid_operation(format!(
                        "{} needs {} signature(s) from keys not held here; supply a transaction file path",
                        artifact.kind(),
                        artifact.threshold
                    ))
                })?;
                save_artifact(path, &artifact)?;
                info!(
                    subnet = %artifact.subnet,
                    network = %artifact.network,
                    kind = %artifact.kind(),
                    path = %path.display(),
                    "Transaction awaiting signatures"
                );
                Ok(TxOutcome::Pending {
                    path: path.to_path_buf(),
                    pending_signers: artifact.pending_signers(),
                })
            }
        }
    }

    /// Apply an accepted transaction to the sidecar, warning if that fails.
    ///
    /// The network has already accepted the transaction at this point; a
    /// failure here leaves local state behind the network and is not rolled back.
    pub(crate) fn record_committed(
        &self,
        artifact: &TransactionArtifact,
        receipt: &TxReceipt,
    ) -> OpsResult<Sidecar> {
        self.apply_committed(&artifact.subnet, artifact.network, &artifact.payload, receipt)
            .map_err(|e| {
                warn!(
                    subnet = %artifact.subnet,
                    network = %artifact.network,
                    tx_id = %receipt.tx_id,
                    error = %e,
                    "Transaction accepted but local state not updated"
                );
                e
            })
    }

    fn apply_committed(
        &self,
        subnet: &str,
        network: Network,
        payload: &TxPayload,
        receipt: &TxReceipt,
    ) -> OpsResult<Sidecar> {
        let created_id = receipt
            .created_id
            .clone()
            .unwrap_or_else(|| receipt.tx_id.clone());
        let now = current_timestamp();
        let sidecars = &self.state.sidecars;

        let sidecar = match payload {
            TxPayload::CreateSubnet { .. } => {
                return Err(OpsError::invalid_operation(
                    "subnet creation is recorded by deploy",
                ))
            }
            TxPayload::CreateChain { .. } => {
                sidecars.update_network_state(subnet, network, &mut |state: &mut NetworkState| {
                    state.chain_id = Some(ChainId::new(created_id.clone()));
                })?
            }
            TxPayload::AddValidator {
                node_id,
                weight,
                start_time,
                end_time,
                ..
            } => sidecars.update_network_state(subnet, network, &mut |state: &mut NetworkState| {
                state.validators.insert(
                    node_id.clone(),
                    ValidatorRecord {
                        weight: *weight,
                        start_time: *start_time,
                        end_time: *end_time,
                        stake_amount: None,
                        delegations: Vec::new(),
                    },
                );
            })?,
            TxPayload::RemoveValidator { node_id, .. } => {
                sidecars.update_network_state(subnet, network, &mut |state: &mut NetworkState| {
                    state.validators.remove(node_id);
                })?
            }
            TxPayload::TransformElastic { config, .. } => {
                let mut config = config.clone();
                config.asset_id = Some(created_id.clone());
                config.converted_at = Some(now);
                // The side file lands before the elastic flag.
                let side_file = serde_json::to_vec_pretty(&config)
                    .map_err(StoreError::from)?;
                self.state
                    .bundles
                    .write(subnet, BundleFile::ElasticConfig, &side_file)?;
                sidecars.update_network_state(subnet, network, &mut |state: &mut NetworkState| {
                    state.elastic = true;
                    state.elastic_config = Some(config.clone());
                })?
            }
            TxPayload::AddPermissionlessValidator {
                node_id,
                stake_amount,
                start_time,
                end_time,
                ..
            } => sidecars.update_network_state(subnet, network, &mut |state: &mut NetworkState| {
                let record = state
                    .validators
                    .entry(node_id.clone())
                    .or_insert_with(|| ValidatorRecord {
                        weight: *stake_amount,
                        start_time: *start_time,
                        end_time: *end_time,
                        stake_amount: None,
                        delegations: Vec::new(),
                    });
                record.weight = *stake_amount;
                record.stake_amount = Some(*stake_amount);
                record.start_time = *start_time;
                record.end_time = *end_time;
            })?,
            TxPayload::AddPermissionlessDelegator {
                node_id,
                stake_amount,
                end_time,
                ..
            } => sidecars.update_network_state(subnet, network, &mut |state: &mut NetworkState| {
                if let Some(record) = state.validators.get_mut(node_id) {
                    record.delegations.push(Delegation {
                        amount: *stake_amount,
                        end_time: *end_time,
                        tx_id: receipt.tx_id.clone(),
                    });
                }
            })?,
        };

        info!(
            subnet,
            %network,
            kind = %payload.kind(),
            tx_id = %receipt.tx_id,
            "Transaction committed"
        );
        Ok(sidecar)
    }
}

/// Network state of a sidecar already checked to be deployed.
pub(crate) fn deployed_state<'a>(
    sidecar: &'a Sidecar,
    network: Network,
) -> OpsResult<&'a NetworkState> {
    sidecar.network(network).ok_or_else(|| OpsError::NotDeployed {
        subnet: sidecar.name.clone(),
        network,
    })
}
