//! Permissioned validator operations and queries.

use std::path::PathBuf;

use subnetctl_crypto::Address;
use subnetctl_node::{SubnetStats, ValidatorInfo};
use subnetctl_types::{
    current_timestamp, NetworkSelection, NodeId, TransactionArtifact, TxPayload,
    MAX_STAKING_PERIOD_SECS, MIN_STAKING_PERIOD_SECS,
};
use tracing::debug;

use crate::authorization::required_authorizers;
use crate::error::{OpsError, OpsResult};
use crate::subnet_ops::{deployed_state, SubnetOperations, TxOutcome};

/// Parameters of `add_validator`.
#[derive(Debug, Clone)]
pub struct AddValidatorRequest {
    pub node_id: NodeId,
    /// Consensus weight. Defaults to the configured validator weight.
    pub weight: Option<u64>,
    /// Start of validation (seconds). Defaults to now plus the start delay.
    pub start_time: Option<u64>,
    pub duration_secs: u64,
    pub subnet_auth_keys: Vec<Address>,
    pub output_tx_path: Option<PathBuf>,
}

impl AddValidatorRequest {
    pub fn new(node_id: NodeId, duration_secs: u64) -> Self {
        Self {
            node_id,
            weight: None,
            start_time: None,
            duration_secs,
            subnet_auth_keys: Vec::new(),
            output_tx_path: None,
        }
    }
}

/// Parameters of `remove_validator`.
#[derive(Debug, Clone)]
pub struct RemoveValidatorRequest {
    pub node_id: NodeId,
    pub subnet_auth_keys: Vec<Address>,
    pub output_tx_path: Option<PathBuf>,
}

impl RemoveValidatorRequest {
    pub fn new(node_id: NodeId) -> Self {
        Self {
            node_id,
            subnet_auth_keys: Vec::new(),
            output_tx_path: None,
        }
    }
}

impl SubnetOperations {
    /// Add a permissioned validator to a deployed subnet.
    pub async fn add_validator(
        &self,
        name: &str,
        selection: NetworkSelection,
        request: AddValidatorRequest,
    ) -> OpsResult<TxOutcome> {
        let network = selection.target;
        let sidecar = self.load_deployed(name, network)?;
        let state = deployed_state(&sidecar, network)?;

        if state.validators.contains_key(&request.node_id) {
            return Err(OpsError::AlreadyExists(format!(
                "validator {}",
                request.node_id
            )));
        }
        let weight = request.weight.unwrap_or(self.config.default_validator_weight);
        if weight == 0 {
            return Err(OpsError::invalid_operation("validator weight must be positive"));
        }
        let (start_time, end_time) = self.validation_window(
            request.start_time,
            request.duration_secs,
            (MIN_STAKING_PERIOD_SECS, MAX_STAKING_PERIOD_SECS),
        )?;

        let authorizers = required_authorizers(state, &request.subnet_auth_keys)?;
        let artifact = TransactionArtifact::new(
            name,
            selection,
            TxPayload::AddValidator {
                subnet_id: state.subnet_id.clone(),
                node_id: request.node_id,
                weight,
                start_time,
                end_time,
            },
            authorizers,
            state.threshold,
            current_timestamp(),
        );
        self.execute(artifact, request.output_tx_path.as_deref())
            .await
    }

    /// Remove a validator from a deployed subnet.
    ///
    /// The validator must be recorded locally or currently validating on the network.
    pub async fn remove_validator(
        &self,
        name: &str,
        selection: NetworkSelection,
        request: RemoveValidatorRequest,
    ) -> OpsResult<TxOutcome> {
        let network = selection.target;
        let sidecar = self.load_deployed(name, network)?;
        let state = deployed_state(&sidecar, network)?;

        if !state.validators.contains_key(&request.node_id) {
            let current = self
                .control_plane()
                .validators(selection.endpoint(), &state.subnet_id)
                .await?;
            if !current.iter().any(|v| v.node_id == request.node_id) {
                return Err(OpsError::invalid_operation(format!(
                    "{} is not a validator of subnet '{}' on {}",
                    request.node_id, name, network
                )));
            }
            debug!(node_id = %request.node_id, "Validator known to the network only");
        }

        let authorizers = required_authorizers(state, &request.subnet_auth_keys)?;
        let artifact = TransactionArtifact::new(
            name,
            selection,
            TxPayload::RemoveValidator {
                subnet_id: state.subnet_id.clone(),
                node_id: request.node_id,
            },
            authorizers,
            state.threshold,
            current_timestamp(),
        );
        self.execute(artifact, request.output_tx_path.as_deref())
            .await
    }

    /// Current validators of a deployed subnet, as the network reports them.
    pub async fn list_validators(
        &self,
        name: &str,
        selection: NetworkSelection,
    ) -> OpsResult<Vec<ValidatorInfo>> {
        let sidecar = self.load_deployed(name, selection.target)?;
        let state = deployed_state(&sidecar, selection.target)?;
        Ok(self
            .control_plane()
            .validators(selection.endpoint(), &state.subnet_id)
            .await?)
    }

    /// Summary statistics of a deployed subnet.
    pub async fn stats(&self, name: &str, selection: NetworkSelection) -> OpsResult<SubnetStats> {
        let sidecar = self.load_deployed(name, selection.target)?;
        let state = deployed_state(&sidecar, selection.target)?;
        Ok(self
            .control_plane()
            .subnet_stats(
                selection.endpoint(),
                &state.subnet_id,
                state.chain_id.as_ref(),
            )
            .await?)
    }
}
