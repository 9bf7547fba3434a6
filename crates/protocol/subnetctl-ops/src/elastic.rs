//! Elastic subnets: conversion to permissionless staking, staking, delegation.
//!
//! A subnet becomes elastic once, through a control-key authorized
//! `transform-elastic` transaction. Afterwards anyone can stake into it: stake
//! transactions are authorized by the staker alone and always go online.

use std::collections::BTreeSet;
use std::path::PathBuf;

use subnetctl_crypto::Address;
use subnetctl_store::Signer;
use subnetctl_types::{
    current_timestamp, ElasticConfig, NetworkSelection, NetworkState, NodeId,
    TransactionArtifact, TxPayload,
};
use tracing::{info, warn};

use crate::authorization::required_authorizers;
use crate::error::{OpsError, OpsResult};
use crate::subnet_ops::{deployed_state, SubnetOperations, TxOutcome};
use crate::transaction::sign_artifact;

/// Parameters of `transform_elastic`.
#[derive(Debug, Clone)]
pub struct TransformRequest {
    pub config: ElasticConfig,
    pub subnet_auth_keys: Vec<Address>,
    pub output_tx_path: Option<PathBuf>,
    /// Re-add every recorded permissioned validator as a permissionless one
    /// with this stake. Online conversions only.
    pub transform_validators: Option<u64>,
    /// Key paying for the re-added validators' stake.
    pub fee_key: Option<String>,
}

impl TransformRequest {
    pub fn new(config: ElasticConfig) -> Self {
        Self {
            config,
            subnet_auth_keys: Vec::new(),
            output_tx_path: None,
            transform_validators: None,
            fee_key: None,
        }
    }
}

/// Parameters of `join_with_stake` and `add_permissionless_delegator`.
#[derive(Debug, Clone)]
pub struct StakeRequest {
    pub node_id: NodeId,
    pub stake_amount: u64,
    /// Start of staking (seconds). Defaults to now plus the start delay.
    pub start_time: Option<u64>,
    pub duration_secs: u64,
    /// Key that owns and pays for the stake. Ignored on the local network.
    pub staker_key: Option<String>,
}

impl StakeRequest {
    pub fn new(node_id: NodeId, stake_amount: u64, duration_secs: u64) -> Self {
        Self {
            node_id,
            stake_amount,
            start_time: None,
            duration_secs,
            staker_key: None,
        }
    }
}

/// Staking parameters of an elastic subnet.
fn elastic_config<'a>(
    name: &str,
    selection: NetworkSelection,
    state: &'a NetworkState,
) -> OpsResult<&'a ElasticConfig> {
    match (&state.elastic_config, state.elastic) {
        (Some(config), true) => Ok(config),
        _ => Err(OpsError::NotElastic {
            subnet: name.to_string(),
            network: selection.target,
        }),
    }
}

impl SubnetOperations {
    /// Convert a deployed subnet to permissionless staking.
    ///
    /// Fails with `NotDeployed` before deployment and `AlreadyElastic` after a
    /// previous conversion; neither failure touches local state.
    pub async fn transform_elastic(
        &self,
        name: &str,
        selection: NetworkSelection,
        request: TransformRequest,
    ) -> OpsResult<TxOutcome> {
        let network = selection.target;
        let sidecar = self.load_deployed(name, network)?;
        let state = deployed_state(&sidecar, network)?;

        if state.elastic {
            return Err(OpsError::AlreadyElastic {
                subnet: name.to_string(),
                network,
            });
        }
        request.config.validate()?;
        if let Some(stake) = request.transform_validators {
            if !(request.config.min_validator_stake..=request.config.max_validator_stake)
                .contains(&stake)
            {
                return Err(OpsError::invalid_operation(format!(
                    "validator stake {} is outside {}..={}",
                    stake, request.config.min_validator_stake, request.config.max_validator_stake
                )));
            }
        }

        let authorizers = required_authorizers(state, &request.subnet_auth_keys)?;
        let artifact = TransactionArtifact::new(
            name,
            selection,
            TxPayload::TransformElastic {
                subnet_id: state.subnet_id.clone(),
                config: request.config.clone(),
            },
            authorizers,
            state.threshold,
            current_timestamp(),
        );

        let outcome = self
            .execute(artifact, request.output_tx_path.as_deref())
            .await?;

        match (request.transform_validators, &outcome) {
            (Some(stake), TxOutcome::Committed { .. }) => {
                self.restake_validators(name, selection, stake, request.fee_key.as_deref())
                    .await?;
            }
            (Some(_), TxOutcome::Pending { .. }) => {
                warn!(
                    subnet = name,
                    %network,
                    "Validators not converted; the conversion awaits signatures"
                );
            }
            (None, _) => {}
        }
        Ok(outcome)
    }

    /// Re-add recorded permissioned validators with stake after a conversion.
    async fn restake_validators(
        &self,
        name: &str,
        selection: NetworkSelection,
        stake: u64,
        fee_key: Option<&str>,
    ) -> OpsResult<()> {
        let sidecar = self.load_deployed(name, selection.target)?;
        let state = deployed_state(&sidecar, selection.target)?;
        let signer = self.fee_signer(selection, fee_key)?;
        let start_time = self.default_start(self.now_secs())?;

        let permissioned: Vec<_> = state
            .validators
            .iter()
            .filter(|(_, record)| record.stake_amount.is_none())
            .map(|(node_id, record)| (node_id.clone(), record.end_time))
            .collect();

        for (node_id, end_time) in permissioned {
            if end_time <= start_time {
                warn!(%node_id, "Validation period ends too soon to convert; skipping");
                continue;
            }
            let payload = TxPayload::AddPermissionlessValidator {
                subnet_id: state.subnet_id.clone(),
                node_id: node_id.clone(),
                stake_amount: stake,
                start_time,
                end_time,
            };
            self.submit_staking(name, selection, payload, signer.as_ref())
                .await?;
            info!(subnet = name, %node_id, stake, "Converted validator to permissionless");
        }
        Ok(())
    }

    /// Stake a node into an elastic subnet as a permissionless validator.
    pub async fn join_with_stake(
        &self,
        name: &str,
        selection: NetworkSelection,
        request: StakeRequest,
    ) -> OpsResult<TxOutcome> {
        let network = selection.target;
        let sidecar = self.load_deployed(name, network)?;
        let state = deployed_state(&sidecar, network)?;
        let config = elastic_config(name, selection, state)?;

        if state.validators.contains_key(&request.node_id) {
            return Err(OpsError::AlreadyExists(format!(
                "validator {}",
                request.node_id
            )));
        }
        if !config.accepts_validator_stake(request.stake_amount, request.duration_secs) {
            return Err(OpsError::invalid_operation(format!(
                "stake of {} for {}s is outside the subnet's bounds ({}..={} for {}s..={}s)",
                request.stake_amount,
                request.duration_secs,
                config.min_validator_stake,
                config.max_validator_stake,
                config.min_stake_duration_secs,
                config.max_stake_duration_secs
            )));
        }
        let (start_time, end_time) = self.validation_window(
            request.start_time,
            request.duration_secs,
            (config.min_stake_duration_secs, config.max_stake_duration_secs),
        )?;

        let signer = self.fee_signer(selection, request.staker_key.as_deref())?;
        let payload = TxPayload::AddPermissionlessValidator {
            subnet_id: state.subnet_id.clone(),
            node_id: request.node_id,
            stake_amount: request.stake_amount,
            start_time,
            end_time,
        };
        self.submit_staking(name, selection, payload, signer.as_ref())
            .await
    }

    /// Delegate stake to a known validator of an elastic subnet.
    pub async fn add_permissionless_delegator(
        &self,
        name: &str,
        selection: NetworkSelection,
        request: StakeRequest,
    ) -> OpsResult<TxOutcome> {
        let network = selection.target;
        let sidecar = self.load_deployed(name, network)?;
        let state = deployed_state(&sidecar, network)?;
        let config = elastic_config(name, selection, state)?;

        let validator = state.validators.get(&request.node_id).ok_or_else(|| {
            OpsError::invalid_operation(format!(
                "{} is not a known validator of subnet '{}' on {}",
                request.node_id, name, network
            ))
        })?;
        if request.stake_amount < config.min_delegator_stake {
            return Err(OpsError::invalid_operation(format!(
                "delegation of {} is below the minimum of {}",
                request.stake_amount, config.min_delegator_stake
            )));
        }
        let (start_time, end_time) = self.validation_window(
            request.start_time,
            request.duration_secs,
            (config.min_stake_duration_secs, config.max_stake_duration_secs),
        )?;
        if start_time < validator.start_time || end_time > validator.end_time {
            return Err(OpsError::invalid_operation(
                "delegation period must fall within the validator's period",
            ));
        }

        let signer = self.fee_signer(selection, request.staker_key.as_deref())?;
        let payload = TxPayload::AddPermissionlessDelegator {
            subnet_id: state.subnet_id.clone(),
            node_id: request.node_id,
            stake_amount: request.stake_amount,
            start_time,
            end_time,
        };
        self.submit_staking(name, selection, payload, signer.as_ref())
            .await
    }

    /// Sign a staking transaction with the staker's key alone and submit it.
    async fn submit_staking(
        &self,
        name: &str,
        selection: NetworkSelection,
        payload: TxPayload,
        signer: &dyn Signer,
    ) -> OpsResult<TxOutcome> {
        let authorizers: BTreeSet<Address> = [signer.address()].into_iter().collect();
        let mut artifact = TransactionArtifact::new(
            name,
            selection,
            payload,
            authorizers,
            1,
            current_timestamp(),
        );
        sign_artifact(&mut artifact, signer)?;
        let receipt = self.submit_artifact(&artifact).await?;
        self.record_committed(&artifact, &receipt)?;
        Ok(TxOutcome::Committed {
            tx_id: receipt.tx_id,
        })
    }
}
