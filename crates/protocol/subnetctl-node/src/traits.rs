//! Control-plane trait definition.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use subnetctl_types::{ChainId, Network, NodeId, SemVer, SignedTransaction, SubnetId};

use crate::error::NodeResult;

/// Result of an accepted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    /// Transaction id assigned by the network.
    pub tx_id: String,
    /// Id of the object the transaction created (subnet, chain or asset), if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_id: Option<String>,
}

/// A validator as the network reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorInfo {
    pub node_id: NodeId,
    pub weight: u64,
    pub start_time: u64,
    pub end_time: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stake_amount: Option<u64>,
    #[serde(default)]
    pub connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<f64>,
}

/// Summary of a deployed subnet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubnetStats {
    pub subnet_id: SubnetId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<ChainId>,
    pub validator_count: usize,
    pub connected_validators: usize,
    pub total_weight: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,
}

impl SubnetStats {
    /// Build stats from a validator list.
    pub fn from_validators(
        subnet_id: SubnetId,
        chain_id: Option<ChainId>,
        validators: &[ValidatorInfo],
        height: Option<u64>,
    ) -> Self {
        Self {
            subnet_id,
            chain_id,
            validator_count: validators.len(),
            connected_validators: validators.iter().filter(|v| v.connected).count(),
            total_weight: validators.iter().map(|v| v.weight).sum(),
            height,
        }
    }
}

/// Operations against a network's node.
///
/// Implementations decide their own timeout policy; callers never retry.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Make sure a node that can serve `network` is up.
    ///
    /// On the local network this starts (or reuses) a network running
    /// `runtime_version`; on public networks it checks the node has bootstrapped.
    async fn ensure_running(&self, network: Network, runtime_version: &SemVer) -> NodeResult<()>;

    /// Submit a signed transaction.
    async fn submit(&self, network: Network, tx: &SignedTransaction) -> NodeResult<TxReceipt>;

    /// Current validators of a subnet.
    async fn validators(
        &self,
        network: Network,
        subnet_id: &SubnetId,
    ) -> NodeResult<Vec<ValidatorInfo>>;

    /// Summary statistics of a subnet.
    async fn subnet_stats(
        &self,
        network: Network,
        subnet_id: &SubnetId,
        chain_id: Option<&ChainId>,
    ) -> NodeResult<SubnetStats>;
}
