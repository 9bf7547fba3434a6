//! Mock implementation of the `ControlPlane` trait for testing.
//!
//! Records every submission and keeps a validator set per subnet that
//! follows the validator transactions it accepts.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use subnetctl_node::{ControlPlane, NodeError, NodeResult, SubnetStats, TxReceipt, ValidatorInfo};
use subnetctl_types::{
    ChainId, Network, SemVer, SignedTransaction, SubnetId, TxKind, TxPayload,
};

struct MockControlPlaneInner {
    /// Every accepted submission, with the network it reached.
    submissions: Vec<(Network, SignedTransaction)>,
    /// Every `ensure_running` call.
    started: Vec<(Network, SemVer)>,
    /// Validators per subnet.
    validators: HashMap<SubnetId, Vec<ValidatorInfo>>,
    /// When true, every call fails.
    should_fail: bool,
    /// Transaction kinds that fail even when `should_fail` is off.
    failing_kinds: HashSet<TxKind>,
    /// Auto-incrementing id counter.
    counter: u64,
}

/// A mock implementation of the `ControlPlane` trait for testing.
///
/// Uses `Arc<RwLock<...>>` internally, so it is cheap to clone and all
/// clones share the same state.
#[derive(Clone)]
pub struct MockControlPlane {
    inner: Arc<RwLock<MockControlPlaneInner>>,
}

impl Default for MockControlPlane {
    fn default() -> Self {
        Self::new()
    }
}

impl MockControlPlane {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MockControlPlaneInner {
                submissions: Vec::new(),
                started: Vec::new(),
                validators: HashMap::new(),
                should_fail: false,
                failing_kinds: HashSet::new(),
                counter: 0,
            })),
        }
    }

    /// Configure the mock to fail all operations.
    pub fn with_failure(self) -> Self {
        self.inner.write().unwrap().should_fail = true;
        self
    }

    /// Set the failure mode at runtime.
    pub fn set_should_fail(&self, should_fail: bool) {
        self.inner.write().unwrap().should_fail = should_fail;
    }

    /// Reject submissions of one transaction kind.
    pub fn fail_kind(&self, kind: TxKind) {
        self.inner.write().unwrap().failing_kinds.insert(kind);
    }

    /// Seed the validator set the network reports for a subnet.
    pub fn set_validators(&self, subnet_id: SubnetId, validators: Vec<ValidatorInfo>) {
        self.inner
            .write()
            .unwrap()
            .validators
            .insert(subnet_id, validators);
    }

    // =========================================================================
    // Assertion Helpers
    // =========================================================================

    /// All accepted submissions.
    pub fn submissions(&self) -> Vec<(Network, SignedTransaction)> {
        self.inner.read().unwrap().submissions.clone()
    }

    /// Kinds of all accepted submissions, in order.
    pub fn submitted_kinds(&self) -> Vec<TxKind> {
        self.inner
            .read()
            .unwrap()
            .submissions
            .iter()
            .map(|(_, tx)| tx.payload.kind())
            .collect()
    }

    /// Networks passed to `ensure_running`.
    pub fn started(&self) -> Vec<(Network, SemVer)> {
        self.inner.read().unwrap().started.clone()
    }

    pub fn submission_count(&self) -> usize {
        self.inner.read().unwrap().submissions.len()
    }

    fn failure(method: &str) -> NodeError {
        NodeError::Rpc {
            method: method.to_string(),
            code: -32000,
            message: "mock: configured to fail".to_string(),
            diagnostics: Some("mock node log: rejected".to_string()),
        }
    }

    fn apply(inner: &mut MockControlPlaneInner, payload: &TxPayload) {
        match payload {
            TxPayload::AddValidator {
                subnet_id,
                node_id,
                weight,
                start_time,
                end_time,
            } => inner
                .validators
                .entry(subnet_id.clone())
                .or_default()
                .push(ValidatorInfo {
                    node_id: node_id.clone(),
                    weight: *weight,
                    start_time: *start_time,
                    end_time: *end_time,
                    stake_amount: None,
                    connected: true,
                    uptime: None,
                }),
            TxPayload::AddPermissionlessValidator {
                subnet_id,
                node_id,
                stake_amount,
                start_time,
                end_time,
            } => inner
                .validators
                .entry(subnet_id.clone())
                .or_default()
                .push(ValidatorInfo {
                    node_id: node_id.clone(),
                    weight: *stake_amount,
                    start_time: *start_time,
                    end_time: *end_time,
                    stake_amount: Some(*stake_amount),
                    connected: true,
                    uptime: None,
                }),
            TxPayload::RemoveValidator { subnet_id, node_id } => {
                if let Some(list) = inner.validators.get_mut(subnet_id) {
                    list.retain(|v| v.node_id != *node_id);
                }
            }
            _ => {}
        }
    }
}

#[async_trait]
impl ControlPlane for MockControlPlane {
    async fn ensure_running(&self, network: Network, runtime_version: &SemVer) -> NodeResult<()> {
        let mut inner = self.inner.write().unwrap();
        if inner.should_fail {
            return Err(NodeError::NotReady("mock: configured to fail".to_string()));
        }
        inner.started.push((network, *runtime_version));
        Ok(())
    }

    async fn submit(&self, network: Network, tx: &SignedTransaction) -> NodeResult<TxReceipt> {
        let mut inner = self.inner.write().unwrap();
        let kind = tx.payload.kind();
        if inner.should_fail || inner.failing_kinds.contains(&kind) {
            return Err(Self::failure("platform.issueSignedTx"));
        }

        inner.counter += 1;
        let n = inner.counter;
        let created_id = match kind {
            TxKind::CreateSubnet => Some(format!("subnet-{}", n)),
            TxKind::CreateChain => Some(format!("chain-{}", n)),
            TxKind::TransformElastic => Some(format!("asset-{}", n)),
            _ => None,
        };
        Self::apply(&mut inner, &tx.payload);
        inner.submissions.push((network, tx.clone()));

        Ok(TxReceipt {
            tx_id: format!("tx-{}", n),
            created_id,
        })
    }

    async fn validators(
        &self,
        _network: Network,
        subnet_id: &SubnetId,
    ) -> NodeResult<Vec<ValidatorInfo>> {
        let inner = self.inner.read().unwrap();
        if inner.should_fail {
            return Err(Self::failure("platform.getCurrentValidators"));
        }
        Ok(inner.validators.get(subnet_id).cloned().unwrap_or_default())
    }

    async fn subnet_stats(
        &self,
        network: Network,
        subnet_id: &SubnetId,
        chain_id: Option<&ChainId>,
    ) -> NodeResult<SubnetStats> {
        let validators = self.validators(network, subnet_id).await?;
        Ok(SubnetStats::from_validators(
            subnet_id.clone(),
            chain_id.cloned(),
            &validators,
            Some(42),
        ))
    }
}
