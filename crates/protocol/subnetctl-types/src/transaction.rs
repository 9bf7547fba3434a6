//! Transaction payloads and the offline multisig artifact.
//!
//! A [`TransactionArtifact`] is a self-contained file: it carries the payload,
//! the signing policy and every signature collected so far, so it can travel to
//! air-gapped signers and back.
//!
//! # Status Progression
//!
//! ```text
//! Proposed ──sign──► PartiallySigned ──sign (k-th)──► ReadyToCommit ──commit──► Committed
//!     └────────────────────sign (k = 1)───────────────────┘
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use subnetctl_crypto::{Address, PublicKey, Signature};

use crate::constants::ARTIFACT_FORMAT_VERSION;
use crate::error::{Result, TypesError};
use crate::network::{Network, NetworkSelection};
use crate::sidecar::{ElasticConfig, NodeId, SubnetId};
use crate::Timestamp;

/// Kind of a transaction payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxKind {
    CreateSubnet,
    CreateChain,
    AddValidator,
    RemoveValidator,
    TransformElastic,
    AddPermissionlessValidator,
    AddPermissionlessDelegator,
}

impl TxKind {
    /// Whether the subnet's control keys must authorize this kind.
    ///
    /// The remaining kinds are paid and signed by a single staker or fee key.
    pub fn needs_subnet_auth(&self) -> bool {
        matches!(
            self,
            TxKind::CreateChain
                | TxKind::AddValidator
                | TxKind::RemoveValidator
                | TxKind::TransformElastic
        )
    }
}

impl std::fmt::Display for TxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TxKind::CreateSubnet => "create-subnet",
            TxKind::CreateChain => "chain-creation",
            TxKind::AddValidator => "add-validator",
            TxKind::RemoveValidator => "remove-validator",
            TxKind::TransformElastic => "transform-elastic",
            TxKind::AddPermissionlessValidator => "add-permissionless-validator",
            TxKind::AddPermissionlessDelegator => "add-permissionless-delegator",
        };
        f.write_str(s)
    }
}

/// The operation a transaction performs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TxPayload {
    CreateSubnet {
        control_keys: Vec<Address>,
        threshold: u32,
    },
    CreateChain {
        subnet_id: SubnetId,
        chain_name: String,
        vm_id: String,
        #[serde(with = "base58_bytes")]
        genesis: Vec<u8>,
    },
    AddValidator {
        subnet_id: SubnetId,
        node_id: NodeId,
        weight: u64,
        start_time: u64,
        end_time: u64,
    },
    RemoveValidator {
        subnet_id: SubnetId,
        node_id: NodeId,
    },
    TransformElastic {
        subnet_id: SubnetId,
        config: ElasticConfig,
    },
    AddPermissionlessValidator {
        subnet_id: SubnetId,
        node_id: NodeId,
        stake_amount: u64,
        start_time: u64,
        end_time: u64,
    },
    AddPermissionlessDelegator {
        subnet_id: SubnetId,
        node_id: NodeId,
        stake_amount: u64,
        start_time: u64,
        end_time: u64,
    },
}

impl TxPayload {
    pub fn kind(&self) -> TxKind {
        match self {
            TxPayload::CreateSubnet { .. } => TxKind::CreateSubnet,
            TxPayload::CreateChain { .. } => TxKind::CreateChain,
            TxPayload::AddValidator { .. } => TxKind::AddValidator,
            TxPayload::RemoveValidator { .. } => TxKind::RemoveValidator,
            TxPayload::TransformElastic { .. } => TxKind::TransformElastic,
            TxPayload::AddPermissionlessValidator { .. } => TxKind::AddPermissionlessValidator,
            TxPayload::AddPermissionlessDelegator { .. } => TxKind::AddPermissionlessDelegator,
        }
    }

    /// The subnet the payload acts on. `None` only for subnet creation.
    pub fn subnet_id(&self) -> Option<&SubnetId> {
        match self {
            TxPayload::CreateSubnet { .. } => None,
            TxPayload::CreateChain { subnet_id, .. }
            | TxPayload::AddValidator { subnet_id, .. }
            | TxPayload::RemoveValidator { subnet_id, .. }
            | TxPayload::TransformElastic { subnet_id, .. }
            | TxPayload::AddPermissionlessValidator { subnet_id, .. }
            | TxPayload::AddPermissionlessDelegator { subnet_id, .. } => Some(subnet_id),
        }
    }

    /// Canonical bytes signers commit to when signing this payload directly.
    pub fn signing_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| TypesError::Encoding(e.to_string()))
    }
}

/// A signature together with the key that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRecord {
    pub public_key: PublicKey,
    pub signature: Signature,
}

/// A payload with its signatures, ready for submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub payload: TxPayload,
    pub signatures: BTreeMap<Address, SignatureRecord>,
}

/// Progress of an offline transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
    Proposed,
    PartiallySigned,
    ReadyToCommit,
    Committed,
}

impl TxStatus {
    /// Status implied by a signature count under a threshold.
    pub fn for_signatures(count: usize, threshold: u32) -> Self {
        if count >= threshold as usize {
            TxStatus::ReadyToCommit
        } else if count == 0 {
            TxStatus::Proposed
        } else {
            TxStatus::PartiallySigned
        }
    }
}

impl std::fmt::Display for TxStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TxStatus::Proposed => "proposed",
            TxStatus::PartiallySigned => "partially-signed",
            TxStatus::ReadyToCommit => "ready-to-commit",
            TxStatus::Committed => "committed",
        };
        f.write_str(s)
    }
}

/// A transaction awaiting (or done with) out-of-band signatures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionArtifact {
    pub format_version: u32,
    /// Local subnet name the transaction belongs to.
    pub subnet: String,
    /// Network the resulting state is recorded under.
    pub network: Network,
    /// Submit to the local network instead of `network`.
    #[serde(default)]
    pub simulate_public: bool,
    pub payload: TxPayload,
    pub required_authorizers: BTreeSet<Address>,
    pub threshold: u32,
    #[serde(default)]
    pub signatures: BTreeMap<Address, SignatureRecord>,
    pub status: TxStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,
    pub created_at: Timestamp,
}

/// The part of an artifact signers commit to. Signatures and status are excluded.
#[derive(Serialize)]
struct SigningView<'a> {
    format_version: u32,
    subnet: &'a str,
    network: Network,
    payload: &'a TxPayload,
    required_authorizers: &'a BTreeSet<Address>,
    threshold: u32,
}

impl TransactionArtifact {
    /// Create a proposed artifact with no signatures.
    pub fn new(
        subnet: impl Into<String>,
        selection: NetworkSelection,
        payload: TxPayload,
        required_authorizers: BTreeSet<Address>,
        threshold: u32,
        created_at: Timestamp,
    ) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            subnet: subnet.into(),
            network: selection.target,
            simulate_public: selection.simulate_public,
            payload,
            required_authorizers,
            threshold,
            signatures: BTreeMap::new(),
            status: TxStatus::Proposed,
            tx_id: None,
            created_at,
        }
    }

    pub fn kind(&self) -> TxKind {
        self.payload.kind()
    }

    pub fn selection(&self) -> NetworkSelection {
        NetworkSelection::simulated(self.network, self.simulate_public)
    }

    /// Canonical bytes every authorizer signs.
    pub fn signing_bytes(&self) -> Result<Vec<u8>> {
        let view = SigningView {
            format_version: self.format_version,
            subnet: &self.subnet,
            network: self.network,
            payload: &self.payload,
            required_authorizers: &self.required_authorizers,
            threshold: self.threshold,
        };
        serde_json::to_vec(&view).map_err(|e| TypesError::Encoding(e.to_string()))
    }

    pub fn has_signed(&self, address: &Address) -> bool {
        self.signatures.contains_key(address)
    }

    /// Authorizers that have not signed yet.
    pub fn pending_signers(&self) -> Vec<Address> {
        self.required_authorizers
            .iter()
            .filter(|a| !self.signatures.contains_key(a))
            .copied()
            .collect()
    }

    /// Recompute status from the collected signatures. Committed is terminal.
    pub fn refresh_status(&mut self) {
        if self.status != TxStatus::Committed {
            self.status = TxStatus::for_signatures(self.signatures.len(), self.threshold);
        }
    }

    /// Bundle the payload and signatures for submission.
    pub fn to_signed_transaction(&self) -> SignedTransaction {
        SignedTransaction {
            payload: self.payload.clone(),
            signatures: self.signatures.clone(),
        }
    }
}

mod base58_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&bs58::encode(bytes).into_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        bs58::decode(s)
            .into_vec()
            .map_err(serde::de::Error::custom)
    }
}
