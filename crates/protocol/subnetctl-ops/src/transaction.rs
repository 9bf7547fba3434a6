//! Offline multisig transactions.
//!
//! A transaction file moves through these states:
//!
//! ```text
//! proposed ──sign──► partially-signed ──sign──► ready-to-commit ──commit──► committed
//! ```
//!
//! Signing is re-entrant: the file can be signed on different machines, in
//! any order, across restarts. Every step rewrites the file atomically.
//!
//! # Sign
//!
//! 1. Reject committed or already complete files
//! 2. Reject signers outside the required authorizers
//! 3. Reject a second signature from the same authorizer
//! 4. Sign the canonical bytes, verify, and recompute the status
//!
//! # Commit
//!
//! 1. Re-verify every collected signature and count them against the threshold
//! 2. Check the file's signing policy against the subnet's control keys
//! 3. Re-check the subnet's state guards against a fresh sidecar
//! 4. Submit, record the result in the sidecar, mark the file committed

use std::path::Path;

use serde::Serialize;
use subnetctl_crypto::{address_from_public_key, verify};
use subnetctl_store::{load_artifact, save_artifact, Signer};
use subnetctl_types::{SignatureRecord, TransactionArtifact, TxPayload, TxStatus};
use tracing::info;

use crate::error::{OpsError, OpsResult};
use crate::subnet_ops::{deployed_state, SubnetOperations};

/// Result of committing a transaction file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitOutcome {
    pub tx_id: String,
    pub artifact: TransactionArtifact,
}

/// Add `signer`'s signature to an artifact in memory.
pub fn sign_artifact(artifact: &mut TransactionArtifact, signer: &dyn Signer) -> OpsResult<()> {
    match artifact.status {
        TxStatus::Committed => {
            return Err(OpsError::invalid_operation(
                "transaction has already been committed",
            ))
        }
        TxStatus::ReadyToCommit => {
            return Err(OpsError::invalid_operation(
                "transaction already has enough signatures; commit it",
            ))
        }
        TxStatus::Proposed | TxStatus::PartiallySigned => {}
    }

    let address = signer.address();
    if !artifact.required_authorizers.contains(&address) {
        return Err(OpsError::UnauthorizedSigner(address));
    }
    if artifact.has_signed(&address) {
        return Err(OpsError::AlreadySigned(address));
    }

    let bytes = artifact.signing_bytes()?;
    let signature = signer.sign(&bytes);
    let public_key = signer.public_key();
    if !verify(&public_key, &bytes, &signature) {
        return Err(OpsError::InvalidSignature(address));
    }

    artifact.signatures.insert(
        address,
        SignatureRecord {
            public_key,
            signature,
        },
    );
    artifact.refresh_status();
    Ok(())
}

/// Check every collected signature against the artifact's signing bytes.
pub fn verify_signatures(artifact: &TransactionArtifact) -> OpsResult<()> {
    let bytes = artifact.signing_bytes()?;
    for (address, record) in &artifact.signatures {
        let valid = address_from_public_key(&record.public_key) == *address
            && artifact.required_authorizers.contains(address)
            && verify(&record.public_key, &bytes, &record.signature);
        if !valid {
            return Err(OpsError::InvalidSignature(*address));
        }
    }
    Ok(())
}

impl SubnetOperations {
    /// Load a transaction file.
    pub fn load_transaction(&self, path: &Path) -> OpsResult<TransactionArtifact> {
        Ok(load_artifact(path)?)
    }

    /// Atomically write a transaction file.
    pub fn save_transaction(&self, path: &Path, artifact: &TransactionArtifact) -> OpsResult<()> {
        Ok(save_artifact(path, artifact)?)
    }

    /// Sign the transaction file at `path` and write it back.
    pub fn sign(&self, path: &Path, signer: &dyn Signer) -> OpsResult<TransactionArtifact> {
        let mut artifact = load_artifact(path)?;
        sign_artifact(&mut artifact, signer)?;
        save_artifact(path, &artifact)?;

        info!(
            subnet = %artifact.subnet,
            kind = %artifact.kind(),
            signer = %signer.address(),
            signatures = artifact.signatures.len(),
            threshold = artifact.threshold,
            status = %artifact.status,
            "Signed transaction"
        );
        Ok(artifact)
    }

    /// Sign with a named local key.
    pub fn sign_with_key(&self, path: &Path, key: &str) -> OpsResult<TransactionArtifact> {
        let signer = self.keyring().signer_named(key)?;
        self.sign(path, signer.as_ref())
    }

    /// Submit a fully signed transaction file and record its effect.
    pub async fn commit(&self, path: &Path) -> OpsResult<CommitOutcome> {
        let mut artifact = load_artifact(path)?;

        if artifact.status == TxStatus::Committed {
            return Err(OpsError::invalid_operation(format!(
                "transaction was already committed as {}",
                artifact.tx_id.as_deref().unwrap_or("unknown")
            )));
        }
        verify_signatures(&artifact)?;
        // The stored status is only a hint; count the verified signatures.
        let have = artifact.signatures.len();
        if artifact.threshold == 0
            || TxStatus::for_signatures(have, artifact.threshold) != TxStatus::ReadyToCommit
        {
            return Err(OpsError::InsufficientSignatures {
                have,
                need: artifact.threshold,
            });
        }
        self.check_commit_guards(&artifact)?;

        let receipt = self.submit_artifact(&artifact).await?;
        self.record_committed(&artifact, &receipt)?;

        artifact.status = TxStatus::Committed;
        artifact.tx_id = Some(receipt.tx_id.clone());
        save_artifact(path, &artifact)?;

        Ok(CommitOutcome {
            tx_id: receipt.tx_id,
            artifact,
        })
    }

    /// State guards, checked against a fresh sidecar since the file may have
    /// been signed long after it was proposed.
    fn check_commit_guards(&self, artifact: &TransactionArtifact) -> OpsResult<()> {
        let sidecar = self.load_deployed(&artifact.subnet, artifact.network)?;
        let state = deployed_state(&sidecar, artifact.network)?;

        if artifact.payload.subnet_id() != Some(&state.subnet_id) {
            return Err(OpsError::invalid_operation(format!(
                "transaction targets subnet {} but '{}' is recorded as {} on {}",
                artifact
                    .payload
                    .subnet_id()
                    .map(|id| id.to_string())
                    .unwrap_or_default(),
                artifact.subnet,
                state.subnet_id,
                artifact.network
            )));
        }

        if artifact.kind().needs_subnet_auth() {
            let outside_policy = artifact
                .required_authorizers
                .iter()
                .any(|address| !state.control_keys.contains(address));
            if artifact.threshold != state.threshold || outside_policy {
                return Err(OpsError::invalid_operation(format!(
                    "transaction's signing policy does not match the control keys of '{}' on {}",
                    artifact.subnet, artifact.network
                )));
            }
        }

        match &artifact.payload {
            TxPayload::CreateChain { .. } if !state.chain_pending() => Err(
                OpsError::invalid_operation("the subnet's chain has already been created"),
            ),
            TxPayload::TransformElastic { .. } if state.elastic => Err(OpsError::AlreadyElastic {
                subnet: artifact.subnet.clone(),
                network: artifact.network,
            }),
            TxPayload::AddValidator { node_id, .. } if state.validators.contains_key(node_id) => {
                Err(OpsError::AlreadyExists(format!("validator {}", node_id)))
            }
            _ => Ok(()),
        }
    }
}
