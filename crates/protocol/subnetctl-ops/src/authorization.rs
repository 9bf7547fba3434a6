//! Control-key policy and the online/offline branch.
//!
//! A subnet is controlled by `threshold`-of-`control_keys`. Subnet-changing
//! transactions name exactly `threshold` of those keys as authorizers. When
//! that is a single key held on this machine, the operation is signed and
//! submitted immediately (online). Otherwise a transaction file is written
//! for the authorizers to sign out of band (offline).

use std::collections::BTreeSet;

use subnetctl_crypto::Address;
use subnetctl_store::{Keyring, LocalSigner, Signer};
use subnetctl_types::NetworkState;

use crate::error::{OpsError, OpsResult};

/// How an operation's transaction gets its signatures.
pub enum SigningPath {
    /// One authorizer whose key is local: sign and submit now.
    Online(Box<dyn Signer>),
    /// Write a transaction file for out-of-band signing.
    Offline,
}

impl SigningPath {
    pub fn is_online(&self) -> bool {
        matches!(self, SigningPath::Online(_))
    }
}

/// Check a control-key policy for a new subnet.
pub fn validate_control_policy(control_keys: &[Address], threshold: u32) -> OpsResult<()> {
    if control_keys.is_empty() {
        return Err(OpsError::invalid_operation("at least one control key is required"));
    }
    let distinct: BTreeSet<&Address> = control_keys.iter().collect();
    if distinct.len() != control_keys.len() {
        return Err(OpsError::invalid_operation("control keys contain duplicates"));
    }
    if threshold == 0 || threshold as usize > control_keys.len() {
        return Err(OpsError::invalid_operation(format!(
            "threshold {} must be between 1 and the number of control keys ({})",
            threshold,
            control_keys.len()
        )));
    }
    Ok(())
}

/// Authorizers for a subnet-changing transaction.
///
/// `chosen` picks which control keys sign. It may be empty when every control
/// key is needed anyway (threshold equals the key count).
pub fn required_authorizers(
    state: &NetworkState,
    chosen: &[Address],
) -> OpsResult<BTreeSet<Address>> {
    let threshold = state.threshold as usize;

    if chosen.is_empty() {
        if threshold == 0 || state.control_keys.len() != threshold {
            return Err(OpsError::invalid_operation(format!(
                "subnet has {} control keys with threshold {}; choose which keys authorize",
                state.control_keys.len(),
                state.threshold
            )));
        }
        return Ok(state.control_keys.iter().copied().collect());
    }

    let set: BTreeSet<Address> = chosen.iter().copied().collect();
    if let Some(outsider) = set.iter().find(|a| !state.control_keys.contains(a)) {
        return Err(OpsError::invalid_operation(format!(
            "{} is not a control key of the subnet",
            outsider
        )));
    }
    if set.len() != threshold {
        return Err(OpsError::invalid_operation(format!(
            "{} distinct authorizers given but the threshold is {}",
            set.len(),
            state.threshold
        )));
    }
    Ok(set)
}

/// Signer for an address, if its key is available on this machine.
///
/// The local network key is always available.
pub fn signer_for(keyring: &dyn Keyring, address: &Address) -> OpsResult<Option<Box<dyn Signer>>> {
    let local = LocalSigner::local_network();
    if local.address() == *address {
        return Ok(Some(Box::new(local)));
    }
    Ok(keyring.signer_for(address)?)
}

/// Apply the branch rule.
pub fn choose_signing_path(
    keyring: &dyn Keyring,
    authorizers: &BTreeSet<Address>,
    threshold: u32,
) -> OpsResult<SigningPath> {
    if threshold == 1 && authorizers.len() == 1 {
        if let Some(address) = authorizers.iter().next() {
            if let Some(signer) = signer_for(keyring, address)? {
                return Ok(SigningPath::Online(signer));
            }
        }
    }
    Ok(SigningPath::Offline)
}
