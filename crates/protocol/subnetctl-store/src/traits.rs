//! Trait definitions for storage components.
//!
//! Implementations may vary (filesystem, in-memory) but must satisfy these
//! contracts. Readers never treat a missing file as default state: absence is
//! always reported as a not-found error.

use std::path::{Path, PathBuf};

use subnetctl_crypto::{Address, PublicKey, Signature};
use subnetctl_types::{Network, NetworkState, Sidecar};

use crate::error::{Result, StoreError};

// =============================================================================
// Sidecar Storage
// =============================================================================

/// Persistent record of every subnet, keyed by name.
pub trait SidecarStore {
    /// Check whether a sidecar exists for `name`.
    fn exists(&self, name: &str) -> bool;

    /// Load a sidecar. Fails with `SubnetNotFound` if absent.
    fn load(&self, name: &str) -> Result<Sidecar>;

    /// Atomically write a sidecar, replacing any previous version.
    fn save(&self, sidecar: &Sidecar) -> Result<()>;

    /// Delete a sidecar. Fails with `SubnetNotFound` if absent.
    fn delete(&self, name: &str) -> Result<()>;

    /// Names of all stored subnets, sorted.
    fn list(&self) -> Result<Vec<String>>;

    /// Record the deployment state of a subnet on a network.
    ///
    /// Fails with `AlreadyDeployed` if an entry exists, unless `force` is set.
    /// `force` is reserved for corrective admin operations.
    fn set_network_state(
        &self,
        name: &str,
        network: Network,
        state: NetworkState,
        force: bool,
    ) -> Result<Sidecar> {
        let mut sidecar = self.load(name)?;
        if sidecar.is_deployed(network) && !force {
            return Err(StoreError::AlreadyDeployed {
                subnet: name.to_string(),
                network,
            });
        }
        sidecar.networks.insert(network, state);
        self.save(&sidecar)?;
        Ok(sidecar)
    }

    /// Mutate an existing network entry in place.
    ///
    /// Fails with `NotDeployed` if the subnet has no entry for `network`. The
    /// sidecar is reloaded first, so changes made by other processes since the
    /// caller last read it are preserved.
    fn update_network_state(
        &self,
        name: &str,
        network: Network,
        update: &mut dyn FnMut(&mut NetworkState),
    ) -> Result<Sidecar> {
        let mut sidecar = self.load(name)?;
        let state = sidecar
            .networks
            .get_mut(&network)
            .ok_or_else(|| StoreError::NotDeployed {
                subnet: name.to_string(),
                network,
            })?;
        update(state);
        self.save(&sidecar)?;
        Ok(sidecar)
    }
}

// =============================================================================
// Config Bundle Storage
// =============================================================================

/// Files that make up a subnet's configuration bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleFile {
    Genesis,
    MainnetGenesis,
    ChainConfig,
    PerNodeChainConfig,
    ElasticConfig,
}

impl BundleFile {
    pub fn file_name(&self) -> &'static str {
        match self {
            BundleFile::Genesis => "genesis.json",
            BundleFile::MainnetGenesis => "genesis_mainnet.json",
            BundleFile::ChainConfig => "chain.json",
            BundleFile::PerNodeChainConfig => "per-node-chain.json",
            BundleFile::ElasticConfig => "elastic_subnet_config.json",
        }
    }
}

/// Genesis, chain-config overlays and VM binaries of each subnet.
pub trait ConfigBundleStore {
    /// Atomically write a bundle file. Returns its path.
    fn write(&self, subnet: &str, file: BundleFile, data: &[u8]) -> Result<PathBuf>;

    /// Read a bundle file. Fails with `BundleFileNotFound` if absent.
    fn read(&self, subnet: &str, file: BundleFile) -> Result<Vec<u8>>;

    /// Whether a bundle file exists.
    fn has(&self, subnet: &str, file: BundleFile) -> bool;

    /// Whether any part of the bundle exists (files or VM binary).
    fn exists(&self, subnet: &str) -> bool;

    /// Copy a VM binary into the store under `vm_name`. Returns its path.
    fn install_vm_binary(&self, vm_name: &str, source: &Path) -> Result<PathBuf>;

    /// Path where the VM binary for `vm_name` is stored.
    fn vm_binary_path(&self, vm_name: &str) -> PathBuf;

    /// Remove every bundle file, the bundle directory and the VM binary.
    ///
    /// Missing pieces are ignored.
    fn remove(&self, subnet: &str) -> Result<()>;
}

// =============================================================================
// Keys
// =============================================================================

/// Something that can sign on behalf of one address.
///
/// A local key file is one implementation; a hardware device is another.
pub trait Signer: Send + Sync {
    fn address(&self) -> Address;
    fn public_key(&self) -> PublicKey;
    fn sign(&self, payload: &[u8]) -> Signature;
}

/// Access to locally held signing keys.
pub trait Keyring: Send + Sync {
    /// Signer for `address`, if its key is held locally.
    fn signer_for(&self, address: &Address) -> Result<Option<Box<dyn Signer>>>;

    /// Signer for a named key. Fails with `KeyNotFound` if absent.
    fn signer_named(&self, name: &str) -> Result<Box<dyn Signer>>;
}
