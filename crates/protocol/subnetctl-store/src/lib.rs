//! Local storage layer for subnetctl.
//!
//! This crate persists everything the tool knows about its subnets:
//!
//! - **Sidecars** (JSON): identity, VM choice and per-network deployment state
//! - **Config bundles** (files): genesis, chain-config overlays, elastic side file
//! - **VM binaries** (files): custom VMs copied in at create time
//! - **Keys** (files): imported signing keys
//! - **Transaction files** (JSON): offline multisig artifacts at caller-chosen paths
//!
//! # Storage Layout
//!
//! ```text
//! ~/.subnetctl/
//! ├── config.toml                       # CLI configuration
//! ├── subnets/
//! │   └── {name}/
//! │       ├── genesis.json              # written first
//! │       ├── genesis_mainnet.json      # optional mainnet variant
//! │       ├── sidecar.json              # written after genesis and VM binary
//! │       ├── chain.json                # optional overlay, written after sidecar
//! │       ├── per-node-chain.json       # optional overlay, written after sidecar
//! │       └── elastic_subnet_config.json
//! ├── vms/
//! │   └── {name}                        # custom VM binaries
//! ├── keys/
//! │   └── {key}.key                     # base58 Ed25519 seeds
//! └── repos/
//!     └── {alias}/                      # published descriptor repositories
//! ```
//!
//! # Write Order
//!
//! A subnet exists exactly when its sidecar exists. Creation writes the
//! genesis and VM binary before the sidecar and overlays after it, so a
//! crash at any point leaves either no subnet or a complete one. Every file
//! is replaced atomically (see [`atomic`]).
//!
//! # Example
//!
//! ```no_run
//! use subnetctl_store::{SidecarStore, StoreLayout, SubnetState};
//! use subnetctl_types::{SemVer, Sidecar, Vm};
//!
//! let state = SubnetState::open(StoreLayout::new("/tmp/subnetctl")).expect("open");
//! let sidecar = Sidecar::new("sub1", Vm::SubnetEvm { version: SemVer::new(0, 5, 11) }, 26);
//! state.sidecars.save(&sidecar).expect("save");
//! assert!(state.sidecars.exists("sub1"));
//! ```

pub mod artifact;
pub mod atomic;
pub mod bundle;
pub mod error;
pub mod keys;
pub mod sidecar;
pub mod traits;

pub use error::{Result, StoreError};

pub use traits::{BundleFile, ConfigBundleStore, Keyring, SidecarStore, Signer};

pub use artifact::{load_artifact, save_artifact};
pub use atomic::{write_atomic, write_json_atomic};
pub use bundle::FsConfigBundleStore;
pub use keys::{FsKeyStore, KeyInfo, LocalSigner};
pub use sidecar::FsSidecarStore;

use std::path::{Path, PathBuf};

/// Get the default data directory.
///
/// Priority:
/// 1. `SUBNETCTL_DATA_DIR` environment variable (if set)
/// 2. Platform-specific data directory
/// 3. Fallback to `$HOME/.subnetctl`
pub fn default_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SUBNETCTL_DATA_DIR") {
        return PathBuf::from(dir);
    }

    directories::ProjectDirs::from("io", "subnetctl", "subnetctl")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| {
            std::env::var("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(".subnetctl")
        })
}

/// Directory layout of the store.
#[derive(Debug, Clone)]
pub struct StoreLayout {
    /// Base directory for all state.
    pub base_dir: PathBuf,
    /// Subnet directory (default: base_dir/subnets).
    pub subnets_dir: Option<PathBuf>,
    /// VM binary directory (default: base_dir/vms).
    pub vms_dir: Option<PathBuf>,
    /// Key directory (default: base_dir/keys).
    pub keys_dir: Option<PathBuf>,
    /// Descriptor repositories (default: base_dir/repos).
    pub repos_dir: Option<PathBuf>,
}

impl StoreLayout {
    /// Create a layout with the given base directory.
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            subnets_dir: None,
            vms_dir: None,
            keys_dir: None,
            repos_dir: None,
        }
    }

    /// Set the subnet directory.
    pub fn with_subnets_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.subnets_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the key directory.
    pub fn with_keys_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.keys_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the descriptor repository directory.
    pub fn with_repos_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.repos_dir = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn subnets_dir(&self) -> PathBuf {
        self.subnets_dir
            .clone()
            .unwrap_or_else(|| self.base_dir.join("subnets"))
    }

    pub fn vms_dir(&self) -> PathBuf {
        self.vms_dir
            .clone()
            .unwrap_or_else(|| self.base_dir.join("vms"))
    }

    pub fn keys_dir(&self) -> PathBuf {
        self.keys_dir
            .clone()
            .unwrap_or_else(|| self.base_dir.join("keys"))
    }

    pub fn repos_dir(&self) -> PathBuf {
        self.repos_dir
            .clone()
            .unwrap_or_else(|| self.base_dir.join("repos"))
    }
}

/// All storage components behind one handle.
pub struct SubnetState {
    /// Sidecar records.
    pub sidecars: FsSidecarStore,
    /// Genesis, overlays and VM binaries.
    pub bundles: FsConfigBundleStore,
    /// Imported signing keys.
    pub keys: FsKeyStore,
    layout: StoreLayout,
}

impl SubnetState {
    /// Open the store, creating directories as needed.
    pub fn open(layout: StoreLayout) -> Result<Self> {
        std::fs::create_dir_all(&layout.base_dir)?;
        tracing::info!(base_dir = %layout.base_dir.display(), "Opening subnet store");

        let sidecars = FsSidecarStore::new(layout.subnets_dir())?;
        let bundles = FsConfigBundleStore::new(layout.subnets_dir(), layout.vms_dir())?;
        let keys = FsKeyStore::new(layout.keys_dir())?;

        Ok(Self {
            sidecars,
            bundles,
            keys,
            layout,
        })
    }

    /// Get the layout used to open this state.
    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }
}
