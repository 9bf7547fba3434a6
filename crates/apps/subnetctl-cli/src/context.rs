//! Subnet context for CLI operations.

use std::sync::Arc;

use subnetctl_node::{ControlPlane, JsonRpcControlPlane};
use subnetctl_ops::{Confirmer, OpsConfig, Publisher, RepoPublisher, SubnetOperations};
use subnetctl_store::{StoreLayout, SubnetState};
use subnetctl_version::{CompatibilityTable, ProcessInspector, VersionResolver, VmInspector};
use tracing::debug;

use crate::config::CliConfig;
use crate::error::CliResult;
use crate::prompt::TerminalConfirmer;

/// Context containing all initialized components.
pub struct SubnetContext {
    /// Operations interface.
    pub ops: SubnetOperations,
    /// Configuration.
    pub config: CliConfig,
}

/// Collaborators a context is built from.
///
/// `SubnetContext::open` fills these with the real implementations; tests
/// substitute mocks.
pub struct Collaborators {
    pub control_plane: Arc<dyn ControlPlane>,
    pub inspector: Arc<dyn VmInspector>,
    pub publisher: Arc<dyn Publisher>,
    pub confirmer: Arc<dyn Confirmer>,
}

impl SubnetContext {
    /// Open the store and connect the real collaborators.
    ///
    /// Nothing touches the network until an operation needs it.
    pub fn open(config: CliConfig) -> CliResult<Self> {
        let layout = StoreLayout::new(config.base_dir());
        let collaborators = Collaborators {
            control_plane: Arc::new(JsonRpcControlPlane::new(config.control_plane())?),
            inspector: Arc::new(ProcessInspector::new()),
            publisher: Arc::new(RepoPublisher::new(layout.repos_dir())),
            confirmer: Arc::new(TerminalConfirmer),
        };
        Self::with_collaborators(config, collaborators)
    }

    /// Open the store with the given collaborators.
    pub fn with_collaborators(config: CliConfig, parts: Collaborators) -> CliResult<Self> {
        let base_dir = config.base_dir();
        debug!(base_dir = %base_dir.display(), "Opening store");
        let state = SubnetState::open(StoreLayout::new(&base_dir))?;

        let table = match &config.versions.compatibility_file {
            Some(path) => {
                debug!(path = %path.display(), "Using compatibility table from file");
                CompatibilityTable::from_file(path)?
            }
            None => CompatibilityTable::embedded()?,
        };
        let resolver = VersionResolver::new(table, parts.inspector);

        let mut ops_config = OpsConfig::default();
        if let Some(key) = &config.keys.default_key {
            ops_config = ops_config.with_fee_key(key);
        }

        let ops = SubnetOperations::new(
            state,
            resolver,
            parts.control_plane,
            parts.publisher,
            parts.confirmer,
        )
        .with_config(ops_config);

        Ok(Self { ops, config })
    }

    /// Fee key for a command: the one named on the command line, else the configured default.
    pub fn fee_key(&self, key: Option<String>) -> Option<String> {
        key.or_else(|| self.config.keys.default_key.clone())
    }
}
