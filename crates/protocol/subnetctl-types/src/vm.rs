//! The VM a subnet runs.

use serde::{Deserialize, Serialize};

use crate::version::SemVer;

/// Closed set of VM kinds a subnet can be built on.
///
/// Each variant carries only what that kind needs; every branch point
/// (version resolution, config bundle shape) matches on it exhaustively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Vm {
    /// Operator-supplied binary, copied into the store. Its version is unknown;
    /// only the protocol version it reports is tracked.
    Custom,
    /// The standard EVM VM at a released version.
    SubnetEvm { version: SemVer },
    /// A VM registered by a publisher, identified by its published id.
    Registered { vm_id: String, version: String },
}

impl Vm {
    /// Version string as shown to operators. Empty for custom VMs.
    pub fn version_label(&self) -> String {
        match self {
            Vm::Custom => String::new(),
            Vm::SubnetEvm { version } => version.to_string(),
            Vm::Registered { version, .. } => version.clone(),
        }
    }

    /// Short kind name.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Vm::Custom => "custom",
            Vm::SubnetEvm { .. } => "subnet-evm",
            Vm::Registered { .. } => "registered",
        }
    }

    /// Whether the subnet's VM binary lives in the local store.
    pub fn has_local_binary(&self) -> bool {
        matches!(self, Vm::Custom)
    }
}
