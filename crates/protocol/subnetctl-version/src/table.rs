//! The VM/runtime compatibility table.
//!
//! ```json
//! {
//!   "vm":      { "v0.5.11": 28 },
//!   "runtime": { "28": ["v1.10.9", "v1.10.10"] }
//! }
//! ```
//!
//! `vm` maps each VM release to the protocol version it speaks; `runtime`
//! lists the node runtime releases that support each protocol version.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use subnetctl_types::SemVer;

use crate::error::{VersionError, VersionResult};

const EMBEDDED_TABLE: &str = include_str!("../compatibility.json");

/// Mapping between VM releases, protocol versions and runtime releases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityTable {
    vm: BTreeMap<SemVer, u32>,
    runtime: BTreeMap<u32, Vec<SemVer>>,
}

impl CompatibilityTable {
    /// The table shipped with this build.
    pub fn embedded() -> VersionResult<Self> {
        Self::from_json(EMBEDDED_TABLE)
    }

    /// Parse a table from JSON.
    pub fn from_json(json: &str) -> VersionResult<Self> {
        let table: Self =
            serde_json::from_str(json).map_err(|e| VersionError::InvalidTable(e.to_string()))?;
        if table.vm.is_empty() {
            return Err(VersionError::InvalidTable("no VM versions listed".to_string()));
        }
        Ok(table)
    }

    /// Load a table from a file, e.g. a cached copy of a published table.
    pub fn from_file(path: &Path) -> VersionResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Protocol version a VM release speaks.
    pub fn vm_protocol(&self, vm_version: &SemVer) -> Option<u32> {
        self.vm.get(vm_version).copied()
    }

    /// Newest VM release in the table.
    pub fn latest_vm(&self) -> Option<SemVer> {
        self.vm.keys().next_back().copied()
    }

    /// Runtime releases supporting a protocol version, oldest first.
    pub fn runtimes_for(&self, rpc_version: u32) -> Vec<SemVer> {
        let mut versions = self.runtime.get(&rpc_version).cloned().unwrap_or_default();
        versions.sort();
        versions
    }

    /// Protocol version a runtime release supports.
    pub fn runtime_protocol(&self, runtime: &SemVer) -> Option<u32> {
        self.runtime
            .iter()
            .find(|(_, versions)| versions.contains(runtime))
            .map(|(rpc, _)| *rpc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_table_parses() {
        let table = CompatibilityTable::embedded().unwrap();
        assert!(table.latest_vm().is_some());
    }

    #[test]
    fn test_latest_vm_uses_semver_order() {
        let table = CompatibilityTable::from_json(
            r#"{"vm": {"v0.5.9": 27, "v0.5.10": 28}, "runtime": {}}"#,
        )
        .unwrap();
        assert_eq!(table.latest_vm(), Some(SemVer::new(0, 5, 10)));
    }

    #[test]
    fn test_runtime_lookup_both_ways() {
        let table = CompatibilityTable::from_json(
            r#"{"vm": {"v0.5.11": 28}, "runtime": {"28": ["v1.10.10", "v1.10.9"]}}"#,
        )
        .unwrap();
        assert_eq!(
            table.runtimes_for(28),
            vec![SemVer::new(1, 10, 9), SemVer::new(1, 10, 10)]
        );
        assert_eq!(table.runtime_protocol(&SemVer::new(1, 10, 9)), Some(28));
        assert_eq!(table.runtime_protocol(&SemVer::new(1, 9, 0)), None);
    }

    #[test]
    fn test_empty_table_rejected() {
        let err = CompatibilityTable::from_json(r#"{"vm": {}, "runtime": {}}"#).unwrap_err();
        assert!(matches!(err, VersionError::InvalidTable(_)));
    }
}
