//! Version resolution.

use std::path::Path;
use std::sync::Arc;

use subnetctl_types::{SemVer, VersionRequest};

use crate::error::{VersionError, VersionResult};
use crate::inspector::VmInspector;
use crate::table::CompatibilityTable;

/// Outcome of resolving a VM version request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedVersions {
    pub vm_version: SemVer,
    pub rpc_version: u32,
    pub runtime_version: SemVer,
}

/// Picks compatible runtime versions and reads VM protocol versions.
#[derive(Clone)]
pub struct VersionResolver {
    table: CompatibilityTable,
    inspector: Arc<dyn VmInspector>,
}

impl VersionResolver {
    pub fn new(table: CompatibilityTable, inspector: Arc<dyn VmInspector>) -> Self {
        Self { table, inspector }
    }

    pub fn table(&self) -> &CompatibilityTable {
        &self.table
    }

    /// Resolve a VM version request to a compatible runtime version.
    ///
    /// `Latest` resolves to the newest VM release in the table. A pinned
    /// version with no mapping fails with `Incompatible`; there is no fallback
    /// to a nearby release.
    pub fn resolve_runtime_version(
        &self,
        request: VersionRequest,
    ) -> VersionResult<ResolvedVersions> {
        let vm_version = match request {
            VersionRequest::Latest => self
                .table
                .latest_vm()
                .ok_or_else(|| VersionError::incompatible("latest", "compatibility table is empty"))?,
            VersionRequest::Pinned(v) => v,
        };

        let rpc_version = self.table.vm_protocol(&vm_version).ok_or_else(|| {
            VersionError::incompatible(vm_version, "no mapping in compatibility table")
        })?;
        let runtime_version = self.runtime_for_rpc(rpc_version)?;

        tracing::debug!(
            vm = %vm_version,
            rpc_version,
            runtime = %runtime_version,
            "Resolved runtime version"
        );
        Ok(ResolvedVersions {
            vm_version,
            rpc_version,
            runtime_version,
        })
    }

    /// Newest runtime release supporting a protocol version.
    pub fn runtime_for_rpc(&self, rpc_version: u32) -> VersionResult<SemVer> {
        self.table
            .runtimes_for(rpc_version)
            .last()
            .copied()
            .ok_or_else(|| {
                VersionError::incompatible(
                    format!("rpcchainvm={}", rpc_version),
                    "no runtime release supports this protocol version",
                )
            })
    }

    /// Check that an operator-chosen runtime supports a protocol version.
    pub fn check_runtime(&self, runtime: &SemVer, rpc_version: u32) -> VersionResult<()> {
        match self.table.runtime_protocol(runtime) {
            Some(supported) if supported == rpc_version => Ok(()),
            Some(supported) => Err(VersionError::incompatible(
                runtime,
                format!(
                    "runtime speaks rpcchainvm={} but the VM needs {}",
                    supported, rpc_version
                ),
            )),
            None => Err(VersionError::incompatible(
                runtime,
                "runtime release not in compatibility table",
            )),
        }
    }

    /// Read the protocol version a VM binary declares.
    pub async fn extract_protocol_version(&self, binary: &Path) -> VersionResult<u32> {
        if !binary.is_file() {
            return Err(VersionError::unreadable(binary, "file does not exist"));
        }
        self.inspector.protocol_version(binary).await
    }
}
