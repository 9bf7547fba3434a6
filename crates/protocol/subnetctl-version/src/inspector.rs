//! Reading the protocol version a VM binary declares.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use regex::Regex;
use tokio::process::Command;

use crate::error::{VersionError, VersionResult};

/// Reports the protocol version of a VM binary.
#[async_trait]
pub trait VmInspector: Send + Sync {
    /// Protocol version declared by the binary at `binary`.
    async fn protocol_version(&self, binary: &Path) -> VersionResult<u32>;
}

/// Inspector that runs `<binary> --version` and parses `rpcchainvm=<n>`.
///
/// No timeout is applied; a hung binary hangs the caller.
#[derive(Debug, Clone, Default)]
pub struct ProcessInspector;

impl ProcessInspector {
    pub fn new() -> Self {
        Self
    }
}

/// Extract the protocol version from `--version` output.
pub fn parse_protocol_version(output: &str) -> Option<u32> {
    let re = Regex::new(r"rpcchainvm=(\d+)").ok()?;
    re.captures(output)?.get(1)?.as_str().parse().ok()
}

#[async_trait]
impl VmInspector for ProcessInspector {
    async fn protocol_version(&self, binary: &Path) -> VersionResult<u32> {
        let output = Command::new(binary)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| VersionError::unreadable(binary, format!("spawn failed: {}", e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VersionError::unreadable(
                binary,
                format!("{}: {}", output.status, stderr.trim()),
            ));
        }

        let version = parse_protocol_version(&stdout).ok_or_else(|| {
            VersionError::unreadable(
                binary,
                format!("no rpcchainvm version in output: {}", stdout.trim()),
            )
        })?;
        tracing::debug!(binary = %binary.display(), rpc_version = version, "Read VM protocol version");
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version_line() {
        let out = "Subnet-EVM/v0.5.11 [AvalancheGo=v1.10.9, rpcchainvm=28]";
        assert_eq!(parse_protocol_version(out), Some(28));
    }

    #[test]
    fn test_parse_without_marker() {
        assert_eq!(parse_protocol_version("myvm 1.0.0"), None);
    }

    #[tokio::test]
    async fn test_missing_binary_is_unreadable() {
        let err = ProcessInspector::new()
            .protocol_version(Path::new("/nonexistent/vm-binary"))
            .await
            .unwrap_err();
        assert!(matches!(err, VersionError::ArtifactUnreadable { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_script_binary() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("vm");
        std::fs::write(&path, "#!/bin/sh\necho 'myvm/v1.0.0 [rpcchainvm=31]'\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

        let version = ProcessInspector::new().protocol_version(&path).await.unwrap();
        assert_eq!(version, 31);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_binary_reports_stderr() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("vm");
        std::fs::write(&path, "#!/bin/sh\necho 'flag not supported' >&2\nexit 2\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

        let err = ProcessInspector::new().protocol_version(&path).await.unwrap_err();
        assert!(err.to_string().contains("flag not supported"));
    }
}
