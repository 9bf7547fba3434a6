//! Filesystem-backed sidecar storage.
//!
//! Each sidecar lives at `subnets/<name>/sidecar.json`, next to its config
//! bundle. The sidecar is the marker of a complete subnet: a directory that
//! holds bundle files but no sidecar is a create that never finished and is
//! reported as absent.

use std::fs;
use std::path::{Path, PathBuf};

use subnetctl_types::{validate_subnet_name, Sidecar};

use crate::atomic::write_json_atomic;
use crate::error::{Result, StoreError};
use crate::traits::SidecarStore;

/// Sidecar file name inside a subnet directory.
pub const SIDECAR_FILE: &str = "sidecar.json";

/// Sidecar store rooted at the `subnets/` directory.
#[derive(Debug, Clone)]
pub struct FsSidecarStore {
    subnets_dir: PathBuf,
}

impl FsSidecarStore {
    /// Create a sidecar store. The directory is created if missing.
    pub fn new(subnets_dir: impl AsRef<Path>) -> Result<Self> {
        let subnets_dir = subnets_dir.as_ref().to_path_buf();
        fs::create_dir_all(&subnets_dir)?;
        Ok(Self { subnets_dir })
    }

    fn sidecar_path(&self, name: &str) -> Result<PathBuf> {
        validate_subnet_name(name).map_err(|e| StoreError::invalid_data(e.to_string()))?;
        Ok(self.subnets_dir.join(name).join(SIDECAR_FILE))
    }
}

impl SidecarStore for FsSidecarStore {
    fn exists(&self, name: &str) -> bool {
        self.sidecar_path(name).map(|p| p.is_file()).unwrap_or(false)
    }

    fn load(&self, name: &str) -> Result<Sidecar> {
        let path = self.sidecar_path(name)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::SubnetNotFound(name.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let sidecar: Sidecar = serde_json::from_slice(&bytes)?;
        if sidecar.name != name {
            return Err(StoreError::invalid_data(format!(
                "sidecar at {} names subnet '{}'",
                path.display(),
                sidecar.name
            )));
        }
        Ok(sidecar)
    }

    fn save(&self, sidecar: &Sidecar) -> Result<()> {
        let path = self.sidecar_path(&sidecar.name)?;
        write_json_atomic(&path, sidecar)?;
        tracing::debug!(subnet = %sidecar.name, "Saved sidecar");
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<()> {
        let path = self.sidecar_path(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::SubnetNotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.subnets_dir)? {
            let entry = entry?;
            if entry.path().join(SIDECAR_FILE).is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
