//! Filesystem-backed config bundles and VM binaries.

use std::fs;
use std::path::{Path, PathBuf};

use subnetctl_types::validate_subnet_name;

use crate::atomic::{copy_atomic, write_atomic};
use crate::error::{Result, StoreError};
use crate::traits::{BundleFile, ConfigBundleStore};

const ALL_FILES: [BundleFile; 5] = [
    BundleFile::Genesis,
    BundleFile::MainnetGenesis,
    BundleFile::ChainConfig,
    BundleFile::PerNodeChainConfig,
    BundleFile::ElasticConfig,
];

/// Bundle store over `subnets/<name>/` plus `vms/<name>`.
#[derive(Debug, Clone)]
pub struct FsConfigBundleStore {
    subnets_dir: PathBuf,
    vms_dir: PathBuf,
}

impl FsConfigBundleStore {
    pub fn new(subnets_dir: impl AsRef<Path>, vms_dir: impl AsRef<Path>) -> Result<Self> {
        let subnets_dir = subnets_dir.as_ref().to_path_buf();
        let vms_dir = vms_dir.as_ref().to_path_buf();
        fs::create_dir_all(&subnets_dir)?;
        fs::create_dir_all(&vms_dir)?;
        Ok(Self {
            subnets_dir,
            vms_dir,
        })
    }

    fn file_path(&self, subnet: &str, file: BundleFile) -> Result<PathBuf> {
        validate_subnet_name(subnet).map_err(|e| StoreError::invalid_data(e.to_string()))?;
        Ok(self.subnets_dir.join(subnet).join(file.file_name()))
    }
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

impl ConfigBundleStore for FsConfigBundleStore {
    fn write(&self, subnet: &str, file: BundleFile, data: &[u8]) -> Result<PathBuf> {
        let path = self.file_path(subnet, file)?;
        write_atomic(&path, data)?;
        Ok(path)
    }

    fn read(&self, subnet: &str, file: BundleFile) -> Result<Vec<u8>> {
        let path = self.file_path(subnet, file)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::BundleFileNotFound {
                    subnet: subnet.to_string(),
                    file: file.file_name(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn has(&self, subnet: &str, file: BundleFile) -> bool {
        self.file_path(subnet, file)
            .map(|p| p.is_file())
            .unwrap_or(false)
    }

    fn exists(&self, subnet: &str) -> bool {
        ALL_FILES.iter().any(|f| self.has(subnet, *f)) || self.vm_binary_path(subnet).is_file()
    }

    fn install_vm_binary(&self, vm_name: &str, source: &Path) -> Result<PathBuf> {
        let dest = self.vm_binary_path(vm_name);
        copy_atomic(source, &dest)?;
        Ok(dest)
    }

    fn vm_binary_path(&self, vm_name: &str) -> PathBuf {
        self.vms_dir.join(vm_name)
    }

    fn remove(&self, subnet: &str) -> Result<()> {
        for file in ALL_FILES {
            remove_if_present(&self.file_path(subnet, file)?)?;
        }
        remove_if_present(&self.vm_binary_path(subnet))?;

        let dir = self.subnets_dir.join(subnet);
        match fs::remove_dir_all(&dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, FsConfigBundleStore) {
        let dir = TempDir::new().unwrap();
        let store =
            FsConfigBundleStore::new(dir.path().join("subnets"), dir.path().join("vms")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_write_read() {
        let (_dir, store) = store();
        store.write("sub1", BundleFile::Genesis, b"{\"config\":{}}").unwrap();
        assert!(store.has("sub1", BundleFile::Genesis));
        assert!(!store.has("sub1", BundleFile::ChainConfig));
        assert_eq!(
            store.read("sub1", BundleFile::Genesis).unwrap(),
            b"{\"config\":{}}"
        );
    }

    #[test]
    fn test_read_missing_overlay() {
        let (_dir, store) = store();
        let err = store.read("sub1", BundleFile::PerNodeChainConfig).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_remove_clears_everything() {
        let (dir, store) = store();
        store.write("sub1", BundleFile::Genesis, b"{}").unwrap();
        store.write("sub1", BundleFile::ElasticConfig, b"{}").unwrap();
        let src = dir.path().join("vm-bin");
        fs::write(&src, b"binary").unwrap();
        store.install_vm_binary("sub1", &src).unwrap();
        assert!(store.exists("sub1"));

        store.remove("sub1").unwrap();

        assert!(!store.exists("sub1"));
        assert!(!dir.path().join("subnets/sub1").exists());
        assert!(src.exists());
    }

    #[test]
    fn test_remove_missing_is_ok() {
        let (_dir, store) = store();
        store.remove("ghost").unwrap();
    }
}
