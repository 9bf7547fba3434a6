//! Key files and local signers.
//!
//! A key file holds the base58-encoded 32-byte Ed25519 seed of one key.
//! Keys are imported from files created elsewhere; this store never generates
//! key material.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use subnetctl_crypto::{
    address_from_public_key, local_network_key, private_key_from_base58, public_key_from_private,
    sign, Address, PrivateKey, PublicKey, Signature,
};

use crate::atomic::write_atomic;
use crate::error::{Result, StoreError};
use crate::traits::{Keyring, Signer};

/// Key file extension.
pub const KEY_FILE_EXTENSION: &str = "key";

/// A signer backed by a private key held in memory.
pub struct LocalSigner {
    private_key: PrivateKey,
    public_key: PublicKey,
}

impl LocalSigner {
    pub fn new(private_key: PrivateKey) -> Self {
        let public_key = public_key_from_private(&private_key);
        Self {
            private_key,
            public_key,
        }
    }

    /// Signer for the pre-funded local network key.
    pub fn local_network() -> Self {
        Self::new(local_network_key())
    }
}

impl Signer for LocalSigner {
    fn address(&self) -> Address {
        address_from_public_key(&self.public_key)
    }

    fn public_key(&self) -> PublicKey {
        self.public_key
    }

    fn sign(&self, payload: &[u8]) -> Signature {
        sign(&self.private_key, payload)
    }
}

/// Summary of a stored key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyInfo {
    pub name: String,
    pub address: Address,
}

fn validate_key_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::invalid_data(format!("invalid key name '{}'", name)))
    }
}

/// Key store rooted at the `keys/` directory.
#[derive(Debug, Clone)]
pub struct FsKeyStore {
    keys_dir: PathBuf,
}

impl FsKeyStore {
    /// Create a key store. The directory is created if missing.
    pub fn new(keys_dir: impl AsRef<Path>) -> Result<Self> {
        let keys_dir = keys_dir.as_ref().to_path_buf();
        fs::create_dir_all(&keys_dir)?;
        Ok(Self { keys_dir })
    }

    fn key_path(&self, name: &str) -> Result<PathBuf> {
        validate_key_name(name)?;
        Ok(self
            .keys_dir
            .join(format!("{}.{}", name, KEY_FILE_EXTENSION)))
    }

    /// Whether a key with this name exists.
    pub fn exists(&self, name: &str) -> bool {
        self.key_path(name).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Import a key file under `name`.
    ///
    /// The source is validated before anything is written. Fails with
    /// `AlreadyExists` if the name is taken and `force` is not set.
    pub fn import(&self, name: &str, source: &Path, force: bool) -> Result<KeyInfo> {
        let dest = self.key_path(name)?;
        if dest.exists() && !force {
            return Err(StoreError::AlreadyExists(format!("key {}", name)));
        }

        let contents = fs::read_to_string(source)?;
        let private_key = private_key_from_base58(&contents)?;
        let address = LocalSigner::new(private_key).address();

        let mut normalized = contents.trim().to_string();
        normalized.push('\n');
        write_atomic(&dest, normalized.as_bytes())?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&dest, fs::Permissions::from_mode(0o600))?;
        }

        tracing::info!(key = name, address = %address, "Imported key");
        Ok(KeyInfo {
            name: name.to_string(),
            address,
        })
    }

    /// Load a key as a signer.
    pub fn load(&self, name: &str) -> Result<LocalSigner> {
        let path = self.key_path(name)?;
        let contents = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::KeyNotFound(name.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(LocalSigner::new(private_key_from_base58(&contents)?))
    }

    /// Delete a key file.
    pub fn delete(&self, name: &str) -> Result<()> {
        let path = self.key_path(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::KeyNotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// All stored keys, sorted by name. Unreadable files are skipped with a warning.
    pub fn list(&self) -> Result<Vec<KeyInfo>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.keys_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(KEY_FILE_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match self.load(name) {
                Ok(signer) => keys.push(KeyInfo {
                    name: name.to_string(),
                    address: signer.address(),
                }),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable key file"),
            }
        }
        keys.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(keys)
    }
}

impl Keyring for FsKeyStore {
    fn signer_for(&self, address: &Address) -> Result<Option<Box<dyn Signer>>> {
        for info in self.list()? {
            if &info.address == address {
                return Ok(Some(Box::new(self.load(&info.name)?)));
            }
        }
        Ok(None)
    }

    fn signer_named(&self, name: &str) -> Result<Box<dyn Signer>> {
        Ok(Box::new(self.load(name)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use subnetctl_crypto::{generate_keypair, private_key_to_base58, verify};
    use tempfile::TempDir;

    fn write_key_file(dir: &Path, file: &str) -> (PathBuf, Address) {
        let (private_key, public_key) = generate_keypair();
        let path = dir.join(file);
        fs::write(&path, format!("{}\n", private_key_to_base58(&private_key))).unwrap();
        (path, address_from_public_key(&public_key))
    }

    #[test]
    fn test_import_and_load() {
        let dir = TempDir::new().unwrap();
        let keys = FsKeyStore::new(dir.path().join("keys")).unwrap();
        let (src, address) = write_key_file(dir.path(), "alice.pk");

        let info = keys.import("alice", &src, false).unwrap();
        assert_eq!(info.address, address);

        let signer = keys.load("alice").unwrap();
        let sig = signer.sign(b"payload");
        assert!(verify(&signer.public_key(), b"payload", &sig));
    }

    #[test]
    fn test_import_existing_requires_force() {
        let dir = TempDir::new().unwrap();
        let keys = FsKeyStore::new(dir.path().join("keys")).unwrap();
        let (src, _) = write_key_file(dir.path(), "a.pk");
        let (other, other_addr) = write_key_file(dir.path(), "b.pk");

        keys.import("ops", &src, false).unwrap();
        assert!(matches!(
            keys.import("ops", &other, false),
            Err(StoreError::AlreadyExists(_))
        ));
        assert_eq!(keys.import("ops", &other, true).unwrap().address, other_addr);
    }

    #[test]
    fn test_import_rejects_garbage_without_writing() {
        let dir = TempDir::new().unwrap();
        let keys = FsKeyStore::new(dir.path().join("keys")).unwrap();
        let src = dir.path().join("bad.pk");
        fs::write(&src, "not a key 0OIl").unwrap();

        assert!(keys.import("bad", &src, false).is_err());
        assert!(!keys.exists("bad"));
    }

    #[test]
    fn test_signer_for_address() {
        let dir = TempDir::new().unwrap();
        let keys = FsKeyStore::new(dir.path().join("keys")).unwrap();
        let (src, address) = write_key_file(dir.path(), "k.pk");
        keys.import("k", &src, false).unwrap();

        let signer = keys.signer_for(&address).unwrap().unwrap();
        assert_eq!(signer.address(), address);

        let (_, stranger) = generate_keypair();
        assert!(keys
            .signer_for(&address_from_public_key(&stranger))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_delete_and_list() {
        let dir = TempDir::new().unwrap();
        let keys = FsKeyStore::new(dir.path().join("keys")).unwrap();
        let (a, _) = write_key_file(dir.path(), "a.pk");
        let (b, _) = write_key_file(dir.path(), "b.pk");
        keys.import("beta", &b, false).unwrap();
        keys.import("alpha", &a, false).unwrap();

        let names: Vec<_> = keys.list().unwrap().into_iter().map(|k| k.name).collect();
        assert_eq!(names, vec!["alpha", "beta"]);

        keys.delete("alpha").unwrap();
        assert!(matches!(keys.delete("alpha"), Err(StoreError::KeyNotFound(_))));
        assert_eq!(keys.list().unwrap().len(), 1);
    }
}
