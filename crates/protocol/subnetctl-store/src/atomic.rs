//! Crash-safe file replacement.
//!
//! Every persisted file goes through [`write_atomic`]: the data is written to a
//! sibling `*.tmp` file, flushed to disk, then renamed over the destination.
//! A reader therefore sees either the old file or the new one, never a torn
//! write.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;

fn temp_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    dest.with_file_name(name)
}

/// Atomically replace `dest` with `data`, creating parent directories.
pub fn write_atomic(dest: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp = temp_path(dest);
    {
        let mut f = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp)?;
        f.write_all(data)?;
        f.sync_all()?;
    }

    if let Err(e) = fs::rename(&tmp, dest) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

/// Serialize `value` as pretty JSON and atomically write it to `dest`.
pub fn write_json_atomic<T: Serialize>(dest: &Path, value: &T) -> Result<()> {
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');
    write_atomic(dest, &bytes)
}

/// Copy a file into place atomically.
pub fn copy_atomic(source: &Path, dest: &Path) -> Result<()> {
    let data = fs::read(source)?;
    write_atomic(dest, &data)?;
    #[cfg(unix)]
    {
        let perms = fs::metadata(source)?.permissions();
        fs::set_permissions(dest, perms)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_creates_parents_and_leaves_no_temp() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("a/b/sidecar.json");

        write_atomic(&dest, b"{}").unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"{}");
        assert!(!dir.path().join("a/b/sidecar.json.tmp").exists());
    }

    #[test]
    fn test_write_atomic_replaces_existing() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("genesis.json");
        write_atomic(&dest, b"old").unwrap();
        write_atomic(&dest, b"new").unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"new");
    }

    #[test]
    fn test_stale_temp_file_is_overwritten() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("chain.json");
        fs::write(dir.path().join("chain.json.tmp"), b"half a fi").unwrap();

        write_atomic(&dest, b"complete").unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"complete");
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_atomic_keeps_executable_bit() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let src = dir.path().join("vm");
        fs::write(&src, b"#!/bin/sh\n").unwrap();
        fs::set_permissions(&src, fs::Permissions::from_mode(0o755)).unwrap();

        let dest = dir.path().join("vms/myvm");
        copy_atomic(&src, &dest).unwrap();

        let mode = fs::metadata(&dest).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }
}
