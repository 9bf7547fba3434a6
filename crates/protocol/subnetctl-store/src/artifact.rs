//! Transaction artifact files.
//!
//! Artifacts are addressed by a caller-supplied path rather than living inside
//! the data directory, since they travel between machines.

use std::fs;
use std::path::Path;

use subnetctl_types::{TransactionArtifact, ARTIFACT_FORMAT_VERSION};

use crate::atomic::write_json_atomic;
use crate::error::{Result, StoreError};

/// Load an artifact. Fails with `ArtifactNotFound` if the file is absent.
pub fn load_artifact(path: &Path) -> Result<TransactionArtifact> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StoreError::ArtifactNotFound(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };
    let artifact: TransactionArtifact = serde_json::from_slice(&bytes)?;
    if artifact.format_version > ARTIFACT_FORMAT_VERSION {
        return Err(StoreError::invalid_data(format!(
            "transaction file format {} is newer than supported format {}",
            artifact.format_version, ARTIFACT_FORMAT_VERSION
        )));
    }
    Ok(artifact)
}

/// Atomically write an artifact to `path`.
pub fn save_artifact(path: &Path, artifact: &TransactionArtifact) -> Result<()> {
    write_json_atomic(path, artifact)?;
    tracing::debug!(path = %path.display(), status = %artifact.status, "Saved transaction file");
    Ok(())
}
