//! Published subnet descriptors.
//!
//! A descriptor repository is a directory tree checked out by the operator:
//!
//! ```text
//! repos/<alias>/
//! ├── subnets/<subnet>.yaml   # SubnetDescriptor
//! └── vms/<vm>.yaml           # VmDescriptor
//! ```
//!
//! Paths inside descriptors are relative to the repository root. Fetching the
//! repository itself (git or otherwise) happens outside this crate.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use subnetctl_crypto::Address;
use subnetctl_types::{ChainId, Network, SubnetId};

use crate::error::{OpsError, OpsResult};

/// Where to import a subnet from: `<repo alias>/<subnet>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSource {
    pub repo: String,
    pub subnet: String,
}

impl ImportSource {
    pub fn new(repo: impl Into<String>, subnet: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            subnet: subnet.into(),
        }
    }
}

impl std::str::FromStr for ImportSource {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((repo, subnet)) if !repo.is_empty() && !subnet.is_empty() => {
                Ok(Self::new(repo, subnet))
            }
            _ => Err(OpsError::invalid_operation(format!(
                "import source '{}' must look like <repo>/<subnet>",
                s
            ))),
        }
    }
}

impl std::fmt::Display for ImportSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.repo, self.subnet)
    }
}

/// A published deployment of the subnet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentDescriptor {
    pub subnet_id: SubnetId,
    #[serde(default)]
    pub chain_id: Option<ChainId>,
    #[serde(default)]
    pub control_keys: Vec<Address>,
    #[serde(default)]
    pub threshold: u32,
}

/// `subnets/<subnet>.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetDescriptor {
    pub subnet: String,
    /// Name of the VM descriptor under `vms/`.
    pub vm: String,
    pub genesis: PathBuf,
    #[serde(default)]
    pub token_name: Option<String>,
    #[serde(default)]
    pub deployments: BTreeMap<Network, DeploymentDescriptor>,
}

/// `vms/<vm>.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmDescriptor {
    pub name: String,
    pub vm_id: String,
    pub version: String,
    pub rpc_version: u32,
    #[serde(default)]
    pub binary: Option<PathBuf>,
}

/// Everything needed to materialize an imported subnet locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedSubnet {
    pub source: ImportSource,
    pub subnet: SubnetDescriptor,
    pub vm: VmDescriptor,
    pub genesis: Vec<u8>,
    /// Absolute path of the VM binary, if the repository ships one.
    pub binary: Option<PathBuf>,
}

/// Source of published subnet descriptors.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn fetch(&self, source: &ImportSource) -> OpsResult<PublishedSubnet>;
}

/// Publisher reading descriptor repositories already present on disk.
#[derive(Debug, Clone)]
pub struct RepoPublisher {
    repos_dir: PathBuf,
}

impl RepoPublisher {
    pub fn new(repos_dir: impl AsRef<Path>) -> Self {
        Self {
            repos_dir: repos_dir.as_ref().to_path_buf(),
        }
    }

    async fn read_yaml<T: DeserializeOwned>(path: &Path) -> OpsResult<T> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| OpsError::Publisher(format!("{}: {}", path.display(), e)))?;
        serde_yaml::from_str(&text)
            .map_err(|e| OpsError::Publisher(format!("{}: {}", path.display(), e)))
    }

    /// Resolve a descriptor-relative path, refusing to leave the repository.
    fn resolve(repo: &Path, relative: &Path) -> OpsResult<PathBuf> {
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(OpsError::Publisher(format!(
                "descriptor path {} escapes the repository",
                relative.display()
            )));
        }
        Ok(repo.join(relative))
    }
}

#[async_trait]
impl Publisher for RepoPublisher {
    async fn fetch(&self, source: &ImportSource) -> OpsResult<PublishedSubnet> {
        let repo = self.repos_dir.join(&source.repo);
        if !repo.is_dir() {
            return Err(OpsError::Publisher(format!(
                "repository '{}' not found under {}",
                source.repo,
                self.repos_dir.display()
            )));
        }

        let subnet: SubnetDescriptor = Self::read_yaml(
            &repo.join("subnets").join(format!("{}.yaml", source.subnet)),
        )
        .await?;
        let vm: VmDescriptor =
            Self::read_yaml(&repo.join("vms").join(format!("{}.yaml", subnet.vm))).await?;

        let genesis_path = Self::resolve(&repo, &subnet.genesis)?;
        let genesis = tokio::fs::read(&genesis_path)
            .await
            .map_err(|e| OpsError::Publisher(format!("{}: {}", genesis_path.display(), e)))?;

        let binary = match &vm.binary {
            Some(rel) => Some(Self::resolve(&repo, rel)?),
            None => None,
        };

        tracing::debug!(%source, vm = %vm.name, vm_id = %vm.vm_id, "Fetched published subnet");
        Ok(PublishedSubnet {
            source: source.clone(),
            subnet,
            vm,
            genesis,
            binary,
        })
    }
}
