//! Mocks of the smaller collaborators: VM inspection, publishing, confirmation.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, RwLock};
use subnetctl_ops::{Confirmer, ImportSource, OpsError, OpsResult, PublishedSubnet, Publisher};
use subnetctl_version::{VersionError, VersionResult, VmInspector};

/// VM inspector answering with a fixed protocol version, or failing.
#[derive(Debug, Clone, Copy)]
pub struct MockInspector {
    rpc_version: Option<u32>,
}

impl MockInspector {
    /// Every binary reports `rpc_version`.
    pub fn reporting(rpc_version: u32) -> Self {
        Self {
            rpc_version: Some(rpc_version),
        }
    }

    /// Every binary is unreadable.
    pub fn failing() -> Self {
        Self { rpc_version: None }
    }
}

#[async_trait]
impl VmInspector for MockInspector {
    async fn protocol_version(&self, binary: &Path) -> VersionResult<u32> {
        self.rpc_version
            .ok_or_else(|| VersionError::unreadable(binary, "mock: no protocol version printed"))
    }
}

/// Publisher serving subnets registered in memory.
#[derive(Clone, Default)]
pub struct MockPublisher {
    published: Arc<RwLock<HashMap<String, PublishedSubnet>>>,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a subnet available under its source.
    pub fn publish(&self, subnet: PublishedSubnet) {
        self.published
            .write()
            .unwrap()
            .insert(subnet.source.to_string(), subnet);
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    async fn fetch(&self, source: &ImportSource) -> OpsResult<PublishedSubnet> {
        self.published
            .read()
            .unwrap()
            .get(&source.to_string())
            .cloned()
            .ok_or_else(|| OpsError::Publisher(format!("mock: {} not published", source)))
    }
}

/// Confirmer answering from a script, recording every prompt.
///
/// Once the script runs out every prompt is declined.
#[derive(Clone, Default)]
pub struct ScriptedConfirmer {
    answers: Arc<RwLock<VecDeque<bool>>>,
    prompts: Arc<RwLock<Vec<String>>>,
}

impl ScriptedConfirmer {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: Arc::new(RwLock::new(answers.into_iter().collect())),
            prompts: Arc::default(),
        }
    }

    /// Prompts shown so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.read().unwrap().clone()
    }
}

impl Confirmer for ScriptedConfirmer {
    fn confirm(&self, prompt: &str) -> OpsResult<bool> {
        self.prompts.write().unwrap().push(prompt.to_string());
        Ok(self.answers.write().unwrap().pop_front().unwrap_or(false))
    }
}
