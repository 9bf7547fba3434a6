//! Helper functions for creating test fixtures.
//!
//! Provides a pre-wired `SubnetOperations` over a temporary store, plus
//! genesis files, keys, VM binaries and published subnets.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use subnetctl_crypto::{generate_keypair, private_key_to_base58};
use subnetctl_ops::{
    ImportSource, OpsConfig, PublishedSubnet, SubnetDescriptor, SubnetOperations, VmDescriptor,
};
use subnetctl_store::{LocalSigner, StoreLayout, SubnetState};
use subnetctl_types::NodeId;
use subnetctl_version::{CompatibilityTable, VersionResolver};
use tempfile::TempDir;

use crate::{MockControlPlane, MockInspector, MockPublisher, ScriptedConfirmer};

/// Protocol version the default mock inspector reports (present in the embedded table).
pub const TEST_RPC_VERSION: u32 = 28;

/// A store in a temp directory with every collaborator mocked.
///
/// `temp_dir` must be kept alive for the duration of the test.
pub struct TestEnv {
    pub ops: SubnetOperations,
    pub control_plane: MockControlPlane,
    pub publisher: MockPublisher,
    pub confirmer: ScriptedConfirmer,
    pub temp_dir: TempDir,
}

impl TestEnv {
    /// Environment whose custom VMs report [`TEST_RPC_VERSION`] and whose
    /// confirmations are all declined.
    pub fn new() -> Self {
        Self::with_inspector(MockInspector::reporting(TEST_RPC_VERSION), [])
    }

    /// Environment with a specific inspector and scripted confirmations.
    pub fn with_inspector(inspector: MockInspector, answers: impl IntoIterator<Item = bool>) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let layout = StoreLayout::new(temp_dir.path().join("store"));
        let state = SubnetState::open(layout).unwrap();

        let resolver = VersionResolver::new(CompatibilityTable::embedded().unwrap(), Arc::new(inspector));
        let control_plane = MockControlPlane::new();
        let publisher = MockPublisher::new();
        let confirmer = ScriptedConfirmer::new(answers);

        let ops = SubnetOperations::new(
            state,
            resolver,
            Arc::new(control_plane.clone()),
            Arc::new(publisher.clone()),
            Arc::new(confirmer.clone()),
        )
        .with_config(OpsConfig::default().with_start_delay(60));

        Self {
            ops,
            control_plane,
            publisher,
            confirmer,
            temp_dir,
        }
    }

    /// A path inside the temp directory, outside the store.
    pub fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Write an EVM-style genesis file and return its path.
    pub fn write_genesis(&self) -> PathBuf {
        let path = self.path("genesis.json");
        std::fs::write(
            &path,
            br#"{"config":{"chainId":99999,"feeConfig":{"gasLimit":8000000}},"alloc":{}}"#,
        )
        .unwrap();
        path
    }

    /// Write a stand-in VM binary and return its path.
    pub fn write_vm_binary(&self, name: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, b"#!/bin/sh\necho rpcchainvm=28\n").unwrap();
        path
    }

    /// Import a freshly generated key under `name` and return its signer.
    pub fn import_key(&self, name: &str) -> LocalSigner {
        let (private_key, _) = generate_keypair();
        let file = self.path(&format!("{}.seed", name));
        std::fs::write(&file, private_key_to_base58(&private_key)).unwrap();
        self.ops.state.keys.import(name, &file, false).unwrap();
        self.ops.state.keys.load(name).unwrap()
    }

    /// A signer whose key is not in the store.
    pub fn external_signer(&self) -> LocalSigner {
        LocalSigner::new(generate_keypair().0)
    }

    /// Publish a subnet running a registered VM under `community/<subnet>`.
    pub fn publish_subnet(&self, subnet: &str, vm_id: &str) -> ImportSource {
        let source = ImportSource::new("community", subnet);
        self.publisher.publish(PublishedSubnet {
            source: source.clone(),
            subnet: SubnetDescriptor {
                subnet: subnet.to_string(),
                vm: "spacesvm".to_string(),
                genesis: PathBuf::from("genesis/spaces.json"),
                token_name: Some("SPC".to_string()),
                deployments: BTreeMap::new(),
            },
            vm: VmDescriptor {
                name: "spacesvm".to_string(),
                vm_id: vm_id.to_string(),
                version: "v0.0.9".to_string(),
                rpc_version: TEST_RPC_VERSION,
                binary: None,
            },
            genesis: br#"{"magic":42}"#.to_vec(),
            binary: None,
        });
        source
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// A syntactically valid node id.
pub fn test_node_id(n: u32) -> NodeId {
    NodeId::new(format!("NodeID-Test{}", n))
}
