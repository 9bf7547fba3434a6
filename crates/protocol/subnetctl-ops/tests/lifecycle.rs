//! Subnet lifecycle tests.
//!
//! These drive `SubnetOperations` against a temporary store with a mock
//! control plane and check the state machine from the outside:
//!
//! 1. **Guards**: deploy twice, transform before deploy, delete a missing
//!    subnet. A failed guard never changes the sidecar.
//! 2. **Versions**: unknown VM versions and unreadable binaries fail before
//!    anything is written.
//! 3. **Multisig**: threshold transactions collect signatures in files and
//!    are recorded only when committed.
//! 4. **Local flows**: everything signed by the local network key goes
//!    online, end to end through elastic staking.

use std::fs;

use subnetctl_ops::{
    AddValidatorRequest, CreateRequest, DeployRequest, JoinRequest, OpsError,
    RemoveValidatorRequest, StakeRequest, TransformRequest, TxOutcome, VmSelection,
};
use subnetctl_store::{BundleFile, ConfigBundleStore, LocalSigner, SidecarStore, Signer, StoreError};
use subnetctl_test_utils::{test_node_id, MockInspector, TestEnv};
use subnetctl_types::{
    ChainId, ElasticConfig, Network, NetworkSelection, SemVer, TxKind, TxPayload, TxStatus,
    VersionRequest, Vm,
};
use subnetctl_version::VersionError;

const DAY: u64 = 24 * 60 * 60;

// ============ HELPERS ============

async fn create_evm_subnet(env: &TestEnv, name: &str) {
    let genesis = env.write_genesis();
    env.ops
        .create(CreateRequest::new(
            name,
            VmSelection::SubnetEvm(VersionRequest::Latest),
            genesis,
        ))
        .await
        .unwrap();
}

async fn deploy_local(env: &TestEnv, name: &str) {
    env.ops
        .deploy(name, local(), DeployRequest::default())
        .await
        .unwrap();
}

fn local() -> NetworkSelection {
    NetworkSelection::new(Network::Local)
}

fn simulated_testnet() -> NetworkSelection {
    NetworkSelection::simulated(Network::Testnet, true)
}

/// Offline 2-of-2 deploy to a simulated testnet. Returns the chain file and both keys.
async fn deploy_two_of_two(
    env: &TestEnv,
    name: &str,
) -> (std::path::PathBuf, LocalSigner, LocalSigner) {
    let (k1, k2) = (env.external_signer(), env.external_signer());
    let chain_tx = env.path("chain.tx");
    env.ops
        .deploy(
            name,
            simulated_testnet(),
            DeployRequest {
                control_keys: vec![k1.address(), k2.address()],
                threshold: 2,
                output_tx_path: Some(chain_tx.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    (chain_tx, k1, k2)
}

fn chain_pending(env: &TestEnv, name: &str) -> bool {
    let sidecar = env.ops.state.sidecars.load(name).unwrap();
    sidecar.network(Network::Testnet).unwrap().chain_pending()
}

fn sidecar_bytes(env: &TestEnv, name: &str) -> Vec<u8> {
    fs::read(env.path("store/subnets").join(name).join("sidecar.json")).unwrap()
}

// ============ GUARDS ============

#[tokio::test]
async fn test_deploy_twice_fails_and_keeps_state() {
    let env = TestEnv::new();
    create_evm_subnet(&env, "sub1").await;
    deploy_local(&env, "sub1").await;
    let before = sidecar_bytes(&env, "sub1");

    let err = env
        .ops
        .deploy("sub1", local(), DeployRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(err, OpsError::AlreadyDeployed { network: Network::Local, .. }));
    assert_eq!(sidecar_bytes(&env, "sub1"), before);
    // Only the first deploy reached the network.
    assert_eq!(
        env.control_plane.submitted_kinds(),
        vec![TxKind::CreateSubnet, TxKind::CreateChain]
    );
}

#[tokio::test]
async fn test_transform_before_deploy_fails_and_keeps_state() {
    let env = TestEnv::new();
    create_evm_subnet(&env, "sub1").await;
    let before = sidecar_bytes(&env, "sub1");

    let config = ElasticConfig::with_defaults("BLIZZARD", "BRRR", 0);
    let err = env
        .ops
        .transform_elastic("sub1", local(), TransformRequest::new(config))
        .await
        .unwrap_err();

    assert!(matches!(err, OpsError::NotDeployed { .. }));
    assert_eq!(sidecar_bytes(&env, "sub1"), before);
    assert!(!env.ops.state.bundles.has("sub1", BundleFile::ElasticConfig));
    assert_eq!(env.control_plane.submission_count(), 0);
}

#[tokio::test]
async fn test_delete_missing_subnet_is_not_found() {
    let env = TestEnv::new();
    let err = env.ops.delete("missing", true).unwrap_err();
    assert!(err.is_not_found());
    assert!(env.confirmer.prompts().is_empty());
}

#[tokio::test]
async fn test_create_existing_requires_force() {
    let env = TestEnv::new();
    create_evm_subnet(&env, "sub1").await;

    let request = CreateRequest::new(
        "sub1",
        VmSelection::SubnetEvm(VersionRequest::Latest),
        env.write_genesis(),
    );
    let err = env.ops.create(request.clone()).await.unwrap_err();
    assert!(matches!(err, OpsError::AlreadyExists(_)));

    let sidecar = env.ops.create(request.with_force(true).with_token_name("TKN")).await.unwrap();
    assert_eq!(sidecar.token_name.as_deref(), Some("TKN"));
}

#[tokio::test]
async fn test_validator_ops_require_deployment() {
    let env = TestEnv::new();
    create_evm_subnet(&env, "sub1").await;

    let err = env
        .ops
        .add_validator("sub1", local(), AddValidatorRequest::new(test_node_id(1), 2 * DAY))
        .await
        .unwrap_err();
    assert!(matches!(err, OpsError::NotDeployed { .. }));
}

// ============ VERSIONS ============

#[tokio::test]
async fn test_unmapped_vm_version_writes_nothing() {
    let env = TestEnv::new();
    let request = CreateRequest::new(
        "sub1",
        VmSelection::SubnetEvm(VersionRequest::Pinned(SemVer::new(9, 9, 9))),
        env.write_genesis(),
    );

    let err = env.ops.create(request).await.unwrap_err();

    assert!(matches!(err, OpsError::Version(VersionError::Incompatible { .. })));
    assert!(!env.ops.state.sidecars.exists("sub1"));
    assert!(!env.ops.state.bundles.exists("sub1"));
}

#[tokio::test]
async fn test_unreadable_custom_vm_writes_nothing() {
    let env = TestEnv::with_inspector(MockInspector::failing(), []);
    let binary = env.write_vm_binary("myvm");
    let request = CreateRequest::new(
        "sub1",
        VmSelection::Custom { binary },
        env.write_genesis(),
    );

    let err = env.ops.create(request).await.unwrap_err();

    assert!(matches!(err, OpsError::Version(VersionError::ArtifactUnreadable { .. })));
    assert!(!env.ops.state.sidecars.exists("sub1"));
    assert!(!env.ops.state.bundles.exists("sub1"));
}

#[tokio::test]
async fn test_runtime_override_must_match_protocol() {
    let env = TestEnv::new();
    create_evm_subnet(&env, "sub1").await;

    // Latest VM speaks rpcchainvm=31; v1.10.3 only speaks 26.
    let request = DeployRequest {
        runtime_version: Some(SemVer::new(1, 10, 3)),
        ..Default::default()
    };
    let err = env.ops.deploy("sub1", local(), request).await.unwrap_err();
    assert!(matches!(err, OpsError::Version(VersionError::Incompatible { .. })));
    assert!(env.control_plane.started().is_empty());

    let request = DeployRequest {
        runtime_version: Some(SemVer::new(1, 10, 18)),
        ..Default::default()
    };
    let outcome = env.ops.deploy("sub1", local(), request).await.unwrap();
    assert_eq!(outcome.runtime_version, SemVer::new(1, 10, 18));
}

// ============ STORE ============

#[tokio::test]
async fn test_sidecar_round_trips_byte_for_byte() {
    let env = TestEnv::new();
    create_evm_subnet(&env, "sub1").await;
    deploy_local(&env, "sub1").await;
    let before = sidecar_bytes(&env, "sub1");

    let sidecar = env.ops.state.sidecars.load("sub1").unwrap();
    env.ops.state.sidecars.save(&sidecar).unwrap();

    assert_eq!(sidecar_bytes(&env, "sub1"), before);
}

#[tokio::test]
async fn test_delete_removes_everything() {
    let env = TestEnv::with_inspector(MockInspector::reporting(28), [false, true]);
    let binary = env.write_vm_binary("myvm");
    env.ops
        .create(CreateRequest::new(
            "sub1",
            VmSelection::Custom { binary },
            env.write_genesis(),
        ))
        .await
        .unwrap();
    let overlay = env.path("chain.json");
    fs::write(&overlay, br#"{"log-level":"info"}"#).unwrap();
    env.ops.configure("sub1", Some(&overlay), None).unwrap();
    assert!(env.ops.state.bundles.vm_binary_path("sub1").is_file());

    // Declined first.
    let err = env.ops.delete("sub1", false).unwrap_err();
    assert!(matches!(err, OpsError::Cancelled));
    assert!(env.ops.state.sidecars.exists("sub1"));

    env.ops.delete("sub1", false).unwrap();
    assert_eq!(env.confirmer.prompts().len(), 2);
    assert!(!env.ops.state.sidecars.exists("sub1"));
    assert!(!env.ops.state.bundles.exists("sub1"));
    assert!(!env.path("store/subnets/sub1").exists());
}

#[tokio::test]
async fn test_configure_overlays() {
    let env = TestEnv::new();
    create_evm_subnet(&env, "sub1").await;

    let err = env.ops.configure("sub1", None, None).unwrap_err();
    assert!(matches!(err, OpsError::InvalidOperation(_)));

    let per_node = env.path("per-node.json");
    fs::write(&per_node, b"[1, 2]").unwrap();
    assert!(env.ops.configure("sub1", None, Some(&per_node)).is_err());
    assert!(!env.ops.state.bundles.has("sub1", BundleFile::PerNodeChainConfig));

    fs::write(&per_node, br#"{"NodeID-Test1":{"pruning-enabled":false}}"#).unwrap();
    let written = env.ops.configure("sub1", None, Some(&per_node)).unwrap();
    assert_eq!(written.len(), 1);

    let description = env.ops.describe("sub1").unwrap();
    assert_eq!(
        description.bundle_files,
        vec!["genesis.json", "per-node-chain.json"]
    );

    let err = env.ops.configure("missing", Some(&per_node), None).unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_import_registered_vm() {
    let env = TestEnv::new();
    let source = env.publish_subnet("spaces", "sqja3uK17MJxfC7AN8nGadBw9JK5BcrsNwNynsqP5Gih8M5Bm");

    let sidecar = env.ops.import_subnet(&source, None).await.unwrap();
    assert_eq!(sidecar.name, "spaces");
    assert!(matches!(sidecar.vm, Vm::Registered { .. }));
    assert_eq!(sidecar.imported_from.as_deref(), Some("community/spaces"));
    assert_eq!(
        env.ops.state.bundles.read("spaces", BundleFile::Genesis).unwrap(),
        br#"{"magic":42}"#.to_vec()
    );

    // Same VM under another name is refused.
    let err = env.ops.import_subnet(&source, Some("spaces2")).await.unwrap_err();
    assert!(matches!(err, OpsError::AlreadyExists(_)));
    assert_eq!(env.ops.list_subnets().unwrap(), vec!["spaces".to_string()]);
}

// ============ MULTISIG ============

#[tokio::test]
async fn test_threshold_deploy_and_validator_through_files() {
    let env = TestEnv::new();
    create_evm_subnet(&env, "sub1").await;
    let (k1, k2) = (env.external_signer(), env.external_signer());

    let chain_tx = env.path("chain.tx");
    let outcome = env
        .ops
        .deploy(
            "sub1",
            simulated_testnet(),
            DeployRequest {
                control_keys: vec![k1.address(), k2.address()],
                threshold: 2,
                output_tx_path: Some(chain_tx.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(outcome.chain_id.is_none());
    assert_eq!(outcome.chain_creation.pending_path(), Some(chain_tx.as_path()));
    let state = env.ops.state.sidecars.load("sub1").unwrap();
    let testnet = state.network(Network::Testnet).unwrap();
    assert!(testnet.chain_pending());
    assert!(!state.is_deployed(Network::Local));

    // Two signatures, in any order, across separate file rewrites.
    let artifact = env.ops.sign(&chain_tx, &k2).unwrap();
    assert_eq!(artifact.status, TxStatus::PartiallySigned);
    let err = env.ops.commit(&chain_tx).await.unwrap_err();
    assert!(matches!(err, OpsError::InsufficientSignatures { have: 1, need: 2 }));
    assert!(matches!(env.ops.sign(&chain_tx, &k2), Err(OpsError::AlreadySigned(_))));

    let artifact = env.ops.sign(&chain_tx, &k1).unwrap();
    assert_eq!(artifact.status, TxStatus::ReadyToCommit);
    let committed = env.ops.commit(&chain_tx).await.unwrap();
    assert_eq!(committed.artifact.status, TxStatus::Committed);

    let state = env.ops.state.sidecars.load("sub1").unwrap();
    assert!(!state.network(Network::Testnet).unwrap().chain_pending());
    assert!(env.ops.commit(&chain_tx).await.is_err());

    // Validator addition follows the same path.
    let validator_tx = env.path("validator.tx");
    let mut request = AddValidatorRequest::new(test_node_id(1), 2 * DAY);
    request.output_tx_path = Some(validator_tx.clone());
    let outcome = env
        .ops
        .add_validator("sub1", simulated_testnet(), request)
        .await
        .unwrap();
    match outcome {
        TxOutcome::Pending { pending_signers, .. } => assert_eq!(pending_signers.len(), 2),
        other => panic!("expected a pending transaction, got {:?}", other),
    }
    let state = env.ops.state.sidecars.load("sub1").unwrap();
    assert!(state.network(Network::Testnet).unwrap().validators.is_empty());

    let outsider = env.external_signer();
    assert!(matches!(
        env.ops.sign(&validator_tx, &outsider),
        Err(OpsError::UnauthorizedSigner(_))
    ));
    env.ops.sign(&validator_tx, &k1).unwrap();
    env.ops.sign(&validator_tx, &k2).unwrap();
    env.ops.commit(&validator_tx).await.unwrap();

    let state = env.ops.state.sidecars.load("sub1").unwrap();
    let testnet = state.network(Network::Testnet).unwrap();
    assert!(testnet.validators.contains_key(&test_node_id(1)));

    // Simulation routes every submission to the local network.
    let submissions = env.control_plane.submissions();
    assert_eq!(submissions.len(), 3);
    assert!(submissions.iter().all(|(network, _)| *network == Network::Local));
}

#[tokio::test]
async fn test_threshold_without_output_path_submits_nothing() {
    let env = TestEnv::new();
    create_evm_subnet(&env, "sub1").await;
    let (k1, k2) = (env.external_signer(), env.external_signer());

    let err = env
        .ops
        .deploy(
            "sub1",
            simulated_testnet(),
            DeployRequest {
                control_keys: vec![k1.address(), k2.address()],
                threshold: 2,
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, OpsError::InvalidOperation(_)));
    assert_eq!(env.control_plane.submission_count(), 0);
    assert!(!env.ops.state.sidecars.load("sub1").unwrap().is_deployed(Network::Testnet));
}

#[tokio::test]
async fn test_single_local_key_goes_online_on_public_network() {
    let env = TestEnv::new();
    create_evm_subnet(&env, "sub1").await;
    let owner = env.import_key("owner");

    let outcome = env
        .ops
        .deploy(
            "sub1",
            NetworkSelection::new(Network::Testnet),
            DeployRequest {
                control_keys: vec![owner.address()],
                threshold: 1,
                fee_key: Some("owner".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(outcome.chain_creation.is_committed());
    assert!(outcome.chain_id.is_some());
    let submissions = env.control_plane.submissions();
    assert!(submissions.iter().all(|(network, _)| *network == Network::Testnet));
}

#[tokio::test]
async fn test_public_deploy_without_fee_key_fails() {
    let env = TestEnv::new();
    create_evm_subnet(&env, "sub1").await;
    let owner = env.import_key("owner");

    let err = env
        .ops
        .deploy(
            "sub1",
            NetworkSelection::new(Network::Testnet),
            DeployRequest {
                control_keys: vec![owner.address()],
                threshold: 1,
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, OpsError::KeyUnavailable(_)));
}

#[tokio::test]
async fn test_commit_counts_signatures_not_stored_status() {
    let env = TestEnv::new();
    create_evm_subnet(&env, "sub1").await;
    let (chain_tx, k1, _k2) = deploy_two_of_two(&env, "sub1").await;
    let submitted = env.control_plane.submission_count();

    // A file claiming to be ready with no signatures at all.
    let mut artifact = env.ops.load_transaction(&chain_tx).unwrap();
    artifact.status = TxStatus::ReadyToCommit;
    env.ops.save_transaction(&chain_tx, &artifact).unwrap();
    let err = env.ops.commit(&chain_tx).await.unwrap_err();
    assert!(matches!(err, OpsError::InsufficientSignatures { have: 0, need: 2 }));

    // Same with one of two signatures.
    artifact.status = TxStatus::Proposed;
    env.ops.save_transaction(&chain_tx, &artifact).unwrap();
    let mut artifact = env.ops.sign(&chain_tx, &k1).unwrap();
    artifact.status = TxStatus::ReadyToCommit;
    env.ops.save_transaction(&chain_tx, &artifact).unwrap();
    let err = env.ops.commit(&chain_tx).await.unwrap_err();
    assert!(matches!(err, OpsError::InsufficientSignatures { have: 1, need: 2 }));

    assert!(chain_pending(&env, "sub1"));
    assert_eq!(env.control_plane.submission_count(), submitted);
}

#[tokio::test]
async fn test_commit_rejects_a_rewritten_signing_policy() {
    let env = TestEnv::new();
    create_evm_subnet(&env, "sub1").await;
    let (chain_tx, _k1, _k2) = deploy_two_of_two(&env, "sub1").await;
    let submitted = env.control_plane.submission_count();

    // Someone outside the control keys makes themselves the only authorizer.
    let outsider = env.external_signer();
    let mut artifact = env.ops.load_transaction(&chain_tx).unwrap();
    artifact.required_authorizers = [outsider.address()].into_iter().collect();
    artifact.threshold = 1;
    env.ops.save_transaction(&chain_tx, &artifact).unwrap();
    let artifact = env.ops.sign(&chain_tx, &outsider).unwrap();
    assert_eq!(artifact.status, TxStatus::ReadyToCommit);

    let err = env.ops.commit(&chain_tx).await.unwrap_err();
    assert!(matches!(err, OpsError::InvalidOperation(_)));
    assert!(chain_pending(&env, "sub1"));
    assert_eq!(env.control_plane.submission_count(), submitted);
}

// ============ LOCAL FLOWS ============

#[tokio::test]
async fn test_failed_chain_creation_records_nothing() {
    let env = TestEnv::new();
    create_evm_subnet(&env, "sub1").await;
    env.control_plane.fail_kind(TxKind::CreateChain);

    let err = env
        .ops
        .deploy("sub1", local(), DeployRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(err, OpsError::External { .. }));
    assert!(err.diagnostics().is_some());
    assert!(!env.ops.state.sidecars.load("sub1").unwrap().is_deployed(Network::Local));
}

#[tokio::test]
async fn test_local_validator_lifecycle() {
    let env = TestEnv::new();
    create_evm_subnet(&env, "sub1").await;
    deploy_local(&env, "sub1").await;

    let outcome = env
        .ops
        .add_validator("sub1", local(), AddValidatorRequest::new(test_node_id(1), 2 * DAY))
        .await
        .unwrap();
    assert!(outcome.is_committed());

    let err = env
        .ops
        .add_validator("sub1", local(), AddValidatorRequest::new(test_node_id(1), 2 * DAY))
        .await
        .unwrap_err();
    assert!(matches!(err, OpsError::AlreadyExists(_)));

    let err = env
        .ops
        .add_validator("sub1", local(), AddValidatorRequest::new(test_node_id(2), 60))
        .await
        .unwrap_err();
    assert!(matches!(err, OpsError::InvalidOperation(_)));

    let validators = env.ops.list_validators("sub1", local()).await.unwrap();
    assert_eq!(validators.len(), 1);
    let stats = env.ops.stats("sub1", local()).await.unwrap();
    assert_eq!(stats.validator_count, 1);
    assert_eq!(stats.total_weight, 20);

    env.ops
        .remove_validator("sub1", local(), RemoveValidatorRequest::new(test_node_id(1)))
        .await
        .unwrap();
    let sidecar = env.ops.state.sidecars.load("sub1").unwrap();
    assert!(sidecar.network(Network::Local).unwrap().validators.is_empty());

    let err = env
        .ops
        .remove_validator("sub1", local(), RemoveValidatorRequest::new(test_node_id(9)))
        .await
        .unwrap_err();
    assert!(matches!(err, OpsError::InvalidOperation(_)));
}

#[tokio::test]
async fn test_elastic_conversion_and_staking() {
    let env = TestEnv::new();
    create_evm_subnet(&env, "sub1").await;
    deploy_local(&env, "sub1").await;
    env.ops
        .add_validator("sub1", local(), AddValidatorRequest::new(test_node_id(1), 30 * DAY))
        .await
        .unwrap();

    // Staking needs an elastic subnet.
    let err = env
        .ops
        .join_with_stake("sub1", local(), StakeRequest::new(test_node_id(2), 5_000, 30 * DAY))
        .await
        .unwrap_err();
    assert!(matches!(err, OpsError::NotElastic { .. }));

    let mut request = TransformRequest::new(ElasticConfig::with_defaults("BLIZZARD", "BRRR", 0));
    request.transform_validators = Some(2_000);
    let outcome = env
        .ops
        .transform_elastic("sub1", local(), request.clone())
        .await
        .unwrap();
    assert!(outcome.is_committed());

    let sidecar = env.ops.state.sidecars.load("sub1").unwrap();
    assert!(sidecar.is_elastic(Network::Local));
    let state = sidecar.network(Network::Local).unwrap();
    assert!(state.elastic_config.as_ref().unwrap().asset_id.is_some());
    assert_eq!(
        state.validators[&test_node_id(1)].stake_amount,
        Some(2_000)
    );
    assert!(env.ops.state.bundles.has("sub1", BundleFile::ElasticConfig));

    let err = env
        .ops
        .transform_elastic("sub1", local(), request)
        .await
        .unwrap_err();
    assert!(matches!(err, OpsError::AlreadyElastic { .. }));

    // Below the minimum stake.
    let err = env
        .ops
        .join_with_stake("sub1", local(), StakeRequest::new(test_node_id(2), 10, 30 * DAY))
        .await
        .unwrap_err();
    assert!(matches!(err, OpsError::InvalidOperation(_)));

    env.ops
        .join_with_stake("sub1", local(), StakeRequest::new(test_node_id(2), 5_000, 30 * DAY))
        .await
        .unwrap();
    env.ops
        .add_permissionless_delegator(
            "sub1",
            local(),
            StakeRequest::new(test_node_id(2), 100, 14 * DAY),
        )
        .await
        .unwrap();

    let sidecar = env.ops.state.sidecars.load("sub1").unwrap();
    let record = &sidecar.network(Network::Local).unwrap().validators[&test_node_id(2)];
    assert_eq!(record.stake_amount, Some(5_000));
    assert_eq!(record.delegations.len(), 1);
    assert_eq!(record.delegations[0].amount, 100);

    // Delegating to an unknown validator fails.
    let err = env
        .ops
        .add_permissionless_delegator(
            "sub1",
            local(),
            StakeRequest::new(test_node_id(7), 100, 14 * DAY),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, OpsError::InvalidOperation(_)));
}

#[tokio::test]
async fn test_join_writes_node_config_and_plugin() {
    let env = TestEnv::new();
    let binary = env.write_vm_binary("myvm");
    env.ops
        .create(CreateRequest::new(
            "sub1",
            VmSelection::Custom { binary },
            env.write_genesis(),
        ))
        .await
        .unwrap();
    deploy_local(&env, "sub1").await;

    let node_config = env.path("node/config.json");
    fs::create_dir_all(node_config.parent().unwrap()).unwrap();
    fs::write(&node_config, br#"{"track-subnets":"other","http-port":9650}"#).unwrap();
    let plugins = env.path("plugins");

    let outcome = env
        .ops
        .join(
            "sub1",
            local(),
            JoinRequest {
                node_config_path: Some(node_config.clone()),
                plugin_dir: Some(plugins.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let written: serde_json::Value =
        serde_json::from_slice(&fs::read(&node_config).unwrap()).unwrap();
    assert_eq!(
        written["track-subnets"],
        serde_json::json!(format!("other,{}", outcome.subnet_id))
    );
    assert_eq!(written["http-port"], serde_json::json!(9650));
    let plugin = outcome.plugin.unwrap();
    assert!(plugin.starts_with(&plugins));
    assert!(plugin.is_file());
    assert!(outcome.stake.is_none());

    // Not deployed to the test network.
    let err = env
        .ops
        .join("sub1", simulated_testnet(), JoinRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, OpsError::NotDeployed { .. }));
}

#[tokio::test]
async fn test_register_deployment_overwrites_only_with_force() {
    let env = TestEnv::new();
    create_evm_subnet(&env, "sub1").await;
    deploy_local(&env, "sub1").await;
    let sidecar = env.ops.state.sidecars.load("sub1").unwrap();
    let mut state = sidecar.network(Network::Local).unwrap().clone();
    state.chain_id = Some(ChainId::new("restored"));

    let err = env
        .ops
        .register_deployment("sub1", Network::Local, state.clone(), false)
        .unwrap_err();
    assert!(matches!(
        err,
        OpsError::Store(StoreError::AlreadyDeployed { .. })
    ));

    let sidecar = env
        .ops
        .register_deployment("sub1", Network::Local, state, true)
        .unwrap();
    assert_eq!(
        sidecar.network(Network::Local).unwrap().chain_id.as_ref().unwrap().as_str(),
        "restored"
    );
}

#[tokio::test]
async fn test_start_time_out_of_range_is_rejected() {
    let env = TestEnv::new();
    create_evm_subnet(&env, "sub1").await;
    deploy_local(&env, "sub1").await;

    let mut request = AddValidatorRequest::new(test_node_id(1), 2 * DAY);
    request.start_time = Some(u64::MAX - 10);
    let err = env
        .ops
        .add_validator("sub1", local(), request)
        .await
        .unwrap_err();
    assert!(matches!(err, OpsError::InvalidOperation(_)));

    let sidecar = env.ops.state.sidecars.load("sub1").unwrap();
    assert!(sidecar.network(Network::Local).unwrap().validators.is_empty());
    assert!(!env
        .control_plane
        .submitted_kinds()
        .contains(&TxKind::AddValidator));
}

#[tokio::test]
async fn test_elastic_side_file_failure_can_be_retried() {
    let env = TestEnv::new();
    create_evm_subnet(&env, "sub1").await;
    deploy_local(&env, "sub1").await;

    // A directory in the side file's place makes its write fail.
    let side_file = env
        .path("store/subnets")
        .join("sub1")
        .join("elastic_subnet_config.json");
    fs::create_dir_all(&side_file).unwrap();

    let request = TransformRequest::new(ElasticConfig::with_defaults("BLIZZARD", "BRRR", 0));
    assert!(env
        .ops
        .transform_elastic("sub1", local(), request.clone())
        .await
        .is_err());
    let sidecar = env.ops.state.sidecars.load("sub1").unwrap();
    assert!(!sidecar.is_elastic(Network::Local));

    fs::remove_dir_all(&side_file).unwrap();
    env.ops
        .transform_elastic("sub1", local(), request)
        .await
        .unwrap();
    let sidecar = env.ops.state.sidecars.load("sub1").unwrap();
    assert!(sidecar.is_elastic(Network::Local));
    assert!(env.ops.state.bundles.has("sub1", BundleFile::ElasticConfig));
}

#[tokio::test]
async fn test_mainnet_deploy_uses_mainnet_genesis() {
    let env = TestEnv::new();
    create_evm_subnet(&env, "sub1").await;
    let owner = env.import_key("owner");

    env.ops
        .deploy(
            "sub1",
            NetworkSelection::simulated(Network::Mainnet, true),
            DeployRequest {
                control_keys: vec![owner.address()],
                threshold: 1,
                mainnet_chain_id: Some(777),
                fee_key: Some("owner".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(env.ops.state.bundles.has("sub1", BundleFile::MainnetGenesis));
    let genesis = env
        .control_plane
        .submissions()
        .into_iter()
        .find_map(|(_, tx)| match tx.payload {
            TxPayload::CreateChain { genesis, .. } => Some(genesis),
            _ => None,
        })
        .unwrap();
    let genesis: serde_json::Value = serde_json::from_slice(&genesis).unwrap();
    assert_eq!(genesis["config"]["chainId"], 777);

    // The local genesis keeps its own chain id.
    let local: serde_json::Value =
        serde_json::from_slice(&env.ops.state.bundles.read("sub1", BundleFile::Genesis).unwrap())
            .unwrap();
    assert_eq!(local["config"]["chainId"], 99999);
}
