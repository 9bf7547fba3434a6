//! Subnet lifecycle operations.
//!
//! This crate combines the store, version resolver and node control plane into
//! the operations an operator runs against a subnet over its life.
//!
//! # Module Organization
//!
//! - [`error`] - Operation error types
//! - [`config`] - Operation defaults
//! - [`confirm`] - Interactive confirmation contract
//! - [`publisher`] - Published subnet descriptors (import source)
//! - [`authorization`] - Control-key policies and the online/offline branch
//! - [`subnet_ops`] - `SubnetOperations` and shared helpers
//! - [`subnet`] - create, configure, delete, import, describe
//! - [`deploy`] - deploy, register an existing deployment
//! - [`validators`] - add/remove validators, list, stats
//! - [`elastic`] - elastic conversion, staking, delegation
//! - [`join`] - node configuration for validating a subnet
//! - [`transaction`] - sign and commit transaction files
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use subnetctl_ops::{AssumeYes, CreateRequest, DeployRequest, RepoPublisher, SubnetOperations, VmSelection};
//! use subnetctl_store::{StoreLayout, SubnetState};
//! use subnetctl_types::{Network, NetworkSelection, VersionRequest};
//!
//! let layout = StoreLayout::new("~/.subnetctl");
//! let publisher = Arc::new(RepoPublisher::new(layout.repos_dir()));
//! let state = SubnetState::open(layout)?;
//! let ops = SubnetOperations::new(state, resolver, control_plane, publisher, Arc::new(AssumeYes));
//!
//! let request = CreateRequest::new("sub1", VmSelection::SubnetEvm(VersionRequest::Latest), "genesis.json");
//! ops.create(request).await?;
//! ops.deploy("sub1", NetworkSelection::new(Network::Local), DeployRequest::default()).await?;
//! ```
//!
//! # Subnet States
//!
//! Per network, a subnet is `undeployed`, `deployed` or `elastic`:
//!
//! ```text
//! undeployed ──deploy──► deployed ──transform_elastic──► elastic
//! ```
//!
//! Validator operations work in both `deployed` and `elastic`; staking and
//! delegation need `elastic`. Each transition is guarded against a fresh read
//! of the sidecar, and a failed guard leaves the sidecar untouched.
//!
//! # Online and Offline Signing
//!
//! Operations authorized by control keys sign and submit immediately when the
//! policy needs one signature and that key is held locally. Otherwise they
//! write a transaction file that collects signatures with [`sign_artifact`]
//! and is submitted with `SubnetOperations::commit`.

pub mod authorization;
pub mod config;
pub mod confirm;
pub mod deploy;
pub mod elastic;
pub mod error;
pub mod join;
pub mod publisher;
pub mod subnet;
pub mod subnet_ops;
pub mod transaction;
pub mod validators;

// Error types
pub use error::{OpsError, OpsResult};

// Configuration
pub use config::{OpsConfig, DEFAULT_START_DELAY_SECS};

// Collaborators
pub use confirm::{AssumeYes, Confirmer};
pub use publisher::{
    DeploymentDescriptor, ImportSource, PublishedSubnet, Publisher, RepoPublisher,
    SubnetDescriptor, VmDescriptor,
};

// Authorization
pub use authorization::{
    choose_signing_path, required_authorizers, validate_control_policy, SigningPath,
};

// Operations
pub use deploy::{chain_vm_id, with_evm_chain_id, DeployOutcome, DeployRequest};
pub use elastic::{StakeRequest, TransformRequest};
pub use join::{merge_tracked_subnets, JoinOutcome, JoinRequest, TRACK_SUBNETS_KEY};
pub use subnet::{CreateRequest, SubnetDescription, VmSelection};
pub use subnet_ops::{SubnetOperations, TxOutcome};
pub use transaction::{sign_artifact, verify_signatures, CommitOutcome};
pub use validators::{AddValidatorRequest, RemoveValidatorRequest};
