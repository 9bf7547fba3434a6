//! Data structures for subnet lifecycle management.
//!
//! This crate holds the types every other subnetctl crate agrees on. It
//! contains no I/O, only type definitions, validation and serialization.
//!
//! # Module Organization
//!
//! - [`network`] - Network targets and per-invocation selection
//! - [`vm`] - The closed set of VM kinds
//! - [`version`] - Release versions and version requests
//! - [`sidecar`] - Sidecar, per-network state, validators, elastic parameters
//! - [`transaction`] - Transaction payloads and the multisig artifact
//! - [`constants`] - Limits and defaults
//! - [`error`] - Error codes and validation errors
//!
//! # Example
//!
//! ```
//! use subnetctl_types::{Network, NetworkState, Sidecar, SubnetId, Vm, SemVer};
//!
//! let mut sidecar = Sidecar::new("sub1", Vm::SubnetEvm { version: SemVer::new(0, 5, 11) }, 26);
//! assert!(!sidecar.is_deployed(Network::Local));
//!
//! sidecar.networks.insert(
//!     Network::Local,
//!     NetworkState::new(SubnetId::new("subnet-id"), vec![], 1),
//! );
//! assert!(sidecar.is_deployed(Network::Local));
//! ```
//!
//! # Type Conventions
//!
//! - Maps are `BTreeMap`/`BTreeSet` so serialized files are byte-stable
//! - Enums serialize as `snake_case`
//! - Tagged enums use a `kind` field

/// Crate version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod constants;
pub mod error;
pub mod network;
pub mod sidecar;
pub mod transaction;
pub mod version;
pub mod vm;

pub use subnetctl_crypto::Timestamp;

pub use constants::*;
pub use error::{ErrorCode, Result, TypesError};
pub use network::{Network, NetworkSelection};
pub use sidecar::{
    validate_subnet_name, ChainId, Delegation, ElasticConfig, NetworkState, NodeId, Sidecar,
    SubnetId, ValidatorRecord,
};
pub use transaction::{
    SignatureRecord, SignedTransaction, TransactionArtifact, TxKind, TxPayload, TxStatus,
};
pub use version::{SemVer, VersionRequest};
pub use vm::Vm;

/// Current time in milliseconds since the Unix epoch.
pub fn current_timestamp() -> Timestamp {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as Timestamp)
        .unwrap_or(0)
}
