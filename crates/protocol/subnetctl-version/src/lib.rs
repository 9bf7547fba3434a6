//! VM and node runtime version compatibility.
//!
//! A subnet's VM speaks one protocol version (`rpcchainvm`); a node runtime
//! release supports exactly one. Deploying is only safe when the two match.
//! This crate answers two questions:
//!
//! - Which runtime release should run a given VM release? ([`VersionResolver::resolve_runtime_version`])
//! - Which protocol version does this VM binary speak? ([`VersionResolver::extract_protocol_version`])
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use subnetctl_types::VersionRequest;
//! use subnetctl_version::{CompatibilityTable, ProcessInspector, VersionResolver};
//!
//! let resolver = VersionResolver::new(
//!     CompatibilityTable::embedded().unwrap(),
//!     Arc::new(ProcessInspector::new()),
//! );
//! let resolved = resolver.resolve_runtime_version(VersionRequest::Latest).unwrap();
//! println!("run {} with runtime {}", resolved.vm_version, resolved.runtime_version);
//! ```

pub mod error;
pub mod inspector;
pub mod resolver;
pub mod table;

pub use error::{VersionError, VersionResult};
pub use inspector::{parse_protocol_version, ProcessInspector, VmInspector};
pub use resolver::{ResolvedVersions, VersionResolver};
pub use table::CompatibilityTable;
