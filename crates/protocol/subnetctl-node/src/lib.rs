//! Node control-plane client for subnetctl.
//!
//! Everything that touches a running node goes through [`ControlPlane`]:
//! starting the local network, submitting signed transactions and querying
//! validators. The trait keeps the orchestration logic testable against an
//! in-memory mock.
//!
//! # Example
//!
//! ```no_run
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use subnetctl_node::{ControlPlane, ControlPlaneConfig, JsonRpcControlPlane};
//! use subnetctl_types::{Network, SubnetId};
//!
//! let plane = JsonRpcControlPlane::new(ControlPlaneConfig::default())?;
//! let validators = plane.validators(Network::Testnet, &SubnetId::new("2bRC...")).await?;
//! println!("{} validators", validators.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod rpc;
pub mod traits;

pub use config::ControlPlaneConfig;
pub use error::{NodeError, NodeResult};
pub use rpc::JsonRpcControlPlane;
pub use traits::{ControlPlane, SubnetStats, TxReceipt, ValidatorInfo};
