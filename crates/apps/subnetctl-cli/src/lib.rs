//! Command-line interface for managing subnets.
//!
//! This crate provides the `subnetctl` binary. It includes commands for:
//!
//! - **Configuration**: create, configure, import, describe, list, delete
//! - **Deployment**: deploy, join, register an existing deployment
//! - **Validators**: add-validator, remove-validator, validators, stats
//! - **Staking**: transform (elastic conversion), join --elastic, delegate
//! - **Transactions**: sign and commit transaction files for multisig subnets
//! - **Keys**: import, list, delete
//!
//! # Quick Start
//!
//! ```bash
//! # Create an EVM subnet from a genesis file
//! subnetctl create sub1 --genesis genesis.json
//!
//! # Deploy it to the local network
//! subnetctl deploy sub1 --local
//!
//! # Add a validator for two weeks
//! subnetctl add-validator sub1 --local --node-id NodeID-abc --duration 14d
//! ```
//!
//! # Network Selection
//!
//! Network commands take exactly one of `--local`, `--testnet` (`--fuji`) or
//! `--mainnet`. `--simulate-public` (or `SUBNETCTL_SIMULATE_PUBLIC_NETWORK=true`)
//! sends public-network transactions to the local network while recording
//! state under the selected network.
//!
//! # Output Formats
//!
//! All commands support `--format`:
//!
//! - `human` (default): Human-readable with colors
//! - `json`: Machine-readable JSON
//!
//! # Configuration
//!
//! Configuration is loaded from `<data dir>/config.toml`. Override with `--config`.

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod output;
pub mod progress;
pub mod prompt;

// Re-export main types
pub use cli::{Cli, Commands, OutputFormatArg};
pub use config::CliConfig;
pub use context::SubnetContext;
pub use error::{CliError, CliResult};
pub use output::{OutputFormat, Render};
