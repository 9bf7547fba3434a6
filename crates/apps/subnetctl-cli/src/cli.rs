//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use subnetctl_crypto::Address;
use subnetctl_types::{Network, NetworkSelection, NodeId, SemVer, VersionRequest};

use crate::output::OutputFormat;

/// Subnet lifecycle manager.
#[derive(Parser, Debug)]
#[command(name = "subnetctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, global = true, default_value = "human")]
    pub format: OutputFormatArg,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Send public-network transactions to the local network instead.
    /// State is still recorded under the selected network.
    #[arg(long, global = true, env = "SUBNETCTL_SIMULATE_PUBLIC_NETWORK")]
    pub simulate_public: bool,
}

/// Output format argument.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormatArg {
    #[default]
    Human,
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

/// Network target. Exactly one must be given.
#[derive(Args, Debug, Clone, Copy)]
#[group(required = true, multiple = false)]
pub struct NetworkArgs {
    /// Target the local network.
    #[arg(short, long)]
    pub local: bool,

    /// Target the public test network.
    #[arg(long, visible_alias = "fuji")]
    pub testnet: bool,

    /// Target the public main network.
    #[arg(long)]
    pub mainnet: bool,
}

impl NetworkArgs {
    pub fn network(&self) -> Network {
        if self.mainnet {
            Network::Mainnet
        } else if self.testnet {
            Network::Testnet
        } else {
            Network::Local
        }
    }

    /// Selection for this invocation.
    pub fn selection(&self, simulate_public: bool) -> NetworkSelection {
        NetworkSelection::simulated(self.network(), simulate_public)
    }
}

/// Control-key authorization arguments shared by subnet-changing commands.
#[derive(Args, Debug, Clone, Default)]
pub struct AuthArgs {
    /// Control keys that sign this change (comma-separated addresses).
    /// Defaults to the first `threshold` control keys.
    #[arg(long, value_delimiter = ',')]
    pub subnet_auth_keys: Vec<Address>,

    /// Where to write the transaction if it needs more signatures.
    #[arg(long)]
    pub output_tx_path: Option<PathBuf>,
}

/// Stake arguments shared by `join --elastic` and `delegate`.
#[derive(Args, Debug, Clone)]
pub struct StakeArgs {
    /// Stake amount in the subnet's token.
    #[arg(long)]
    pub stake_amount: Option<u64>,

    /// Staking period (e.g. `14d`, `48h`, `3600`).
    #[arg(long, value_parser = parse_duration)]
    pub stake_duration: Option<u64>,

    /// Staking start (Unix seconds). Defaults to shortly from now.
    #[arg(long)]
    pub start_time: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    // =========================================================================
    // Subnet Configuration
    // =========================================================================
    /// Create a subnet configuration.
    Create {
        /// Subnet name.
        name: String,

        /// Genesis file.
        #[arg(long)]
        genesis: PathBuf,

        /// Subnet-EVM version (`latest` or `vX.Y.Z`).
        #[arg(long, default_value = "latest", conflicts_with = "custom_vm")]
        vm_version: VersionRequest,

        /// Use a custom VM binary instead of Subnet-EVM.
        #[arg(long)]
        custom_vm: Option<PathBuf>,

        /// Native token name.
        #[arg(long)]
        token_name: Option<String>,

        /// Overwrite an existing subnet of the same name.
        #[arg(long)]
        force: bool,
    },

    /// Install chain configuration overlays.
    Configure {
        /// Subnet name.
        name: String,

        /// Chain config file.
        #[arg(long)]
        chain_config: Option<PathBuf>,

        /// Per-node chain config file.
        #[arg(long)]
        per_node_chain_config: Option<PathBuf>,
    },

    /// Delete a subnet configuration.
    Delete {
        /// Subnet name.
        name: String,

        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },

    /// Import a published subnet (`<repo>/<subnet>`).
    Import {
        /// Import source.
        source: String,

        /// Store the subnet under a different name.
        #[arg(long)]
        name: Option<String>,
    },

    /// Show a subnet's configuration and deployments.
    Describe {
        /// Subnet name.
        name: String,
    },

    /// List subnets.
    List,

    // =========================================================================
    // Deployment
    // =========================================================================
    /// Deploy a subnet and its chain.
    Deploy {
        /// Subnet name.
        name: String,

        #[command(flatten)]
        network: NetworkArgs,

        /// Control keys of the subnet (comma-separated addresses).
        /// Defaults to the fee key's address on public networks.
        #[arg(long, value_delimiter = ',')]
        control_keys: Vec<Address>,

        /// Signatures required to change the subnet.
        #[arg(long)]
        threshold: Option<u32>,

        /// Runtime release to run instead of the resolved one.
        #[arg(long)]
        runtime_version: Option<SemVer>,

        /// EVM chain id for the main network genesis.
        #[arg(long)]
        mainnet_chain_id: Option<u64>,

        /// Key paying transaction fees.
        #[arg(short, long)]
        key: Option<String>,

        #[command(flatten)]
        auth: AuthArgs,
    },

    /// Configure a node to validate a subnet.
    Join {
        /// Subnet name.
        name: String,

        #[command(flatten)]
        network: NetworkArgs,

        /// Node config file to update.
        #[arg(long)]
        node_config: Option<PathBuf>,

        /// Node plugin directory to install the VM into.
        #[arg(long)]
        plugin_dir: Option<PathBuf>,

        /// Replace the tracked subnet list instead of extending it.
        #[arg(long)]
        force_write: bool,

        /// Stake the node into an elastic subnet.
        #[arg(long, requires_all = ["node_id", "stake_amount", "stake_duration"])]
        elastic: bool,

        /// Node to stake.
        #[arg(long, value_parser = parse_node_id)]
        node_id: Option<NodeId>,

        #[command(flatten)]
        stake: StakeArgs,

        /// Key owning the stake.
        #[arg(short, long)]
        key: Option<String>,
    },

    /// Add a permissioned validator.
    AddValidator {
        /// Subnet name.
        name: String,

        #[command(flatten)]
        network: NetworkArgs,

        /// Validator node id.
        #[arg(long, value_parser = parse_node_id)]
        node_id: NodeId,

        /// Consensus weight.
        #[arg(long)]
        weight: Option<u64>,

        /// Validation start (Unix seconds). Defaults to shortly from now.
        #[arg(long)]
        start_time: Option<u64>,

        /// Validation period (e.g. `14d`, `48h`, `3600`).
        #[arg(long, value_parser = parse_duration)]
        duration: u64,

        #[command(flatten)]
        auth: AuthArgs,
    },

    /// Remove a validator.
    RemoveValidator {
        /// Subnet name.
        name: String,

        #[command(flatten)]
        network: NetworkArgs,

        /// Validator node id.
        #[arg(long, value_parser = parse_node_id)]
        node_id: NodeId,

        #[command(flatten)]
        auth: AuthArgs,
    },

    /// Convert a subnet to permissionless staking.
    Transform {
        /// Subnet name.
        name: String,

        #[command(flatten)]
        network: NetworkArgs,

        /// Staking token name.
        #[arg(long, required_unless_present = "elastic_config")]
        token_name: Option<String>,

        /// Staking token symbol.
        #[arg(long, required_unless_present = "elastic_config")]
        token_symbol: Option<String>,

        /// Token denomination.
        #[arg(long, default_value_t = 9)]
        denomination: u8,

        /// Full elastic parameters as JSON, instead of the defaults.
        #[arg(long, conflicts_with_all = ["token_name", "token_symbol"])]
        elastic_config: Option<PathBuf>,

        /// Re-add recorded validators as permissionless ones with this stake.
        #[arg(long)]
        transform_validators: Option<u64>,

        /// Key paying for re-added validators' stake.
        #[arg(short, long)]
        key: Option<String>,

        #[command(flatten)]
        auth: AuthArgs,
    },

    /// Delegate stake to a validator of an elastic subnet.
    Delegate {
        /// Subnet name.
        name: String,

        #[command(flatten)]
        network: NetworkArgs,

        /// Validator to delegate to.
        #[arg(long, value_parser = parse_node_id)]
        node_id: NodeId,

        /// Stake amount in the subnet's token.
        #[arg(long)]
        stake_amount: u64,

        /// Delegation period (e.g. `14d`, `48h`, `3600`).
        #[arg(long, value_parser = parse_duration)]
        duration: u64,

        /// Delegation start (Unix seconds). Defaults to shortly from now.
        #[arg(long)]
        start_time: Option<u64>,

        /// Key owning the stake.
        #[arg(short, long)]
        key: Option<String>,
    },

    /// Attach the ids of an existing deployment.
    Register {
        /// Subnet name.
        name: String,

        #[command(flatten)]
        network: NetworkArgs,

        /// Subnet id on the network.
        #[arg(long)]
        subnet_id: String,

        /// Chain id on the network.
        #[arg(long)]
        chain_id: Option<String>,

        /// Control keys of the subnet (comma-separated addresses).
        #[arg(long, value_delimiter = ',')]
        control_keys: Vec<Address>,

        /// Signatures required to change the subnet.
        #[arg(long, default_value_t = 0)]
        threshold: u32,

        /// Replace an existing entry.
        #[arg(long)]
        force: bool,
    },

    // =========================================================================
    // Network Queries
    // =========================================================================
    /// List a subnet's current validators.
    Validators {
        /// Subnet name.
        name: String,

        #[command(flatten)]
        network: NetworkArgs,
    },

    /// Show subnet statistics.
    Stats {
        /// Subnet name.
        name: String,

        #[command(flatten)]
        network: NetworkArgs,
    },

    // =========================================================================
    // Transactions and Keys
    // =========================================================================
    /// Sign or commit transaction files.
    #[command(subcommand)]
    Transaction(TransactionCommands),

    /// Manage local keys.
    #[command(subcommand)]
    Key(KeyCommands),

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Subcommand, Debug)]
pub enum TransactionCommands {
    /// Add a signature to a transaction file.
    Sign {
        /// Transaction file.
        path: PathBuf,

        /// Key to sign with.
        #[arg(short, long)]
        key: String,
    },

    /// Submit a fully signed transaction file.
    Commit {
        /// Transaction file.
        path: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum KeyCommands {
    /// Import an existing key file.
    Import {
        /// Key name.
        name: String,

        /// File holding the base58 private key.
        file: PathBuf,

        /// Replace a key of the same name.
        #[arg(long)]
        force: bool,
    },

    /// List keys.
    List,

    /// Delete a key.
    Delete {
        /// Key name.
        name: String,

        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },
}

/// Shell for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Parse a node id argument.
pub fn parse_node_id(s: &str) -> Result<NodeId, String> {
    NodeId::parse(s).map_err(|e| e.to_string())
}

/// Parse a duration in seconds, with an optional `s`, `m`, `h` or `d` suffix.
pub fn parse_duration(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let (digits, unit) = match s.char_indices().last() {
        Some((i, c)) if c.is_ascii_alphabetic() => (&s[..i], c),
        _ => (s, 's'),
    };
    let value: u64 = digits
        .parse()
        .map_err(|_| format!("invalid duration '{}'", s))?;
    let scale = match unit {
        's' => 1,
        'm' => 60,
        'h' => 60 * 60,
        'd' => 24 * 60 * 60,
        _ => return Err(format!("unknown duration unit '{}' in '{}'", unit, s)),
    };
    value
        .checked_mul(scale)
        .ok_or_else(|| format!("duration '{}' is too large", s))
}
