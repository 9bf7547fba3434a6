//! Output formatting for CLI commands.

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;
use subnetctl_node::{SubnetStats, ValidatorInfo};
use subnetctl_ops::{DeployOutcome, JoinOutcome, SubnetDescription, TxOutcome};
use subnetctl_store::KeyInfo;
use subnetctl_types::{Network, NetworkState, Sidecar, TransactionArtifact, TxStatus};

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "text" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use 'human' or 'json'.", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Human => write!(f, "human"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Trait for renderable output.
pub trait Render {
    /// Render as human-readable string.
    fn render_human(&self) -> String;

    /// Render as JSON string.
    fn render_json(&self) -> String;

    /// Render in the specified format.
    fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Human => self.render_human(),
            OutputFormat::Json => self.render_json(),
        }
    }
}

/// One line per transaction outcome.
fn render_tx_outcome(outcome: &TxOutcome) -> String {
    match outcome {
        TxOutcome::Committed { tx_id } => format!("{} {}", "Committed:".green(), tx_id),
        TxOutcome::Pending {
            path,
            pending_signers,
        } => {
            let signers = pending_signers
                .iter()
                .map(|a| a.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "{} {}\n{} {}\n{}",
                "Transaction saved to:".yellow().bold(),
                path.display(),
                "Awaiting signatures from:".yellow(),
                signers,
                "Sign with 'subnetctl transaction sign', then 'subnetctl transaction commit'.".dimmed()
            )
        }
    }
}

fn render_network_state(network: Network, state: &NetworkState) -> String {
    let mut lines = vec![format!("  {}", network.to_string().bold())];
    lines.push(format!("    Subnet ID:  {}", state.subnet_id));
    match &state.chain_id {
        Some(chain_id) => lines.push(format!("    Chain ID:   {}", chain_id)),
        None => lines.push(format!("    Chain ID:   {}", "(pending)".yellow())),
    }
    lines.push(format!(
        "    Threshold:  {} of {}",
        state.threshold,
        state.control_keys.len()
    ));
    if let Some(runtime) = &state.runtime_version {
        lines.push(format!("    Runtime:    {}", runtime));
    }
    if state.elastic {
        let asset = state
            .elastic_config
            .as_ref()
            .and_then(|c| c.asset_id.as_deref())
            .unwrap_or("-");
        lines.push(format!("    Elastic:    yes (asset {})", asset));
    }
    if !state.validators.is_empty() {
        lines.push(format!("    Validators: {}", state.validators.len()));
    }
    lines.join("\n")
}

// =============================================================================
// Subnet Output Types
// =============================================================================

/// Output for `create` and `import`.
#[derive(Debug, Serialize)]
pub struct SubnetCreatedOutput {
    pub sidecar: Sidecar,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imported_from: Option<String>,
}

impl Render for SubnetCreatedOutput {
    fn render_human(&self) -> String {
        let verb = if self.imported_from.is_some() {
            "Imported subnet:"
        } else {
            "Created subnet:"
        };
        let mut lines = vec![format!("{} {}", verb.green().bold(), self.sidecar.name)];
        lines.push(format!(
            "  VM:           {} {}",
            self.sidecar.vm.kind_name(),
            self.sidecar.vm.version_label()
        ));
        lines.push(format!("  RPC version:  {}", self.sidecar.rpc_version));
        if let Some(source) = &self.imported_from {
            lines.push(format!("  Source:       {}", source));
        }
        lines.join("\n")
    }

    fn render_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Output for `configure`.
#[derive(Debug, Serialize)]
pub struct ConfigureOutput {
    pub subnet: String,
    pub written: Vec<PathBuf>,
}

impl Render for ConfigureOutput {
    fn render_human(&self) -> String {
        let mut lines = vec![format!("{} {}", "Configured subnet:".green().bold(), self.subnet)];
        for path in &self.written {
            lines.push(format!("  {}", path.display()));
        }
        lines.join("\n")
    }

    fn render_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Output for `delete`.
#[derive(Debug, Serialize)]
pub struct DeleteOutput {
    pub subnet: String,
}

impl Render for DeleteOutput {
    fn render_human(&self) -> String {
        format!("{} {}", "Deleted subnet:".green().bold(), self.subnet)
    }

    fn render_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Output for `describe`.
#[derive(Debug, Serialize)]
pub struct DescribeOutput {
    #[serde(flatten)]
    pub description: SubnetDescription,
}

impl Render for DescribeOutput {
    fn render_human(&self) -> String {
        let sidecar = &self.description.sidecar;
        let mut lines = vec![format!("{} {}", "Subnet:".bold(), sidecar.name)];
        lines.push(format!(
            "  VM:           {} {}",
            sidecar.vm.kind_name(),
            sidecar.vm.version_label()
        ));
        lines.push(format!("  RPC version:  {}", sidecar.rpc_version));
        if let Some(token) = &sidecar.token_name {
            lines.push(format!("  Token:        {}", token));
        }
        if let Some(source) = &sidecar.imported_from {
            lines.push(format!("  Imported:     {}", source));
        }
        lines.push(format!(
            "  Files:        {}",
            self.description.bundle_files.join(", ")
        ));
        if let Some(binary) = &self.description.vm_binary {
            lines.push(format!("  VM binary:    {}", binary.display()));
        }

        if sidecar.networks.is_empty() {
            lines.push(format!("\n{}", "Not deployed.".dimmed()));
        } else {
            lines.push(format!("\n{}", "Deployments:".bold()));
            for (network, state) in &sidecar.networks {
                lines.push(render_network_state(*network, state));
            }
        }
        lines.join("\n")
    }

    fn render_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Output for `list`.
#[derive(Debug, Serialize)]
pub struct ListOutput {
    pub subnets: Vec<String>,
}

impl Render for ListOutput {
    fn render_human(&self) -> String {
        if self.subnets.is_empty() {
            return "No subnets. Create one with 'subnetctl create'.".dimmed().to_string();
        }
        let mut lines = vec![format!("{} ({})", "Subnets".bold(), self.subnets.len())];
        lines.extend(self.subnets.iter().map(|name| format!("  {}", name)));
        lines.join("\n")
    }

    fn render_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

// =============================================================================
// Network Output Types
// =============================================================================

/// Output for `deploy`.
#[derive(Debug, Serialize)]
pub struct DeployOutput {
    pub subnet: String,
    pub network: Network,
    #[serde(flatten)]
    pub outcome: DeployOutcome,
}

impl Render for DeployOutput {
    fn render_human(&self) -> String {
        let mut lines = vec![format!(
            "{} {} to {}",
            "Deployed".green().bold(),
            self.subnet,
            self.network
        )];
        lines.push(format!("  Subnet ID:  {}", self.outcome.subnet_id));
        if let Some(chain_id) = &self.outcome.chain_id {
            lines.push(format!("  Chain ID:   {}", chain_id));
        }
        lines.push(format!("  Runtime:    {}", self.outcome.runtime_version));
        lines.push(render_tx_outcome(&self.outcome.chain_creation));
        lines.join("\n")
    }

    fn render_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Output for operations that produce a single transaction.
#[derive(Debug, Serialize)]
pub struct TxOutput {
    pub operation: &'static str,
    pub subnet: String,
    pub network: Network,
    pub outcome: TxOutcome,
}

impl Render for TxOutput {
    fn render_human(&self) -> String {
        format!(
            "{} {} on {}\n{}",
            self.operation.bold(),
            self.subnet,
            self.network,
            render_tx_outcome(&self.outcome)
        )
    }

    fn render_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Output for `join`.
#[derive(Debug, Serialize)]
pub struct JoinOutput {
    pub subnet: String,
    pub network: Network,
    #[serde(flatten)]
    pub outcome: JoinOutcome,
}

impl Render for JoinOutput {
    fn render_human(&self) -> String {
        let mut lines = vec![format!(
            "{} {} on {} ({})",
            "Joined".green().bold(),
            self.subnet,
            self.network,
            self.outcome.subnet_id
        )];
        match &self.outcome.node_config {
            Some(path) => lines.push(format!("  Node config: {}", path.display())),
            None => lines.push(format!(
                "  Add {} to the node's track-subnets setting.",
                self.outcome.subnet_id
            )),
        }
        if let Some(plugin) = &self.outcome.plugin {
            lines.push(format!("  VM plugin:   {}", plugin.display()));
        }
        if let Some(stake) = &self.outcome.stake {
            lines.push(render_tx_outcome(stake));
        }
        lines.join("\n")
    }

    fn render_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Output for `validators`.
#[derive(Debug, Serialize)]
pub struct ValidatorsOutput {
    pub subnet: String,
    pub network: Network,
    pub validators: Vec<ValidatorInfo>,
}

impl Render for ValidatorsOutput {
    fn render_human(&self) -> String {
        if self.validators.is_empty() {
            return format!("No validators for {} on {}.", self.subnet, self.network);
        }
        let mut lines = vec![format!(
            "{} {} on {} ({})",
            "Validators of".bold(),
            self.subnet,
            self.network,
            self.validators.len()
        )];
        for v in &self.validators {
            let status = if v.connected {
                "connected".green()
            } else {
                "disconnected".red()
            };
            let stake = v
                .stake_amount
                .map(|s| format!("  stake {}", s))
                .unwrap_or_default();
            lines.push(format!(
                "  {}  weight {}  until {}  {}{}",
                v.node_id, v.weight, v.end_time, status, stake
            ));
        }
        lines.join("\n")
    }

    fn render_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Output for `stats`.
#[derive(Debug, Serialize)]
pub struct StatsOutput {
    pub subnet: String,
    pub network: Network,
    #[serde(flatten)]
    pub stats: SubnetStats,
}

impl Render for StatsOutput {
    fn render_human(&self) -> String {
        let mut lines = vec![format!("{} {} on {}", "Stats for".bold(), self.subnet, self.network)];
        lines.push(format!("  Subnet ID:   {}", self.stats.subnet_id));
        if let Some(chain_id) = &self.stats.chain_id {
            lines.push(format!("  Chain ID:    {}", chain_id));
        }
        lines.push(format!(
            "  Validators:  {} ({} connected)",
            self.stats.validator_count, self.stats.connected_validators
        ));
        lines.push(format!("  Weight:      {}", self.stats.total_weight));
        if let Some(height) = self.stats.height {
            lines.push(format!("  Height:      {}", height));
        }
        lines.join("\n")
    }

    fn render_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Output for `register`.
#[derive(Debug, Serialize)]
pub struct RegisterOutput {
    pub subnet: String,
    pub network: Network,
    pub state: NetworkState,
}

impl Render for RegisterOutput {
    fn render_human(&self) -> String {
        format!(
            "{} {}\n{}",
            "Registered deployment of".green().bold(),
            self.subnet,
            render_network_state(self.network, &self.state)
        )
    }

    fn render_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

// =============================================================================
// Transaction Output Types
// =============================================================================

/// Output for `transaction sign`.
#[derive(Debug, Serialize)]
pub struct SignOutput {
    pub path: PathBuf,
    pub artifact: TransactionArtifact,
}

impl Render for SignOutput {
    fn render_human(&self) -> String {
        let a = &self.artifact;
        let mut lines = vec![format!(
            "{} {} ({} for {} on {})",
            "Signed:".green().bold(),
            self.path.display(),
            a.kind(),
            a.subnet,
            a.network
        )];
        lines.push(format!(
            "  Signatures: {} of {}",
            a.signatures.len(),
            a.threshold
        ));
        if a.status == TxStatus::ReadyToCommit {
            lines.push(format!(
                "  {}",
                "Ready. Submit with 'subnetctl transaction commit'.".green()
            ));
        } else {
            let pending = a
                .pending_signers()
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(format!("  Awaiting:   {}", pending));
        }
        lines.join("\n")
    }

    fn render_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Output for `transaction commit`.
#[derive(Debug, Serialize)]
pub struct CommitOutput {
    pub path: PathBuf,
    pub tx_id: String,
    pub artifact: TransactionArtifact,
}

impl Render for CommitOutput {
    fn render_human(&self) -> String {
        format!(
            "{} {} for {} on {}\n  Transaction ID: {}",
            "Committed".green().bold(),
            self.artifact.kind(),
            self.artifact.subnet,
            self.artifact.network,
            self.tx_id
        )
    }

    fn render_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

// =============================================================================
// Key Output Types
// =============================================================================

/// Output for `key import`.
#[derive(Debug, Serialize)]
pub struct KeyImportOutput {
    #[serde(flatten)]
    pub key: KeyInfo,
}

impl Render for KeyImportOutput {
    fn render_human(&self) -> String {
        format!(
            "{} {}\n  Address: {}",
            "Imported key:".green().bold(),
            self.key.name,
            self.key.address
        )
    }

    fn render_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Output for `key list`.
#[derive(Debug, Serialize)]
pub struct KeyListOutput {
    pub keys: Vec<KeyInfo>,
}

impl Render for KeyListOutput {
    fn render_human(&self) -> String {
        if self.keys.is_empty() {
            return "No keys. Import one with 'subnetctl key import'.".dimmed().to_string();
        }
        let width = self.keys.iter().map(|k| k.name.len()).max().unwrap_or(0);
        let mut lines = vec![format!("{} ({})", "Keys".bold(), self.keys.len())];
        for key in &self.keys {
            lines.push(format!("  {:width$}  {}", key.name, key.address, width = width));
        }
        lines.join("\n")
    }

    fn render_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Output for `key delete`.
#[derive(Debug, Serialize)]
pub struct KeyDeleteOutput {
    pub name: String,
}

impl Render for KeyDeleteOutput {
    fn render_human(&self) -> String {
        format!("{} {}", "Deleted key:".green().bold(), self.name)
    }

    fn render_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("TEXT".parse::<OutputFormat>().unwrap(), OutputFormat::Human);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_list_output_json() {
        let output = ListOutput {
            subnets: vec!["sub1".to_string(), "sub2".to_string()],
        };
        let json: serde_json::Value =
            serde_json::from_str(&output.render(OutputFormat::Json)).unwrap();
        assert_eq!(json["subnets"][1], "sub2");
    }

    #[test]
    fn test_pending_outcome_mentions_commit() {
        let output = TxOutput {
            operation: "add-validator",
            subnet: "sub1".to_string(),
            network: Network::Testnet,
            outcome: TxOutcome::Pending {
                path: PathBuf::from("/tmp/tx.json"),
                pending_signers: Vec::new(),
            },
        };
        let human = output.render_human();
        assert!(human.contains("/tmp/tx.json"));
        assert!(human.contains("transaction commit"));

        let json: serde_json::Value = serde_json::from_str(&output.render_json()).unwrap();
        assert_eq!(json["outcome"]["status"], "pending");
    }
}
