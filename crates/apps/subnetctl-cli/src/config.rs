//! CLI configuration.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use subnetctl_node::config::{
    DEFAULT_LOCAL_ENDPOINT, DEFAULT_MAINNET_ENDPOINT, DEFAULT_TESTNET_ENDPOINT,
};
use subnetctl_node::ControlPlaneConfig;
use subnetctl_store::{default_data_dir, write_atomic};
use subnetctl_types::Network;

use crate::error::{CliError, CliResult};

static ENV_VAR: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").ok());

/// Expand environment variables in a string.
/// Supports `${VAR_NAME}` syntax. Unset variables are left as written.
fn expand_env_vars(input: &str) -> String {
    let Some(re) = ENV_VAR.as_ref() else {
        return input.to_string();
    };
    re.replace_all(input, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| caps[0].to_string())
    })
    .to_string()
}

/// CLI configuration loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Node endpoints.
    pub network: NetworkConfigSection,
    /// Version compatibility.
    pub versions: VersionsConfig,
    /// Key defaults.
    pub keys: KeysConfig,
}

impl CliConfig {
    /// Load configuration from a file.
    /// Environment variables in `${VAR}` format are expanded in endpoint URLs.
    pub fn load(path: &Path) -> CliResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&contents)?;

        for endpoint in [
            &mut config.network.local,
            &mut config.network.testnet,
            &mut config.network.mainnet,
        ] {
            endpoint.endpoint = expand_env_vars(&endpoint.endpoint);
        }

        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> CliResult<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::config(format!("Failed to serialize config: {}", e)))?;
        write_atomic(path, contents.as_bytes())?;
        Ok(())
    }

    /// Get the base directory for all subnetctl data.
    pub fn base_dir(&self) -> PathBuf {
        self.storage.base_dir.clone()
    }

    /// Control plane settings for every network.
    pub fn control_plane(&self) -> ControlPlaneConfig {
        ControlPlaneConfig::default()
            .with_endpoint(Network::Local, &self.network.local.endpoint)
            .with_endpoint(Network::Testnet, &self.network.testnet.endpoint)
            .with_endpoint(Network::Mainnet, &self.network.mainnet.endpoint)
            .with_timeout(Duration::from_secs(self.network.request_timeout_secs))
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root of all persisted state.
    pub base_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_dir: default_data_dir(),
        }
    }
}

/// Network configuration section in CLI config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfigSection {
    pub local: EndpointConfig,
    pub testnet: EndpointConfig,
    pub mainnet: EndpointConfig,
    /// Timeout of each control-plane request (seconds).
    pub request_timeout_secs: u64,
}

impl Default for NetworkConfigSection {
    fn default() -> Self {
        Self {
            local: EndpointConfig::new(DEFAULT_LOCAL_ENDPOINT),
            testnet: EndpointConfig::new(DEFAULT_TESTNET_ENDPOINT),
            mainnet: EndpointConfig::new(DEFAULT_MAINNET_ENDPOINT),
            request_timeout_secs: 120,
        }
    }
}

/// Endpoint of one network's node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub endpoint: String,
}

impl EndpointConfig {
    fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
        }
    }
}

/// Version compatibility configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionsConfig {
    /// JSON compatibility table used instead of the built-in one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compatibility_file: Option<PathBuf>,
}

/// Key configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeysConfig {
    /// Key that pays fees on public networks when a command names none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_key: Option<String>,
}

/// Get the default config file path.
pub fn default_config_path() -> PathBuf {
    default_data_dir().join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert_eq!(config.network.local.endpoint, DEFAULT_LOCAL_ENDPOINT);
        assert_eq!(config.network.request_timeout_secs, 120);
        assert!(config.keys.default_key.is_none());
        assert!(config.versions.compatibility_file.is_none());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = CliConfig::load(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.network.testnet.endpoint, DEFAULT_TESTNET_ENDPOINT);
    }

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = CliConfig::default();
        config.storage.base_dir = temp_dir.path().join("data");
        config.keys.default_key = Some("payer".to_string());
        config.save(&path).unwrap();

        let loaded = CliConfig::load(&path).unwrap();
        assert_eq!(loaded.base_dir(), temp_dir.path().join("data"));
        assert_eq!(loaded.keys.default_key.as_deref(), Some("payer"));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[network]\nrequest_timeout_secs = 5\n\n[network.testnet]\nendpoint = \"http://10.0.0.1:9650\"\n",
        )
        .unwrap();

        let config = CliConfig::load(&path).unwrap();
        assert_eq!(config.network.request_timeout_secs, 5);
        assert_eq!(config.network.testnet.endpoint, "http://10.0.0.1:9650");
        assert_eq!(config.network.mainnet.endpoint, DEFAULT_MAINNET_ENDPOINT);

        let control_plane = config.control_plane();
        assert_eq!(control_plane.endpoint(Network::Testnet), "http://10.0.0.1:9650");
        assert_eq!(control_plane.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_expand_env_vars() {
        std::env::set_var("SUBNETCTL_TEST_ENDPOINT", "http://node.internal:9650");

        let result = super::expand_env_vars("${SUBNETCTL_TEST_ENDPOINT}");
        assert_eq!(result, "http://node.internal:9650");

        // Unset variable should remain as-is
        let result_unset = super::expand_env_vars("${NONEXISTENT_VAR_12345}");
        assert_eq!(result_unset, "${NONEXISTENT_VAR_12345}");

        let mixed = super::expand_env_vars("${SUBNETCTL_TEST_ENDPOINT}/ext/bc/P");
        assert_eq!(mixed, "http://node.internal:9650/ext/bc/P");

        std::env::remove_var("SUBNETCTL_TEST_ENDPOINT");
    }
}
