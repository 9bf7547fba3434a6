//! Endpoint configuration for the control plane.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use subnetctl_types::Network;

/// Default local node endpoint.
pub const DEFAULT_LOCAL_ENDPOINT: &str = "http://127.0.0.1:9650";

/// Default public test network endpoint.
pub const DEFAULT_TESTNET_ENDPOINT: &str = "https://api.avax-test.network";

/// Default public main network endpoint.
pub const DEFAULT_MAINNET_ENDPOINT: &str = "https://api.avax.network";

/// Where each network's node is reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlPlaneConfig {
    pub local_endpoint: String,
    pub testnet_endpoint: String,
    pub mainnet_endpoint: String,
    /// HTTP request timeout. This is the collaborator's own policy; callers do not add one.
    pub request_timeout: Duration,
}

impl Default for ControlPlaneConfig {
    fn default() -> Self {
        Self {
            local_endpoint: DEFAULT_LOCAL_ENDPOINT.to_string(),
            testnet_endpoint: DEFAULT_TESTNET_ENDPOINT.to_string(),
            mainnet_endpoint: DEFAULT_MAINNET_ENDPOINT.to_string(),
            request_timeout: Duration::from_secs(120),
        }
    }
}

impl ControlPlaneConfig {
    /// Set the endpoint of one network.
    pub fn with_endpoint(mut self, network: Network, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        match network {
            Network::Local => self.local_endpoint = endpoint,
            Network::Testnet => self.testnet_endpoint = endpoint,
            Network::Mainnet => self.mainnet_endpoint = endpoint,
        }
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Endpoint for a network, without a trailing slash.
    pub fn endpoint(&self, network: Network) -> &str {
        let raw = match network {
            Network::Local => &self.local_endpoint,
            Network::Testnet => &self.testnet_endpoint,
            Network::Mainnet => &self.mainnet_endpoint,
        };
        raw.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_override_and_trim() {
        let config = ControlPlaneConfig::default().with_endpoint(Network::Local, "http://10.0.0.2:9650/");
        assert_eq!(config.endpoint(Network::Local), "http://10.0.0.2:9650");
        assert_eq!(config.endpoint(Network::Mainnet), DEFAULT_MAINNET_ENDPOINT);
    }
}
