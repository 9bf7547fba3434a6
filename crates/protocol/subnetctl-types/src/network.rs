//! Network targets and the per-invocation selection of one.

use serde::{Deserialize, Serialize};

/// A deployment destination. Targets are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Network {
    /// Local test network run by the node runtime on this machine
    Local,
    /// Public test network
    Testnet,
    /// Public main network
    Mainnet,
}

impl Network {
    /// All targets, in display order.
    pub const ALL: [Network; 3] = [Network::Local, Network::Testnet, Network::Mainnet];

    /// Whether this is a public network (test or main).
    pub fn is_public(&self) -> bool {
        !matches!(self, Network::Local)
    }

    /// Stable lowercase name, used in file names and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Local => "local",
            Network::Testnet => "testnet",
            Network::Mainnet => "mainnet",
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The network an operation targets, plus whether public paths should be
/// exercised against the local network instead.
///
/// State is always recorded under `target`; only the endpoint that receives
/// submissions changes when `simulate_public` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkSelection {
    /// Where state is recorded and which guards apply.
    pub target: Network,
    /// Route public-network submissions to the local network.
    pub simulate_public: bool,
}

impl NetworkSelection {
    /// Select a network without simulation.
    pub fn new(target: Network) -> Self {
        Self {
            target,
            simulate_public: false,
        }
    }

    /// Select a network, simulating public paths locally when requested.
    pub fn simulated(target: Network, simulate_public: bool) -> Self {
        Self {
            target,
            simulate_public,
        }
    }

    /// The network that actually receives submissions.
    pub fn endpoint(&self) -> Network {
        if self.simulate_public && self.target.is_public() {
            Network::Local
        } else {
            self.target
        }
    }
}

impl From<Network> for NetworkSelection {
    fn from(target: Network) -> Self {
        Self::new(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_json_names() {
        assert_eq!(serde_json::to_string(&Network::Testnet).unwrap(), "\"testnet\"");
        let back: Network = serde_json::from_str("\"mainnet\"").unwrap();
        assert_eq!(back, Network::Mainnet);
    }

    #[test]
    fn test_simulation_redirects_public_endpoint_only() {
        let sel = NetworkSelection::simulated(Network::Testnet, true);
        assert_eq!(sel.endpoint(), Network::Local);
        assert_eq!(sel.target, Network::Testnet);

        let local = NetworkSelection::simulated(Network::Local, true);
        assert_eq!(local.endpoint(), Network::Local);

        let real = NetworkSelection::new(Network::Mainnet);
        assert_eq!(real.endpoint(), Network::Mainnet);
    }
}
