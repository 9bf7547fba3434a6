//! The sidecar: a subnet's identity, VM choice and per-network deployment state.
//!
//! A network entry in [`Sidecar::networks`] exists exactly when the subnet has
//! been deployed to that network. The entry is created once and afterwards only
//! mutated in place (chain id filled in, validators recorded, elastic flag set).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use subnetctl_crypto::Address;

use crate::constants::*;
use crate::error::{Result, TypesError};
use crate::network::Network;
use crate::vm::Vm;
use crate::Timestamp;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Id the network assigned to a subnet.
    SubnetId
);
string_id!(
    /// Id the network assigned to a subnet's blockchain.
    ChainId
);
string_id!(
    /// Validator node id (`NodeID-...`).
    NodeId
);

impl NodeId {
    /// Parse and validate a node id.
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        match trimmed.strip_prefix(NODE_ID_PREFIX) {
            Some(rest) if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric()) => {
                Ok(Self(trimmed.to_string()))
            }
            _ => Err(TypesError::InvalidNodeId(s.to_string())),
        }
    }
}

/// Validate a subnet name: 1-64 ASCII alphanumerics.
pub fn validate_subnet_name(name: &str) -> Result<()> {
    if name.is_empty()
        || name.len() > MAX_SUBNET_NAME_LENGTH
        || !name.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(TypesError::InvalidSubnetName(name.to_string()));
    }
    Ok(())
}

/// Persisted record describing one subnet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sidecar {
    /// Unique name; immutable after creation.
    pub name: String,
    /// VM the subnet runs.
    pub vm: Vm,
    /// Protocol version the VM speaks.
    pub rpc_version: u32,
    /// Display name of the native token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_name: Option<String>,
    /// Descriptor the subnet was imported from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imported_from: Option<String>,
    /// Per-network deployment state. Absent entry means not deployed there.
    #[serde(default)]
    pub networks: BTreeMap<Network, NetworkState>,
}

impl Sidecar {
    /// Create an undeployed sidecar.
    pub fn new(name: impl Into<String>, vm: Vm, rpc_version: u32) -> Self {
        Self {
            name: name.into(),
            vm,
            rpc_version,
            token_name: None,
            imported_from: None,
            networks: BTreeMap::new(),
        }
    }

    /// Set the native token display name.
    pub fn with_token_name(mut self, token_name: impl Into<String>) -> Self {
        self.token_name = Some(token_name.into());
        self
    }

    /// Deployment state on a network, if deployed.
    pub fn network(&self, network: Network) -> Option<&NetworkState> {
        self.networks.get(&network)
    }

    /// Whether the subnet is deployed to a network.
    pub fn is_deployed(&self, network: Network) -> bool {
        self.networks.contains_key(&network)
    }

    /// Whether the subnet is elastic on a network.
    pub fn is_elastic(&self, network: Network) -> bool {
        self.network(network).is_some_and(|s| s.elastic)
    }
}

/// Deployment state of a subnet on one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkState {
    /// Subnet id assigned by the network.
    pub subnet_id: SubnetId,
    /// Blockchain id. `None` while chain creation awaits signatures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<ChainId>,
    /// Addresses allowed to authorize subnet changes.
    pub control_keys: Vec<Address>,
    /// Number of control-key signatures required.
    pub threshold: u32,
    /// Runtime version the subnet was deployed against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_version: Option<String>,
    /// Whether the subnet has been converted to permissionless staking.
    #[serde(default)]
    pub elastic: bool,
    /// Staking parameters, present once elastic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elastic_config: Option<ElasticConfig>,
    /// Validators added through this tool.
    #[serde(default)]
    pub validators: BTreeMap<NodeId, ValidatorRecord>,
}

impl NetworkState {
    /// State for a freshly created subnet with no chain yet.
    pub fn new(subnet_id: SubnetId, control_keys: Vec<Address>, threshold: u32) -> Self {
        Self {
            subnet_id,
            chain_id: None,
            control_keys,
            threshold,
            runtime_version: None,
            elastic: false,
            elastic_config: None,
            validators: BTreeMap::new(),
        }
    }

    /// Attach the blockchain id.
    pub fn with_chain_id(mut self, chain_id: ChainId) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    /// Record the runtime version deployed against.
    pub fn with_runtime_version(mut self, version: impl Into<String>) -> Self {
        self.runtime_version = Some(version.into());
        self
    }

    /// Whether chain creation is still pending signatures.
    pub fn chain_pending(&self) -> bool {
        self.chain_id.is_none()
    }
}

/// A validator known to this tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorRecord {
    /// Consensus weight (permissioned) or stake-derived weight (permissionless).
    pub weight: u64,
    /// Start of the validation period (seconds since epoch).
    pub start_time: u64,
    /// End of the validation period (seconds since epoch).
    pub end_time: u64,
    /// Tokens staked, for permissionless validators.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stake_amount: Option<u64>,
    /// Delegations made through this tool.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub delegations: Vec<Delegation>,
}

/// A delegation of stake to a permissionless validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegation {
    pub amount: u64,
    pub end_time: u64,
    pub tx_id: String,
}

/// Parameters of an elastic (permissionless staking) subnet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElasticConfig {
    pub token_name: String,
    pub token_symbol: String,
    pub denomination: u8,
    pub initial_supply: u64,
    pub max_supply: u64,
    pub min_consumption_rate: u64,
    pub max_consumption_rate: u64,
    pub min_validator_stake: u64,
    pub max_validator_stake: u64,
    pub min_stake_duration_secs: u64,
    pub max_stake_duration_secs: u64,
    pub min_delegation_fee: u32,
    pub min_delegator_stake: u64,
    pub max_validator_weight_factor: u8,
    pub uptime_requirement: u32,
    /// Asset id of the staking token, known once the conversion commits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    /// When the conversion committed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converted_at: Option<Timestamp>,
}

impl ElasticConfig {
    /// Config with the default staking parameters for the given token.
    pub fn with_defaults(
        token_name: impl Into<String>,
        token_symbol: impl Into<String>,
        denomination: u8,
    ) -> Self {
        Self {
            token_name: token_name.into(),
            token_symbol: token_symbol.into(),
            denomination,
            initial_supply: DEFAULT_INITIAL_SUPPLY,
            max_supply: DEFAULT_MAX_SUPPLY,
            min_consumption_rate: DEFAULT_MIN_CONSUMPTION_RATE,
            max_consumption_rate: DEFAULT_MAX_CONSUMPTION_RATE,
            min_validator_stake: DEFAULT_MIN_VALIDATOR_STAKE,
            max_validator_stake: DEFAULT_MAX_VALIDATOR_STAKE,
            min_stake_duration_secs: DEFAULT_MIN_STAKE_DURATION_SECS,
            max_stake_duration_secs: DEFAULT_MAX_STAKE_DURATION_SECS,
            min_delegation_fee: DEFAULT_MIN_DELEGATION_FEE,
            min_delegator_stake: DEFAULT_MIN_DELEGATOR_STAKE,
            max_validator_weight_factor: DEFAULT_MAX_VALIDATOR_WEIGHT_FACTOR,
            uptime_requirement: DEFAULT_UPTIME_REQUIREMENT,
            asset_id: None,
            converted_at: None,
        }
    }

    /// Check internal consistency of the parameters.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: &str| Err(TypesError::InvalidElasticConfig(msg.to_string()));

        if self.token_name.trim().is_empty() {
            return fail("token name is empty");
        }
        if self.token_symbol.trim().is_empty() || self.token_symbol.len() > 8 {
            return fail("token symbol must be 1-8 characters");
        }
        if self.denomination > MAX_DENOMINATION {
            return fail("denomination exceeds 18 decimal places");
        }
        if self.initial_supply > self.max_supply {
            return fail("initial supply exceeds max supply");
        }
        if self.min_consumption_rate > self.max_consumption_rate {
            return fail("min consumption rate exceeds max consumption rate");
        }
        if self.min_validator_stake == 0 || self.min_validator_stake > self.max_validator_stake {
            return fail("validator stake bounds are inverted or zero");
        }
        if self.max_validator_stake > self.max_supply {
            return fail("max validator stake exceeds max supply");
        }
        if self.min_stake_duration_secs == 0
            || self.min_stake_duration_secs > self.max_stake_duration_secs
        {
            return fail("stake duration bounds are inverted or zero");
        }
        if self.max_validator_weight_factor == 0 {
            return fail("max validator weight factor must be positive");
        }
        if self.uptime_requirement > 1_000_000 || self.min_delegation_fee > 1_000_000 {
            return fail("rates are expressed in parts per million");
        }
        Ok(())
    }

    /// Whether a stake amount and duration fall within the validator bounds.
    pub fn accepts_validator_stake(&self, amount: u64, duration_secs: u64) -> bool {
        (self.min_validator_stake..=self.max_validator_stake).contains(&amount)
            && (self.min_stake_duration_secs..=self.max_stake_duration_secs)
                .contains(&duration_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subnet_name_rules() {
        assert!(validate_subnet_name("sub1").is_ok());
        assert!(validate_subnet_name("").is_err());
        assert!(validate_subnet_name("my-subnet").is_err());
        assert!(validate_subnet_name(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_node_id_requires_prefix() {
        assert!(NodeId::parse("NodeID-7Xhw2mDxuDS44j42TCB6U5579esbSt3Lg").is_ok());
        assert!(NodeId::parse("7Xhw2mDxuDS44j42TCB6U5579esbSt3Lg").is_err());
        assert!(NodeId::parse("NodeID-").is_err());
    }

    #[test]
    fn test_default_elastic_config_is_valid() {
        let config = ElasticConfig::with_defaults("BLIZZARD", "BRRR", 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_elastic_config_rejects_inverted_supply() {
        let mut config = ElasticConfig::with_defaults("Token", "TKN", 9);
        config.initial_supply = config.max_supply + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_elastic_config_rejects_large_denomination() {
        let config = ElasticConfig::with_defaults("Token", "TKN", 19);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_stake_bounds() {
        let config = ElasticConfig::with_defaults("Token", "TKN", 9);
        let ok_duration = config.min_stake_duration_secs;
        assert!(config.accepts_validator_stake(config.min_validator_stake, ok_duration));
        assert!(!config.accepts_validator_stake(config.min_validator_stake - 1, ok_duration));
        assert!(!config.accepts_validator_stake(config.min_validator_stake, ok_duration - 1));
    }

    #[test]
    fn test_undeployed_sidecar_omits_networks_entries() {
        let sidecar = Sidecar::new("sub1", Vm::Custom, 26);
        assert!(!sidecar.is_deployed(Network::Local));
        assert!(!sidecar.is_elastic(Network::Local));
        let json = serde_json::to_value(&sidecar).unwrap();
        assert!(json.get("token_name").is_none());
        assert_eq!(json["networks"], serde_json::json!({}));
    }
}
