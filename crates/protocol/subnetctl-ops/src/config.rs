//! Configuration for the operations layer.

use subnetctl_types::DEFAULT_VALIDATOR_WEIGHT;

/// Delay between submitting a validator transaction and its start time (seconds).
pub const DEFAULT_START_DELAY_SECS: u64 = 300;

/// Configuration for operation defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpsConfig {
    /// Key that pays fees on public networks when a request names none.
    pub fee_key: Option<String>,
    /// Weight given to permissioned validators when a request names none.
    pub default_validator_weight: u64,
    /// How far in the future a validation period starts by default.
    pub start_delay_secs: u64,
}

impl Default for OpsConfig {
    fn default() -> Self {
        Self {
            fee_key: None,
            default_validator_weight: DEFAULT_VALIDATOR_WEIGHT,
            start_delay_secs: DEFAULT_START_DELAY_SECS,
        }
    }
}

impl OpsConfig {
    /// Set the default fee key.
    pub fn with_fee_key(mut self, name: impl Into<String>) -> Self {
        self.fee_key = Some(name.into());
        self
    }

    /// Set the default validator weight.
    pub fn with_validator_weight(mut self, weight: u64) -> Self {
        self.default_validator_weight = weight;
        self
    }

    /// Set the default start delay.
    pub fn with_start_delay(mut self, secs: u64) -> Self {
        self.start_delay_secs = secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let config = OpsConfig::default()
            .with_fee_key("payer")
            .with_start_delay(30);
        assert_eq!(config.fee_key.as_deref(), Some("payer"));
        assert_eq!(config.start_delay_secs, 30);
        assert_eq!(config.default_validator_weight, DEFAULT_VALIDATOR_WEIGHT);
    }
}
