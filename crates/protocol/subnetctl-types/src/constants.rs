//! Constants shared across the workspace.
//!
//! File format versions, validator limits and the defaults applied when an
//! elastic conversion is requested without explicit parameters.

// =============================================================================
// Format Versions
// =============================================================================

/// Current transaction artifact format version
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

// =============================================================================
// Identifiers
// =============================================================================

/// Prefix every node id carries
pub const NODE_ID_PREFIX: &str = "NodeID-";

/// Maximum subnet name length (characters)
pub const MAX_SUBNET_NAME_LENGTH: usize = 64;

// =============================================================================
// Validators
// =============================================================================

/// Default weight for a permissioned validator
pub const DEFAULT_VALIDATOR_WEIGHT: u64 = 20;

/// Minimum validation period: 24 hours (seconds)
pub const MIN_STAKING_PERIOD_SECS: u64 = 24 * 60 * 60;

/// Maximum validation period: 365 days (seconds)
pub const MAX_STAKING_PERIOD_SECS: u64 = 365 * 24 * 60 * 60;

/// Threshold used on the local network, where a single local key controls everything
pub const LOCAL_NETWORK_THRESHOLD: u32 = 1;

// =============================================================================
// Elastic Defaults
// =============================================================================

/// Maximum number of decimal places for the staking token
pub const MAX_DENOMINATION: u8 = 18;

/// Default initial token supply
pub const DEFAULT_INITIAL_SUPPLY: u64 = 240_000_000;

/// Default maximum token supply
pub const DEFAULT_MAX_SUPPLY: u64 = 720_000_000;

/// Default minimum consumption rate (parts per million)
pub const DEFAULT_MIN_CONSUMPTION_RATE: u64 = 100_000;

/// Default maximum consumption rate (parts per million)
pub const DEFAULT_MAX_CONSUMPTION_RATE: u64 = 120_000;

/// Default minimum validator stake
pub const DEFAULT_MIN_VALIDATOR_STAKE: u64 = 2_000;

/// Default maximum validator stake
pub const DEFAULT_MAX_VALIDATOR_STAKE: u64 = 3_000_000;

/// Default minimum stake duration: 14 days (seconds)
pub const DEFAULT_MIN_STAKE_DURATION_SECS: u64 = 14 * 24 * 60 * 60;

/// Default maximum stake duration: 365 days (seconds)
pub const DEFAULT_MAX_STAKE_DURATION_SECS: u64 = 365 * 24 * 60 * 60;

/// Default minimum delegation fee (parts per million)
pub const DEFAULT_MIN_DELEGATION_FEE: u32 = 20_000;

/// Default minimum delegator stake
pub const DEFAULT_MIN_DELEGATOR_STAKE: u64 = 25;

/// Default maximum validator weight factor
pub const DEFAULT_MAX_VALIDATOR_WEIGHT_FACTOR: u8 = 5;

/// Default uptime requirement (parts per million)
pub const DEFAULT_UPTIME_REQUIREMENT: u32 = 800_000;
