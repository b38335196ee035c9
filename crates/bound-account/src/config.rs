//! # Account Configuration
//!
//! Fee ceilings, gas floors and sync policy knobs for an account.
//! `AccountConfig::default()` is usable as-is; `AccountConfig::load` reads the
//! same values from a TOML file, where every key is optional.
//!
//! ```toml
//! [fee_bounds]
//! max_fee_per_gas = "0x746a528800"          # 500 gwei
//! max_priority_fee_per_gas = "0x174876e800" # 100 gwei
//! max_pre_verification_gas = 1000000
//! min_verification_gas = 10000
//! max_verification_gas = 3000000
//! min_call_gas = 10000
//! max_call_gas = 10000000
//!
//! [policy]
//! sponsored_verification_multiplier = 3
//! coordinator_gas_exempt = true
//! ```

use crate::domain::value_objects::U256;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

const GWEI: u64 = 1_000_000_000;

/// Ceilings and floors applied to a request's fee fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBounds {
    /// Ceiling on `max_fee_per_gas`.
    pub max_fee_per_gas: U256,
    /// Ceiling on `max_priority_fee_per_gas`.
    pub max_priority_fee_per_gas: U256,
    /// Ceiling on `pre_verification_gas`.
    pub max_pre_verification_gas: u64,
    /// Floor on `verification_gas_limit`.
    pub min_verification_gas: u64,
    /// Ceiling on `verification_gas_limit`.
    pub max_verification_gas: u64,
    /// Floor on `call_gas_limit`.
    pub min_call_gas: u64,
    /// Ceiling on `call_gas_limit`.
    pub max_call_gas: u64,
}

impl Default for FeeBounds {
    fn default() -> Self {
        Self {
            max_fee_per_gas: U256::from(500 * GWEI),
            max_priority_fee_per_gas: U256::from(100 * GWEI),
            max_pre_verification_gas: 1_000_000,
            min_verification_gas: 10_000,
            max_verification_gas: 3_000_000,
            min_call_gas: 10_000,
            max_call_gas: 10_000_000,
        }
    }
}

/// Policy constants whose exact values are a judgement call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPolicy {
    /// Multiplier on verification gas when a sponsor is attached.
    pub sponsored_verification_multiplier: u64,
    /// Exclude `refund_gas_cost` from the profit check when the coordinator syncs.
    pub coordinator_gas_exempt: bool,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            sponsored_verification_multiplier: 3,
            coordinator_gas_exempt: true,
        }
    }
}

/// Full account configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Request fee guards.
    pub fee_bounds: FeeBounds,
    /// Sync policy knobs.
    pub policy: SyncPolicy,
}

/// Errors that can occur during config loading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// File I/O error.
    #[error("failed to read config {path}: {error}")]
    Io {
        /// Path of the file that failed to load.
        path: String,
        /// Error message from the I/O operation.
        error: String,
    },
    /// TOML parse error.
    #[error("failed to parse config: {0}")]
    Parse(String),
    /// Values parse but contradict each other.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// -----------------------------------------------------------------------------
// File format: every key optional, missing keys fall back to defaults
// -----------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    fee_bounds: FeeBoundsFile,
    #[serde(default)]
    policy: PolicyFile,
}

#[derive(Debug, Default, Deserialize)]
struct FeeBoundsFile {
    max_fee_per_gas: Option<U256>,
    max_priority_fee_per_gas: Option<U256>,
    max_pre_verification_gas: Option<u64>,
    min_verification_gas: Option<u64>,
    max_verification_gas: Option<u64>,
    min_call_gas: Option<u64>,
    max_call_gas: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct PolicyFile {
    sponsored_verification_multiplier: Option<u64>,
    coordinator_gas_exempt: Option<bool>,
}

impl AccountConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed or validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if the TOML is malformed or the bounds are inconsistent.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let defaults = Self::default();
        let fb = file.fee_bounds;
        let d = defaults.fee_bounds;
        let config = Self {
            fee_bounds: FeeBounds {
                max_fee_per_gas: fb.max_fee_per_gas.unwrap_or(d.max_fee_per_gas),
                max_priority_fee_per_gas: fb
                    .max_priority_fee_per_gas
                    .unwrap_or(d.max_priority_fee_per_gas),
                max_pre_verification_gas: fb
                    .max_pre_verification_gas
                    .unwrap_or(d.max_pre_verification_gas),
                min_verification_gas: fb.min_verification_gas.unwrap_or(d.min_verification_gas),
                max_verification_gas: fb.max_verification_gas.unwrap_or(d.max_verification_gas),
                min_call_gas: fb.min_call_gas.unwrap_or(d.min_call_gas),
                max_call_gas: fb.max_call_gas.unwrap_or(d.max_call_gas),
            },
            policy: SyncPolicy {
                sponsored_verification_multiplier: file
                    .policy
                    .sponsored_verification_multiplier
                    .unwrap_or(defaults.policy.sponsored_verification_multiplier),
                coordinator_gas_exempt: file
                    .policy
                    .coordinator_gas_exempt
                    .unwrap_or(defaults.policy.coordinator_gas_exempt),
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that floors sit below ceilings and the multiplier is usable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fb = &self.fee_bounds;
        if fb.min_verification_gas > fb.max_verification_gas {
            return Err(ConfigError::Invalid(format!(
                "min_verification_gas {} > max_verification_gas {}",
                fb.min_verification_gas, fb.max_verification_gas
            )));
        }
        if fb.min_call_gas > fb.max_call_gas {
            return Err(ConfigError::Invalid(format!(
                "min_call_gas {} > max_call_gas {}",
                fb.min_call_gas, fb.max_call_gas
            )));
        }
        if self.policy.sponsored_verification_multiplier == 0 {
            return Err(ConfigError::Invalid(
                "sponsored_verification_multiplier must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
