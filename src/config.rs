// src/config.rs

use std::collections::HashSet;
use std::fmt;
use serde::Deserialize;

use crate::pos::registry::{Validator, ValidatorStatus};
use crate::types::{is_valid_amount, Address, Amount};

pub const DEFAULT_MINING_REWARD: Amount = 50.0;

/// How `produce_block` decides which pending transfers can be settled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementMode {
    /// Every transfer is checked against the ledger as it stood before the block.
    /// Two spends from one origin can both pass even if only one is covered.
    #[default]
    Snapshot,
    /// Each transfer is checked against the ledger as already updated by the ones
    /// settled before it in the same block; overdrawing transfers are dropped.
    Incremental,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GenesisValidator {
    pub address: Address,
    pub stake: Amount,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl GenesisValidator {
    pub fn new(address: impl Into<Address>, stake: Amount) -> Self {
        Self { address: address.into(), stake, active: true }
    }

    pub(crate) fn to_validator(&self) -> Validator {
        let status = if self.active { ValidatorStatus::Active } else { ValidatorStatus::Inactive };
        Validator::new(self.address.clone(), self.stake, status)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GenesisAllocation {
    pub address: Address,
    pub balance: Amount,
}

impl GenesisAllocation {
    pub fn new(address: impl Into<Address>, balance: Amount) -> Self {
        Self { address: address.into(), balance }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub mining_reward: Amount,
    pub genesis_validators: Vec<GenesisValidator>,
    /// Spendable balances at genesis; counted into total supply.
    pub genesis_allocations: Vec<GenesisAllocation>,
    pub settlement_mode: SettlementMode,
    /// Seed for proposer selection. `None` draws from OS entropy.
    pub rng_seed: Option<u64>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            mining_reward: DEFAULT_MINING_REWARD,
            genesis_validators: vec![
                GenesisValidator::new("validator1", 1_000_000.0),
                GenesisValidator::new("validator2", 800_000.0),
                GenesisValidator::new("validator3", 600_000.0),
            ],
            genesis_allocations: Vec::new(),
            settlement_mode: SettlementMode::Snapshot,
            rng_seed: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Parse(String),
    InvalidAmount(String),
    DuplicateValidator(Address),
    NoValidators,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(e)              => write!(f, "Config parse error: {}", e),
            ConfigError::InvalidAmount(what)   => write!(f, "Invalid amount in config: {}", what),
            ConfigError::DuplicateValidator(a) => write!(f, "Duplicate genesis validator: {}", a),
            ConfigError::NoValidators          => write!(f, "Genesis needs at least one validator"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl ChainConfig {
    /// Parse and validate a JSON config; missing fields take their defaults.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: ChainConfig = serde_json::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn with_settlement_mode(mut self, mode: SettlementMode) -> Self {
        self.settlement_mode = mode;
        self
    }

    pub fn with_allocation(mut self, address: impl Into<Address>, balance: Amount) -> Self {
        self.genesis_allocations.push(GenesisAllocation::new(address, balance));
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_amount(self.mining_reward) {
            return Err(ConfigError::InvalidAmount("mining_reward".into()));
        }
        if self.genesis_validators.is_empty() {
            return Err(ConfigError::NoValidators);
        }
        let mut seen: HashSet<&str> = HashSet::new();
        for v in &self.genesis_validators {
            if !is_valid_amount(v.stake) {
                return Err(ConfigError::InvalidAmount(format!("stake of {}", v.address)));
            }
            if !seen.insert(v.address.as_str()) {
                return Err(ConfigError::DuplicateValidator(v.address.clone()));
            }
        }
        for a in &self.genesis_allocations {
            if !is_valid_amount(a.balance) {
                return Err(ConfigError::InvalidAmount(format!("allocation of {}", a.address)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let cfg = ChainConfig::default();
        cfg.validate().unwrap();
        let stake: Amount = cfg.genesis_validators.iter().map(|v| v.stake).sum();
        assert_eq!(stake, 2_400_000.0);
        assert_eq!(cfg.settlement_mode, SettlementMode::Snapshot);
    }

    #[test]
    fn json_fills_missing_fields_from_default() {
        let cfg = ChainConfig::from_json_str(r#"{ "mining_reward": 10, "rng_seed": 3 }"#).unwrap();
        assert_eq!(cfg.mining_reward, 10.0);
        assert_eq!(cfg.rng_seed, Some(3));
        assert_eq!(cfg.genesis_validators.len(), 3);
    }

    #[test]
    fn json_settlement_mode_and_validators() {
        let cfg = ChainConfig::from_json_str(
            r#"{
                "settlement_mode": "incremental",
                "genesis_validators": [
                    { "address": "v1", "stake": 10 },
                    { "address": "v2", "stake": 5, "active": false }
                ],
                "genesis_allocations": [ { "address": "A", "balance": 1000 } ]
            }"#,
        ).unwrap();
        assert_eq!(cfg.settlement_mode, SettlementMode::Incremental);
        assert!(cfg.genesis_validators[0].active);
        assert!(!cfg.genesis_validators[1].active);
        assert_eq!(cfg.genesis_allocations[0].balance, 1000.0);
    }

    #[test]
    fn rejects_bad_configs() {
        let mut cfg = ChainConfig::default();
        cfg.mining_reward = -1.0;
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidAmount(_))));

        let mut cfg = ChainConfig::default();
        cfg.genesis_validators.push(GenesisValidator::new("validator1", 1.0));
        assert!(matches!(cfg.validate(), Err(ConfigError::DuplicateValidator(a)) if a == "validator1"));

        let mut cfg = ChainConfig::default();
        cfg.genesis_validators.clear();
        assert!(matches!(cfg.validate(), Err(ConfigError::NoValidators)));

        assert!(matches!(ChainConfig::from_json_str("{ nope"), Err(ConfigError::Parse(_))));
    }
}
