// src/pos/staking.rs

use std::collections::{BTreeMap, HashMap};
use crate::types::{Address, Amount};

/// Delegated stake: delegator -> (validator -> amount).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StakingPool {
    delegations: HashMap<Address, BTreeMap<Address, Amount>>,
}

impl StakingPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to the delegator's entry for `validator`, creating it if absent.
    pub fn add(&mut self, delegator: &str, validator: &str, amount: Amount) {
        *self
            .delegations
            .entry(delegator.to_string())
            .or_default()
            .entry(validator.to_string())
            .or_insert(0.0) += amount;
    }

    /// Per-validator amounts for a delegator; empty if it never delegated.
    pub fn info_of(&self, delegator: &str) -> BTreeMap<Address, Amount> {
        self.delegations.get(delegator).cloned().unwrap_or_default()
    }

    /// Sum of everything delegated to `validator` across all delegators.
    pub fn delegated_to(&self, validator: &str) -> Amount {
        self.delegations.values().filter_map(|m| m.get(validator)).sum()
    }
}
