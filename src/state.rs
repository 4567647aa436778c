// src/state.rs

use std::collections::{BTreeMap, HashMap};
use crate::types::{Address, Amount};

/// Account balances plus the running total of minted supply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    balances: HashMap<Address, Amount>,
    total_supply: Amount,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored balance, or 0 for an address never seen.
    pub fn balance_of(&self, who: &str) -> Amount {
        *self.balances.get(who).unwrap_or(&0.0)
    }

    pub fn can_afford(&self, who: &str, amount: Amount) -> bool {
        self.balance_of(who) >= amount
    }

    pub fn credit(&mut self, who: &str, amount: Amount) {
        *self.balances.entry(who.to_string()).or_insert(0.0) += amount;
    }

    /// Debit exactly `amount` from `who`. Callers pre-check with `can_afford`; if they
    /// did not, the balance goes below zero and the overdraft (how far below) is returned.
    pub fn debit(&mut self, who: &str, amount: Amount) -> Amount {
        let bal = self.balances.entry(who.to_string()).or_insert(0.0);
        *bal -= amount;
        if *bal < 0.0 { -*bal } else { 0.0 }
    }

    /// Credit newly issued balance and grow total supply by the same amount.
    pub fn mint(&mut self, who: &str, amount: Amount) {
        self.credit(who, amount);
        self.total_supply += amount;
    }

    /// Seed a spendable genesis balance; counted into total supply like a mint.
    pub fn allocate_genesis(&mut self, who: &str, amount: Amount) {
        self.mint(who, amount);
    }

    /// Genesis-only: supply that exists outside any spendable balance (validator self-stake).
    pub(crate) fn add_locked_supply(&mut self, amount: Amount) {
        self.total_supply += amount;
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Every known account in address order.
    pub fn accounts(&self) -> BTreeMap<Address, Amount> {
        self.balances.iter().map(|(a, b)| (a.clone(), *b)).collect()
    }
}
