// src/pos/registry.rs

use crate::types::{Address, Amount, ValidatorView};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ValidatorStatus { Active, Inactive }

#[derive(Clone, Debug, PartialEq)]
pub struct Validator {
    pub address: Address,
    pub stake: Amount,
    pub status: ValidatorStatus,
    /// Tracked but not driven by any rule yet; there is no liveness or slashing policy.
    pub missed_blocks: u64,
    pub produced_blocks: u64,
}

impl Validator {
    pub fn new(address: impl Into<Address>, stake: Amount, status: ValidatorStatus) -> Self {
        Self { address: address.into(), stake, status, missed_blocks: 0, produced_blocks: 0 }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == ValidatorStatus::Active
    }

    /// Eligible for block production: active and holding positive stake.
    #[inline]
    pub fn is_eligible(&self) -> bool {
        self.is_active() && self.stake > 0.0
    }
}

impl From<&Validator> for ValidatorView {
    fn from(v: &Validator) -> Self {
        Self {
            address: v.address.clone(),
            stake: v.stake,
            delegated: 0.0,
            active: v.is_active(),
            missed_blocks: v.missed_blocks,
            produced_blocks: v.produced_blocks,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum PosError {
    NotFound(Address),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidatorSet {
    validators: Vec<Validator>, // sorted by address for determinism
}

impl ValidatorSet {
    /// Build the genesis set.
    /// - Validators are **sorted by address**; this is the enumeration order used by selection.
    /// - If several entries share an address, the **first** one wins.
    pub fn from_genesis(mut vals: Vec<Validator>) -> Self {
        // stable sort keeps the first occurrence ahead of its duplicates
        vals.sort_by(|a, b| a.address.cmp(&b.address));
        vals.dedup_by(|later, first| later.address == first.address);
        Self { validators: vals }
    }

    #[inline]
    pub fn get(&self, address: &str) -> Option<&Validator> {
        self.index_of(address).map(|idx| &self.validators[idx])
    }

    #[inline]
    fn get_mut(&mut self, address: &str) -> Option<&mut Validator> {
        match self.index_of(address) {
            Some(idx) => Some(&mut self.validators[idx]),
            None => None,
        }
    }

    #[inline]
    pub fn index_of(&self, address: &str) -> Option<usize> {
        self.validators.binary_search_by(|v| v.address.as_str().cmp(address)).ok()
    }

    #[inline]
    pub fn contains(&self, address: &str) -> bool {
        self.index_of(address).is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Validator> {
        self.validators.iter()
    }

    /// Active validators with positive stake, in enumeration order.
    pub fn eligible(&self) -> impl Iterator<Item = &Validator> {
        self.validators.iter().filter(|v| v.is_eligible())
    }

    pub fn active_count(&self) -> usize {
        self.validators.iter().filter(|v| v.is_active()).count()
    }

    /// Sum of stake over eligible validators.
    pub fn total_active_stake(&self) -> Amount {
        self.eligible().map(|v| v.stake).sum()
    }

    /// Increase `address`'s stake by `amount`. Works for any status.
    pub fn bond(&mut self, address: &str, amount: Amount) -> Result<(), PosError> {
        let v = self.get_mut(address).ok_or_else(|| PosError::NotFound(address.to_string()))?;
        v.stake += amount;
        Ok(())
    }

    /// Mark a validator eligible again. Idempotent.
    pub fn activate(&mut self, address: &str) -> Result<(), PosError> {
        let v = self.get_mut(address).ok_or_else(|| PosError::NotFound(address.to_string()))?;
        v.status = ValidatorStatus::Active;
        Ok(())
    }

    /// Remove a validator from selection without touching its stake. Idempotent.
    pub fn deactivate(&mut self, address: &str) -> Result<(), PosError> {
        let v = self.get_mut(address).ok_or_else(|| PosError::NotFound(address.to_string()))?;
        v.status = ValidatorStatus::Inactive;
        Ok(())
    }

    /// Count a produced block for the validator at `idx` (from `index_of`).
    pub fn record_produced_at(&mut self, idx: usize) {
        self.validators[idx].produced_blocks += 1;
    }
}
