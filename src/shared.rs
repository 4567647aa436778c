// src/shared.rs

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::chain::LinkError;
use crate::engine::ChainEngine;
use crate::error::ChainError;
use crate::types::{
    Address, Amount, BlockOrder, BlockView, ChainInfo, Fingerprint, Transaction, ValidatorView,
};

trait PoisonRecover<T> {
    fn read_or_recover(&self) -> RwLockReadGuard<'_, T>;
    fn write_or_recover(&self) -> RwLockWriteGuard<'_, T>;
}

impl<T> PoisonRecover<T> for RwLock<T> {
    fn read_or_recover(&self) -> RwLockReadGuard<'_, T> {
        self.read().unwrap_or_else(|poisoned| {
            tracing::error!("engine lock poisoned (read); continuing with last committed state");
            poisoned.into_inner()
        })
    }
    fn write_or_recover(&self) -> RwLockWriteGuard<'_, T> {
        self.write().unwrap_or_else(|poisoned| {
            tracing::error!("engine lock poisoned (write); continuing with last committed state");
            poisoned.into_inner()
        })
    }
}

/// Cloneable handle for sharing one engine between threads.
///
/// Mutations hold the write lock for their whole duration, so readers only ever
/// see fully settled blocks.
#[derive(Clone)]
pub struct SharedEngine {
    inner: Arc<RwLock<ChainEngine>>,
}

impl SharedEngine {
    pub fn new(engine: ChainEngine) -> Self {
        Self { inner: Arc::new(RwLock::new(engine)) }
    }

    /// Run `f` under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&ChainEngine) -> R) -> R {
        f(&self.inner.read_or_recover())
    }

    /// Run `f` under the write lock.
    pub fn write<R>(&self, f: impl FnOnce(&mut ChainEngine) -> R) -> R {
        f(&mut self.inner.write_or_recover())
    }

    pub fn submit(&self, tx: Transaction) -> Result<Fingerprint, ChainError> {
        self.write(|e| e.submit(tx))
    }

    pub fn submit_transaction(
        &self,
        origin: &str,
        destination: &str,
        amount: Amount,
        fee: Amount,
        secret: &str,
    ) -> Result<Fingerprint, ChainError> {
        self.write(|e| e.submit_transaction(origin, destination, amount, fee, secret))
    }

    pub fn produce_block(&self) -> Result<BlockView, ChainError> {
        self.write(|e| e.produce_block())
    }

    pub fn delegate(&self, delegator: &str, validator: &str, amount: Amount) -> Result<(), ChainError> {
        self.write(|e| e.delegate(delegator, validator, amount))
    }

    pub fn balance_of(&self, address: &str) -> Amount {
        self.read(|e| e.balance_of(address))
    }

    pub fn chain_info(&self) -> ChainInfo {
        self.read(|e| e.chain_info())
    }

    pub fn staking_info_of(&self, address: &str) -> BTreeMap<Address, Amount> {
        self.read(|e| e.staking_info_of(address))
    }

    pub fn list_validators(&self) -> Vec<ValidatorView> {
        self.read(|e| e.list_validators())
    }

    pub fn list_blocks(&self, order: BlockOrder) -> Vec<BlockView> {
        self.read(|e| e.list_blocks(order))
    }

    pub fn height(&self) -> u64 {
        self.read(|e| e.height())
    }

    pub fn verify_chain(&self) -> Result<(), LinkError> {
        self.read(|e| e.verify_chain())
    }
}
