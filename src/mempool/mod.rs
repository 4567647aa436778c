// src/mempool/mod.rs

use crate::error::ChainError;
use crate::types::{Fingerprint, Transaction};

/// Transactions accepted since the last block, in arrival order.
///
/// Admission only checks authorization; affordability is decided at block time.
#[derive(Clone, Debug, Default)]
pub struct PendingPool {
    txs: Vec<Transaction>,
}

impl PendingPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit(&mut self, tx: Transaction) -> Result<Fingerprint, ChainError> {
        if !tx.is_authorized() {
            return Err(ChainError::UnauthorizedTransaction);
        }
        let fp = tx.fingerprint().clone();
        self.txs.push(tx);
        Ok(fp)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.txs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.txs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.txs.iter()
    }

    pub fn clear(&mut self) {
        self.txs.clear();
    }
}
