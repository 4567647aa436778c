// src/types.rs

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use serde::Serialize;

use crate::codec::{block_preimage, tx_preimage};
use crate::crypto::{authorization_tag, fingerprint};
use crate::error::ChainError;

pub type Address = String;
pub type Amount = f64;
pub type Hash = [u8; 32];

/// Producer recorded on the genesis block.
pub const GENESIS_PRODUCER: &str = "genesis";
/// Previous-fingerprint marker carried by the genesis block.
pub const GENESIS_PARENT: &str = "0";

#[inline]
pub fn now_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[inline]
pub fn is_valid_amount(x: Amount) -> bool {
    x.is_finite() && x >= 0.0
}

/// Opaque identity string. Equal inputs always give equal fingerprints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn from_digest(h: &Hash) -> Self {
        Fingerprint(hex::encode(h))
    }

    pub fn genesis_parent() -> Self {
        Fingerprint(GENESIS_PARENT.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A transfer between two addresses, or a protocol reward when `origin` is `None`.
///
/// Fields are read-only after construction: the fingerprint is computed once
/// and the only permitted mutation is a single `authorize` call.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    origin: Option<Address>,
    destination: Address,
    amount: Amount,
    fee: Amount,
    created_at: u64,
    fingerprint: Fingerprint,
    authorization: Option<Fingerprint>,
}

impl Transaction {
    pub fn create(
        origin: Option<Address>,
        destination: impl Into<Address>,
        amount: Amount,
        fee: Amount,
    ) -> Result<Self, ChainError> {
        Self::create_at(origin, destination, amount, fee, now_unix_ms())
    }

    /// Same as `create` with an explicit creation timestamp (unix ms).
    pub fn create_at(
        origin: Option<Address>,
        destination: impl Into<Address>,
        amount: Amount,
        fee: Amount,
        created_at: u64,
    ) -> Result<Self, ChainError> {
        if !is_valid_amount(amount) || !is_valid_amount(fee) {
            return Err(ChainError::InvalidAmount);
        }
        let destination: Address = destination.into();
        // rewards carry no fee: there is nobody to pay it
        let fee = if origin.is_some() { fee } else { 0.0 };
        let fingerprint = fingerprint(&tx_preimage(
            origin.as_deref(),
            &destination,
            amount,
            fee,
            created_at,
        ));
        Ok(Self { origin, destination, amount, fee, created_at, fingerprint, authorization: None })
    }

    /// Protocol-issued transaction minting `amount` to `destination`.
    pub fn reward(destination: impl Into<Address>, amount: Amount) -> Result<Self, ChainError> {
        Self::create(None, destination, amount, 0.0)
    }

    pub fn transfer(
        origin: impl Into<Address>,
        destination: impl Into<Address>,
        amount: Amount,
        fee: Amount,
    ) -> Result<Self, ChainError> {
        Self::create(Some(origin.into()), destination, amount, fee)
    }

    /// Attach the authorization tag. Only the first call counts; no-op for rewards.
    pub fn authorize(&mut self, secret: &str) {
        if self.origin.is_none() || self.authorization.is_some() {
            return;
        }
        self.authorization = Some(authorization_tag(&self.fingerprint, secret));
    }

    pub fn is_authorized(&self) -> bool {
        self.origin.is_none() || self.authorization.is_some()
    }

    #[inline]
    pub fn is_reward(&self) -> bool {
        self.origin.is_none()
    }

    /// amount + fee: what the origin must be able to pay.
    #[inline]
    pub fn total_cost(&self) -> Amount {
        self.amount + self.fee
    }

    pub fn origin(&self) -> Option<&str> { self.origin.as_deref() }
    pub fn destination(&self) -> &str { &self.destination }
    pub fn amount(&self) -> Amount { self.amount }
    pub fn fee(&self) -> Amount { self.fee }
    pub fn created_at(&self) -> u64 { self.created_at }
    pub fn fingerprint(&self) -> &Fingerprint { &self.fingerprint }
    pub fn authorization(&self) -> Option<&Fingerprint> { self.authorization.as_ref() }
}

/// Ordered, immutable container of settled transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    height: u64,
    created_at: u64,
    transactions: Vec<Transaction>,
    previous_fingerprint: Fingerprint,
    producer: Address,
    fingerprint: Fingerprint,
}

impl Block {
    pub fn new(
        height: u64,
        previous_fingerprint: Fingerprint,
        transactions: Vec<Transaction>,
        producer: impl Into<Address>,
    ) -> Self {
        Self::new_at(height, previous_fingerprint, transactions, producer, now_unix_ms())
    }

    pub fn new_at(
        height: u64,
        previous_fingerprint: Fingerprint,
        transactions: Vec<Transaction>,
        producer: impl Into<Address>,
        created_at: u64,
    ) -> Self {
        let producer: Address = producer.into();
        let fingerprint = Self::compute_fingerprint(
            height,
            &previous_fingerprint,
            created_at,
            &transactions,
            &producer,
        );
        Self { height, created_at, transactions, previous_fingerprint, producer, fingerprint }
    }

    pub fn genesis(created_at: u64) -> Self {
        Self::new_at(0, Fingerprint::genesis_parent(), Vec::new(), GENESIS_PRODUCER, created_at)
    }

    pub fn compute_fingerprint(
        height: u64,
        previous: &Fingerprint,
        created_at: u64,
        transactions: &[Transaction],
        producer: &str,
    ) -> Fingerprint {
        fingerprint(&block_preimage(height, previous, created_at, transactions, producer))
    }

    /// Fingerprint re-derived from the current contents.
    pub fn recompute_fingerprint(&self) -> Fingerprint {
        Self::compute_fingerprint(
            self.height,
            &self.previous_fingerprint,
            self.created_at,
            &self.transactions,
            &self.producer,
        )
    }

    pub fn height(&self) -> u64 { self.height }
    pub fn created_at(&self) -> u64 { self.created_at }
    pub fn transactions(&self) -> &[Transaction] { &self.transactions }
    pub fn previous_fingerprint(&self) -> &Fingerprint { &self.previous_fingerprint }
    pub fn producer(&self) -> &str { &self.producer }
    pub fn fingerprint(&self) -> &Fingerprint { &self.fingerprint }
}

// ---- read-only views handed to collaborators ----

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TxView {
    pub fingerprint: Fingerprint,
    pub origin: Option<Address>,
    pub destination: Address,
    pub amount: Amount,
    pub fee: Amount,
    pub created_at: u64,
    pub authorized: bool,
}

impl From<&Transaction> for TxView {
    fn from(tx: &Transaction) -> Self {
        Self {
            fingerprint: tx.fingerprint.clone(),
            origin: tx.origin.clone(),
            destination: tx.destination.clone(),
            amount: tx.amount,
            fee: tx.fee,
            created_at: tx.created_at,
            authorized: tx.is_authorized(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockView {
    pub height: u64,
    pub created_at: u64,
    pub fingerprint: Fingerprint,
    pub previous_fingerprint: Fingerprint,
    pub producer: Address,
    pub transactions: Vec<TxView>,
}

impl From<&Block> for BlockView {
    fn from(b: &Block) -> Self {
        Self {
            height: b.height,
            created_at: b.created_at,
            fingerprint: b.fingerprint.clone(),
            previous_fingerprint: b.previous_fingerprint.clone(),
            producer: b.producer.clone(),
            transactions: b.transactions.iter().map(TxView::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatorView {
    pub address: Address,
    /// Self-stake plus everything delegated to this validator.
    pub stake: Amount,
    /// The delegated part of `stake`.
    pub delegated: Amount,
    pub active: bool,
    pub missed_blocks: u64,
    pub produced_blocks: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainInfo {
    pub height: u64,
    pub total_supply: Amount,
    pub active_validator_count: usize,
    pub pending_count: usize,
}

/// Ordering for `list_blocks`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOrder {
    OldestFirst,
    NewestFirst,
}
