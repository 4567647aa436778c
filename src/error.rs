// src/error.rs

use crate::chain::LinkError;
use crate::pos::registry::PosError;
use crate::types::{Address, Amount};
use std::fmt;

/// Every failure the ledger core reports back to its caller.
/// None of them are fatal: the engine stays usable after any rejection.
#[derive(Debug, Clone, PartialEq)]
pub enum ChainError {
    /// Negative or non-finite amount / fee.
    InvalidAmount,
    /// A user transfer reached the pending pool without an authorization tag.
    UnauthorizedTransaction,
    /// No validator is both active and holding positive stake.
    NoActiveValidators,
    UnknownValidator(Address),
    InsufficientBalance { address: Address, needed: Amount, available: Amount },
    /// A produced block failed to extend the tip. Nothing was committed.
    Link(LinkError),
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainError::InvalidAmount => write!(f, "Invalid amount: must be finite and non-negative"),
            ChainError::UnauthorizedTransaction => write!(f, "Unauthorized transaction: missing authorization"),
            ChainError::NoActiveValidators => write!(f, "No active validators with positive stake"),
            ChainError::UnknownValidator(a) => write!(f, "Unknown validator: {}", a),
            ChainError::InsufficientBalance { address, needed, available } =>
                write!(f, "Insufficient balance for {}: needed {}, available {}", address, needed, available),
            ChainError::Link(e) => write!(f, "Chain link error: {}", e),
        }
    }
}

impl std::error::Error for ChainError {}

impl From<LinkError> for ChainError {
    fn from(e: LinkError) -> Self {
        ChainError::Link(e)
    }
}

impl From<PosError> for ChainError {
    fn from(e: PosError) -> Self {
        match e {
            PosError::NotFound(a) => ChainError::UnknownValidator(a),
        }
    }
}
