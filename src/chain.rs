// src/chain.rs

use std::fmt;
use crate::types::{Block, Fingerprint};

#[derive(Debug, Clone, PartialEq)]
pub enum LinkError {
    BadHeight { expected: u64, got: u64 },
    ParentMismatch { height: u64, expected: Fingerprint, got: Fingerprint },
    FingerprintMismatch { height: u64 },
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::BadHeight { expected, got } =>
                write!(f, "Bad height: expected {}, got {}", expected, got),
            LinkError::ParentMismatch { height, expected, got } =>
                write!(f, "Parent mismatch at {}: expected {}, got {}", height, expected, got),
            LinkError::FingerprintMismatch { height } =>
                write!(f, "Fingerprint mismatch at {}", height),
        }
    }
}

impl std::error::Error for LinkError {}

/// Append-only block list. Block `i` has height `i` and links to block `i - 1`.
#[derive(Debug, Clone)]
pub struct Chain {
    blocks: Vec<Block>,
}

impl Chain {
    pub fn new(genesis: Block) -> Self {
        Self { blocks: vec![genesis] }
    }

    /// Append `block` if it extends the tip.
    pub fn append(&mut self, block: Block) -> Result<(), LinkError> {
        let expected = self.blocks.len() as u64;
        if block.height() != expected {
            return Err(LinkError::BadHeight { expected, got: block.height() });
        }
        let tip = self.latest().fingerprint();
        if block.previous_fingerprint() != tip {
            return Err(LinkError::ParentMismatch {
                height: block.height(),
                expected: tip.clone(),
                got: block.previous_fingerprint().clone(),
            });
        }
        self.blocks.push(block);
        Ok(())
    }

    pub fn latest(&self) -> &Block {
        // never empty: constructed with genesis and only grows
        &self.blocks[self.blocks.len() - 1]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Height of the tip.
    #[inline]
    pub fn height(&self) -> u64 {
        self.blocks.len() as u64 - 1
    }

    pub fn get(&self, height: u64) -> Option<&Block> {
        usize::try_from(height).ok().and_then(|i| self.blocks.get(i))
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Block> {
        self.blocks.iter()
    }

    /// Re-derive every fingerprint and check heights and parent links from genesis up.
    pub fn verify_links(&self) -> Result<(), LinkError> {
        let mut parent: Option<&Block> = None;
        for (i, b) in self.blocks.iter().enumerate() {
            if b.height() != i as u64 {
                return Err(LinkError::BadHeight { expected: i as u64, got: b.height() });
            }
            if b.recompute_fingerprint() != *b.fingerprint() {
                return Err(LinkError::FingerprintMismatch { height: b.height() });
            }
            let expected_parent = match parent {
                Some(p) => p.fingerprint().clone(),
                None => Fingerprint::genesis_parent(),
            };
            if *b.previous_fingerprint() != expected_parent {
                return Err(LinkError::ParentMismatch {
                    height: b.height(),
                    expected: expected_parent,
                    got: b.previous_fingerprint().clone(),
                });
            }
            parent = Some(b);
        }
        Ok(())
    }
}
