// src/consensus/dev_loop.rs

use std::{thread, time::{Duration, Instant}};

use crate::engine::ChainEngine;
use crate::error::ChainError;
use crate::shared::SharedEngine;
use crate::types::{now_unix_ms, BlockView};

pub const DEFAULT_SLOT_MS: u64 = 1000;
pub const DEFAULT_MAX_STALLED_SLOTS: u64 = 16;

#[derive(Clone, Copy, Debug)]
pub struct DevLoopConfig {
    pub slot_ms: u64,
    /// `run_until_height` gives up after this many consecutive failed slots.
    pub max_stalled_slots: u64,
}

impl Default for DevLoopConfig {
    fn default() -> Self {
        Self { slot_ms: DEFAULT_SLOT_MS, max_stalled_slots: DEFAULT_MAX_STALLED_SLOTS }
    }
}

/// Anything that can be asked to produce one block per slot.
pub trait DevNode {
    fn height(&self) -> u64;
    fn produce_block(&mut self) -> Result<BlockView, ChainError>;
    fn now_unix(&self) -> u64;
}

impl DevNode for ChainEngine {
    fn height(&self) -> u64 { ChainEngine::height(self) }
    fn produce_block(&mut self) -> Result<BlockView, ChainError> { ChainEngine::produce_block(self) }
    fn now_unix(&self) -> u64 { now_unix_ms() }
}

impl DevNode for SharedEngine {
    fn height(&self) -> u64 { SharedEngine::height(self) }
    fn produce_block(&mut self) -> Result<BlockView, ChainError> { SharedEngine::produce_block(self) }
    fn now_unix(&self) -> u64 { now_unix_ms() }
}

/// Fixed-slot block timer. Generic over the node so tests can swap in fakes.
pub struct DevLoop<N> {
    pub node: N,
    cfg: DevLoopConfig,
}

impl<N> DevLoop<N> where N: DevNode {
    pub fn new(node: N, cfg: DevLoopConfig) -> Self {
        // zero-length slots would spin
        let cfg = DevLoopConfig { slot_ms: cfg.slot_ms.max(1), ..cfg };
        Self { node, cfg }
    }

    /// One slot: try to produce, then sleep out the remainder. Returns whether height advanced.
    fn tick_once(&mut self) -> bool {
        let start = Instant::now();
        let before = self.node.height();

        match self.node.produce_block() {
            Ok(b) => tracing::debug!(height = b.height, producer = %b.producer, "slot filled"),
            Err(e) => tracing::warn!(height = before, error = %e, "slot skipped"),
        }

        let advanced = self.node.height() > before;

        let slot = Duration::from_millis(self.cfg.slot_ms);
        let elapsed = start.elapsed();
        if elapsed < slot {
            thread::sleep(slot - elapsed);
        }

        advanced
    }

    /// Run exactly `n` slots; returns how many produced a block.
    pub fn run_for_slots(&mut self, n: u64) -> u64 {
        (0..n).filter(|_| self.tick_once()).count() as u64
    }

    /// Run until the node reaches height `h`. Returns false if it stalled first.
    pub fn run_until_height(&mut self, h: u64) -> bool {
        let mut stalled = 0;
        while self.node.height() < h {
            if self.tick_once() {
                stalled = 0;
            } else {
                stalled += 1;
                if stalled >= self.cfg.max_stalled_slots {
                    tracing::warn!(target_height = h, height = self.node.height(), "dev loop stalled");
                    return false;
                }
            }
        }
        true
    }

    pub fn run_for_duration(&mut self, millis: u64) {
        let start = Instant::now();
        let total = Duration::from_millis(millis);
        while start.elapsed() < total {
            self.tick_once();
        }
    }
}
