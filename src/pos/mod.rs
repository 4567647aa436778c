// src/pos/mod.rs

pub mod registry;
pub mod schedule;
pub mod staking;
