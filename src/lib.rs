// src/lib.rs
pub mod codec;
pub mod config;
pub mod consensus;
pub mod crypto;
pub mod chain;
pub mod engine;
pub mod error;
pub mod mempool;
pub mod pos;
pub mod shared;
pub mod state;
pub mod stf;
pub mod types;
pub mod wallet;

pub use config::{ChainConfig, SettlementMode};
pub use engine::ChainEngine;
pub use error::ChainError;
pub use shared::SharedEngine;
