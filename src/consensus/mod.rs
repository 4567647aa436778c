// src/consensus/mod.rs

//! Block production triggers. There is no voting: the engine's proposer
//! selection alone decides who produces each block.

pub mod dev_loop;
