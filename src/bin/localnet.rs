use std::thread;

use rand::thread_rng;
use tracing_subscriber::EnvFilter;

use pos_ledger::{
    consensus::dev_loop::{DevLoop, DevLoopConfig},
    types::{BlockOrder, Transaction},
    wallet::Wallet,
    ChainConfig, ChainEngine, SharedEngine,
};

const SLOTS: u64 = 5;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // optional JSON config path as the only argument
    let config = match std::env::args().nth(1) {
        Some(path) => ChainConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        None => ChainConfig::default(),
    };
    let shared = SharedEngine::new(ChainEngine::new(config)?);

    let mut rng = thread_rng();
    let alice = Wallet::generate(&mut rng);
    let bob = Wallet::generate(&mut rng);

    // faucet: protocol rewards land with the next block
    shared.submit(Transaction::reward(alice.address.as_str(), 1_000.0)?)?;
    shared.submit(Transaction::reward(bob.address.as_str(), 250.0)?)?;
    shared.produce_block()?;

    shared.submit_transaction(&alice.address, &bob.address, 50.0, 1.0, &alice.secret)?;
    shared.delegate(&bob.address, "validator2", 100.0)?;

    // block timer on its own thread; main thread keeps submitting meanwhile
    let producer = {
        let node = shared.clone();
        thread::spawn(move || {
            let mut dl = DevLoop::new(node, DevLoopConfig { slot_ms: 200, ..DevLoopConfig::default() });
            dl.run_for_slots(SLOTS)
        })
    };
    shared.submit_transaction(&bob.address, &alice.address, 20.0, 0.5, &bob.secret)?;

    let filled = producer
        .join()
        .map_err(|_| anyhow::anyhow!("dev loop thread panicked"))?;
    tracing::info!(filled, slots = SLOTS, "dev loop finished");

    shared.verify_chain()?;

    let summary = serde_json::json!({
        "chain": shared.chain_info(),
        "wallets": {
            "alice": { "address": alice.address, "balance": shared.balance_of(&alice.address) },
            "bob": {
                "address": bob.address,
                "balance": shared.balance_of(&bob.address),
                "staking": shared.staking_info_of(&bob.address),
            },
        },
        "validators": shared.list_validators(),
        "latest": shared.list_blocks(BlockOrder::NewestFirst).into_iter().next(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
