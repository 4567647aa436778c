// src/engine.rs

use std::collections::BTreeMap;

use crate::chain::{Chain, LinkError};
use crate::config::{ChainConfig, ConfigError, SettlementMode};
use crate::error::ChainError;
use crate::mempool::PendingPool;
use crate::pos::registry::{Validator, ValidatorSet};
use crate::pos::schedule::{ProposerSelector, StakeWeightedSelector};
use crate::pos::staking::StakingPool;
use crate::state::Ledger;
use crate::stf::settle_batch;
use crate::types::{
    is_valid_amount, now_unix_ms, Address, Amount, Block, BlockOrder, BlockView, ChainInfo,
    Fingerprint, Transaction, TxView, ValidatorView,
};

/// Single-threaded ledger core: chain, pending pool, balances and validators.
///
/// Every mutating operation either completes or leaves the engine untouched.
pub struct ChainEngine {
    chain: Chain,
    pending: PendingPool,
    ledger: Ledger,
    validators: ValidatorSet,
    staking: StakingPool,
    selector: Box<dyn ProposerSelector>,
    config: ChainConfig,
}

impl ChainEngine {
    /// Build genesis from `config` with the default stake-weighted selector.
    pub fn new(config: ChainConfig) -> Result<Self, ConfigError> {
        let selector = StakeWeightedSelector::new(config.rng_seed);
        Self::with_selector(config, Box::new(selector))
    }

    pub fn with_selector(
        config: ChainConfig,
        selector: Box<dyn ProposerSelector>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let validators = ValidatorSet::from_genesis(
            config.genesis_validators.iter().map(|g| g.to_validator()).collect(),
        );

        let mut ledger = Ledger::new();
        // self-stake is supply that lives outside spendable balances
        ledger.add_locked_supply(validators.iter().map(|v| v.stake).sum());
        for a in &config.genesis_allocations {
            ledger.allocate_genesis(&a.address, a.balance);
        }

        let chain = Chain::new(Block::genesis(now_unix_ms()));

        tracing::info!(
            validators = validators.len(),
            total_supply = ledger.total_supply(),
            mode = ?config.settlement_mode,
            "genesis"
        );

        Ok(Self {
            chain,
            pending: PendingPool::new(),
            ledger,
            validators,
            staking: StakingPool::new(),
            selector,
            config,
        })
    }

    // ---- mutations ----

    /// Queue an already-built transaction. Rewards pass; transfers must be authorized.
    pub fn submit(&mut self, tx: Transaction) -> Result<Fingerprint, ChainError> {
        let fp = self.pending.submit(tx).map_err(|e| {
            tracing::warn!(error = %e, "submission rejected");
            e
        })?;
        tracing::debug!(tx = %fp, pending = self.pending.len(), "transaction queued");
        Ok(fp)
    }

    /// Build, authorize with `secret` and queue a transfer.
    pub fn submit_transaction(
        &mut self,
        origin: &str,
        destination: &str,
        amount: Amount,
        fee: Amount,
        secret: &str,
    ) -> Result<Fingerprint, ChainError> {
        let mut tx = Transaction::transfer(origin, destination, amount, fee)?;
        tx.authorize(secret);
        self.submit(tx)
    }

    pub fn produce_block(&mut self) -> Result<BlockView, ChainError> {
        self.produce_block_at(now_unix_ms())
    }

    /// Produce the next block stamped with `created_at` (unix ms).
    ///
    /// Picks a producer, appends its reward to the pending batch, settles what is
    /// affordable and appends the block. On any error nothing is changed.
    pub fn produce_block_at(&mut self, created_at: u64) -> Result<BlockView, ChainError> {
        let producer: Address = self.selector.select(&self.validators)?.address.clone();
        // resolved before anything is touched so the commit below cannot fail halfway
        let producer_idx = self
            .validators
            .index_of(&producer)
            .ok_or_else(|| ChainError::UnknownValidator(producer.clone()))?;

        let reward = Transaction::create_at(
            None,
            producer.as_str(),
            self.config.mining_reward,
            0.0,
            created_at,
        )?;
        let mut batch: Vec<Transaction> = Vec::with_capacity(self.pending.len() + 1);
        batch.extend(self.pending.iter().cloned());
        batch.push(reward);

        let res = settle_batch(&batch, &self.ledger, &producer, self.config.settlement_mode);

        let block = Block::new_at(
            self.chain.len() as u64,
            self.chain.latest().fingerprint().clone(),
            res.included,
            producer.as_str(),
            created_at,
        );
        self.chain.append(block)?;

        // block is on the chain: commit the simulated ledger
        self.ledger = res.ledger;
        self.validators.record_produced_at(producer_idx);
        self.pending.clear();

        let tip = self.chain.latest();
        tracing::info!(
            height = tip.height(),
            producer = %producer,
            txs = tip.transactions().len(),
            dropped = res.dropped.len(),
            fees = res.fees_total,
            minted = res.minted,
            fingerprint = %tip.fingerprint(),
            "block produced"
        );
        Ok(BlockView::from(tip))
    }

    /// Move `amount` from the delegator's balance into `validator`'s stake.
    pub fn delegate(
        &mut self,
        delegator: &str,
        validator: &str,
        amount: Amount,
    ) -> Result<(), ChainError> {
        if !is_valid_amount(amount) {
            return Err(ChainError::InvalidAmount);
        }
        if !self.validators.contains(validator) {
            return Err(ChainError::UnknownValidator(validator.to_string()));
        }
        let available = self.ledger.balance_of(delegator);
        if available < amount {
            return Err(ChainError::InsufficientBalance {
                address: delegator.to_string(),
                needed: amount,
                available,
            });
        }

        // only fallible step first
        self.validators.bond(validator, amount)?;
        self.ledger.debit(delegator, amount);
        self.staking.add(delegator, validator, amount);

        tracing::debug!(delegator, validator, amount, "delegated");
        Ok(())
    }

    pub fn activate_validator(&mut self, address: &str) -> Result<(), ChainError> {
        self.validators.activate(address)?;
        Ok(())
    }

    /// Exclude a validator from selection; stake and delegations stay in place.
    pub fn deactivate_validator(&mut self, address: &str) -> Result<(), ChainError> {
        self.validators.deactivate(address)?;
        Ok(())
    }

    // ---- queries ----

    pub fn balance_of(&self, address: &str) -> Amount {
        self.ledger.balance_of(address)
    }

    pub fn chain_info(&self) -> ChainInfo {
        ChainInfo {
            height: self.chain.height(),
            total_supply: self.ledger.total_supply(),
            active_validator_count: self.validators.active_count(),
            pending_count: self.pending.len(),
        }
    }

    pub fn staking_info_of(&self, address: &str) -> BTreeMap<Address, Amount> {
        self.staking.info_of(address)
    }

    pub fn list_validators(&self) -> Vec<ValidatorView> {
        self.validators.iter().map(|v| self.validator_view(v)).collect()
    }

    pub fn validator(&self, address: &str) -> Option<ValidatorView> {
        self.validators.get(address).map(|v| self.validator_view(v))
    }

    fn validator_view(&self, v: &Validator) -> ValidatorView {
        ValidatorView { delegated: self.staking.delegated_to(&v.address), ..ValidatorView::from(v) }
    }

    pub fn list_blocks(&self, order: BlockOrder) -> Vec<BlockView> {
        match order {
            BlockOrder::OldestFirst => self.chain.iter().map(BlockView::from).collect(),
            BlockOrder::NewestFirst => self.chain.iter().rev().map(BlockView::from).collect(),
        }
    }

    pub fn block_at(&self, height: u64) -> Option<BlockView> {
        self.chain.get(height).map(BlockView::from)
    }

    pub fn latest_block(&self) -> BlockView {
        BlockView::from(self.chain.latest())
    }

    pub fn pending_transactions(&self) -> Vec<TxView> {
        self.pending.iter().map(TxView::from).collect()
    }

    /// Every account with a stored balance, by address.
    pub fn accounts(&self) -> BTreeMap<Address, Amount> {
        self.ledger.accounts()
    }

    pub fn verify_chain(&self) -> Result<(), LinkError> {
        self.chain.verify_links()
    }

    #[inline]
    pub fn height(&self) -> u64 {
        self.chain.height()
    }

    #[inline]
    pub fn total_supply(&self) -> Amount {
        self.ledger.total_supply()
    }

    pub fn settlement_mode(&self) -> SettlementMode {
        self.config.settlement_mode
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

}

impl std::fmt::Debug for ChainEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainEngine")
            .field("height", &self.chain.height())
            .field("pending", &self.pending.len())
            .field("total_supply", &self.ledger.total_supply())
            .field("validators", &self.validators.len())
            .finish()
    }
}
