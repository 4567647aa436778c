// src/stf.rs

use crate::config::SettlementMode;
use crate::state::Ledger;
use crate::types::{Fingerprint, Transaction};

/// Outcome of settling one block's worth of transactions.
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// Transactions that made it into the block, in submission order.
    pub included: Vec<Transaction>,
    /// Fingerprints of transactions filtered out as unaffordable.
    pub dropped: Vec<Fingerprint>,
    /// Ledger after settlement. Commit it only once the block is appended.
    pub ledger: Ledger,
    /// Fees credited to the producer across the batch.
    pub fees_total: f64,
    /// New supply minted by reward transactions.
    pub minted: f64,
}

/// Rewards always settle; a transfer settles when its origin can pay amount + fee.
pub fn is_transaction_settleable(tx: &Transaction, ledger: &Ledger) -> bool {
    match tx.origin() {
        None => true,
        Some(origin) => ledger.can_afford(origin, tx.total_cost()),
    }
}

/// Apply a single transaction to `ledger`.
///
/// Transfer: origin pays amount + fee, destination gets amount, producer gets fee.
/// Reward: destination gets amount and supply grows by the same.
pub fn process_transaction(tx: &Transaction, ledger: &mut Ledger, producer: &str) {
    match tx.origin() {
        None => ledger.mint(tx.destination(), tx.amount()),
        Some(origin) => {
            let overdraft = ledger.debit(origin, tx.total_cost());
            if overdraft > 0.0 {
                tracing::warn!(
                    tx = %tx.fingerprint(),
                    origin,
                    overdraft,
                    "overdraft: origin balance below zero"
                );
            }
            ledger.credit(tx.destination(), tx.amount());
            ledger.credit(producer, tx.fee());
        }
    }
}

/// Filter `pending` and settle what survives on a clone of `ledger`, in order.
///
/// `Snapshot` judges every transaction against `ledger` as given; `Incremental`
/// judges each one against the running result of those before it.
pub fn settle_batch(
    pending: &[Transaction],
    ledger: &Ledger,
    producer: &str,
    mode: SettlementMode,
) -> BatchResult {
    let mut sim = ledger.clone();
    let mut included = Vec::with_capacity(pending.len());
    let mut dropped = Vec::new();
    let mut fees_total = 0.0;
    let mut minted = 0.0;

    for tx in pending {
        let reference = match mode {
            SettlementMode::Snapshot => ledger,
            SettlementMode::Incremental => &sim,
        };
        if !is_transaction_settleable(tx, reference) {
            tracing::warn!(
                tx = %tx.fingerprint(),
                origin = tx.origin().unwrap_or_default(),
                cost = tx.total_cost(),
                "dropping unaffordable transaction"
            );
            dropped.push(tx.fingerprint().clone());
            continue;
        }
        process_transaction(tx, &mut sim, producer);
        if tx.is_reward() {
            minted += tx.amount();
        } else {
            fees_total += tx.fee();
        }
        included.push(tx.clone());
    }

    BatchResult { included, dropped, ledger: sim, fees_total, minted }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn funded(pairs: &[(&str, f64)]) -> Ledger {
        let mut l = Ledger::new();
        for (who, amt) in pairs {
            l.mint(who, *amt);
        }
        l
    }

    fn transfer(from: &str, to: &str, amount: f64, fee: f64) -> Transaction {
        let mut tx = Transaction::transfer(from, to, amount, fee).unwrap();
        tx.authorize("s");
        tx
    }

    #[test]
    fn reward_is_always_settleable() {
        let l = Ledger::new();
        let tx = Transaction::reward("B", 1e9).unwrap();
        assert!(is_transaction_settleable(&tx, &l));
    }

    #[test]
    fn transfer_needs_amount_plus_fee() {
        let l = funded(&[("A", 10.0)]);
        assert!(is_transaction_settleable(&transfer("A", "B", 9.0, 1.0), &l));
        assert!(!is_transaction_settleable(&transfer("A", "B", 9.5, 1.0), &l));
        assert!(!is_transaction_settleable(&transfer("Z", "B", 0.1, 0.0), &l));
    }

    #[test]
    fn transfer_deltas() {
        let mut l = funded(&[("A", 100.0)]);
        let supply = l.total_supply();
        process_transaction(&transfer("A", "B", 50.0, 1.0), &mut l, "P");
        assert_eq!(l.balance_of("A"), 49.0);
        assert_eq!(l.balance_of("B"), 50.0);
        assert_eq!(l.balance_of("P"), 1.0);
        assert_eq!(l.total_supply(), supply);
    }

    #[test]
    fn reward_mints() {
        let mut l = Ledger::new();
        process_transaction(&Transaction::reward("V", 50.0).unwrap(), &mut l, "V");
        assert_eq!(l.balance_of("V"), 50.0);
        assert_eq!(l.total_supply(), 50.0);
    }

    #[test]
    fn batch_does_not_touch_input_ledger() {
        let l = funded(&[("A", 100.0)]);
        let before = l.clone();
        let res = settle_batch(&[transfer("A", "B", 10.0, 0.0)], &l, "P", SettlementMode::Snapshot);
        assert_eq!(l, before);
        assert_eq!(res.ledger.balance_of("B"), 10.0);
    }

    #[test]
    fn batch_keeps_order_and_drops_unaffordable() {
        let l = funded(&[("A", 100.0)]);
        let txs = vec![
            transfer("A", "B", 10.0, 1.0),
            transfer("C", "B", 5.0, 0.0),
            Transaction::reward("P", 50.0).unwrap(),
        ];
        let res = settle_batch(&txs, &l, "P", SettlementMode::Snapshot);
        let kept: Vec<_> = res.included.iter().map(|t| t.fingerprint().clone()).collect();
        assert_eq!(kept, vec![txs[0].fingerprint().clone(), txs[2].fingerprint().clone()]);
        assert_eq!(res.dropped, vec![txs[1].fingerprint().clone()]);
        assert_eq!(res.fees_total, 1.0);
        assert_eq!(res.minted, 50.0);
        assert_eq!(res.ledger.balance_of("P"), 51.0);
    }

    #[test]
    fn snapshot_admits_double_spend_with_exact_debits() {
        let l = funded(&[("A", 10.0)]);
        let txs = vec![transfer("A", "B", 8.0, 1.0), transfer("A", "C", 8.0, 1.0)];
        let res = settle_batch(&txs, &l, "P", SettlementMode::Snapshot);
        assert_eq!(res.included.len(), 2);
        assert_eq!(res.ledger.balance_of("A"), 10.0 - 18.0);
        assert_eq!(res.ledger.balance_of("B"), 8.0);
        assert_eq!(res.ledger.balance_of("C"), 8.0);
        assert_eq!(res.ledger.balance_of("P"), 2.0);
        // nothing created outside supply
        let held: f64 = res.ledger.accounts().values().sum();
        assert_eq!(held, res.ledger.total_supply());
    }

    #[test]
    fn incremental_drops_second_spend() {
        let l = funded(&[("A", 10.0)]);
        let txs = vec![transfer("A", "B", 8.0, 0.0), transfer("A", "C", 8.0, 0.0)];
        let res = settle_batch(&txs, &l, "P", SettlementMode::Incremental);
        assert_eq!(res.included.len(), 1);
        assert_eq!(res.dropped, vec![txs[1].fingerprint().clone()]);
        assert_eq!(res.ledger.balance_of("A"), 2.0);
        assert_eq!(res.ledger.balance_of("C"), 0.0);
    }

    #[test]
    fn incremental_lets_received_funds_be_spent() {
        // B is empty before the block but receives from A first
        let l = funded(&[("A", 10.0)]);
        let txs = vec![transfer("A", "B", 8.0, 0.0), transfer("B", "C", 5.0, 0.0)];
        let snap = settle_batch(&txs, &l, "P", SettlementMode::Snapshot);
        assert_eq!(snap.included.len(), 1);
        let inc = settle_batch(&txs, &l, "P", SettlementMode::Incremental);
        assert_eq!(inc.included.len(), 2);
        assert_eq!(inc.ledger.balance_of("C"), 5.0);
    }
}
