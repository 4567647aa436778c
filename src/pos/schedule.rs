// src/pos/schedule.rs

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::ChainError;
use crate::pos::registry::{Validator, ValidatorSet};
use crate::types::{Address, Amount};

/// Proposer selection interface: one pick per produced block.
pub trait ProposerSelector: Send + Sync {
    /// Pick the producer for the next block from the current set.
    fn select<'a>(&mut self, set: &'a ValidatorSet) -> Result<&'a Validator, ChainError>;
}

/// Walk eligible validators in enumeration order, accumulating stake, and return the
/// first whose cumulative stake reaches `draw`.
///
/// Float accumulation can fall short of a draw close to the total; in that case the
/// first eligible validator is returned instead of failing.
/// Returns `None` only when no validator is eligible.
pub fn pick_by_draw(set: &ValidatorSet, draw: Amount) -> Option<&Validator> {
    let mut cumulative: Amount = 0.0;
    for v in set.eligible() {
        cumulative += v.stake;
        if cumulative >= draw {
            return Some(v);
        }
    }
    set.eligible().next()
}

/// Stake-weighted random pick: P(v) = v.stake / total_active_stake.
pub fn select_validator<'a, R: Rng + ?Sized>(
    set: &'a ValidatorSet,
    rng: &mut R,
) -> Result<&'a Validator, ChainError> {
    let total = set.total_active_stake();
    if total.is_nan() || total <= 0.0 {
        return Err(ChainError::NoActiveValidators);
    }
    // uniform in [0, total)
    let draw = rng.gen::<f64>() * total;
    tracing::debug!(draw, total, "proposer draw");
    pick_by_draw(set, draw).ok_or(ChainError::NoActiveValidators)
}

/// Default selector backed by a seedable PRNG.
pub struct StakeWeightedSelector {
    rng: StdRng,
}

impl StakeWeightedSelector {
    /// Seeded for reproducible runs, or from OS entropy when `seed` is `None`.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl ProposerSelector for StakeWeightedSelector {
    fn select<'a>(&mut self, set: &'a ValidatorSet) -> Result<&'a Validator, ChainError> {
        select_validator(set, &mut self.rng)
    }
}

/// Always names the same validator while it is eligible. Useful for scripted runs.
pub struct FixedSelector(pub Address);

impl ProposerSelector for FixedSelector {
    fn select<'a>(&mut self, set: &'a ValidatorSet) -> Result<&'a Validator, ChainError> {
        set.get(&self.0)
            .filter(|v| v.is_eligible())
            .ok_or(ChainError::NoActiveValidators)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pos::registry::ValidatorStatus;
    use std::collections::HashMap;

    fn v(addr: &str, stake: Amount) -> Validator {
        Validator::new(addr, stake, ValidatorStatus::Active)
    }

    fn three() -> ValidatorSet {
        ValidatorSet::from_genesis(vec![v("a", 100.0), v("b", 300.0), v("c", 600.0)])
    }

    #[test]
    fn draw_walks_cumulative_stake() {
        let s = three();
        assert_eq!(pick_by_draw(&s, 0.0).unwrap().address, "a");
        assert_eq!(pick_by_draw(&s, 100.0).unwrap().address, "a");
        assert_eq!(pick_by_draw(&s, 100.5).unwrap().address, "b");
        assert_eq!(pick_by_draw(&s, 400.0).unwrap().address, "b");
        assert_eq!(pick_by_draw(&s, 999.9).unwrap().address, "c");
    }

    #[test]
    fn draw_past_total_falls_back_to_first_eligible() {
        let mut s = three();
        s.deactivate("a").unwrap();
        assert_eq!(pick_by_draw(&s, 1e12).unwrap().address, "b");
    }

    #[test]
    fn draw_skips_ineligible() {
        let s = ValidatorSet::from_genesis(vec![v("a", 0.0), v("b", 5.0)]);
        assert_eq!(pick_by_draw(&s, 0.0).unwrap().address, "b");
    }

    #[test]
    fn single_validator_always_selected() {
        let s = ValidatorSet::from_genesis(vec![v("only", 42.0)]);
        let mut sel = StakeWeightedSelector::new(Some(1));
        for _ in 0..100 {
            assert_eq!(sel.select(&s).unwrap().address, "only");
        }
    }

    #[test]
    fn no_eligible_validators_fails() {
        let mut all_zero = ValidatorSet::from_genesis(vec![v("a", 0.0), v("b", 0.0)]);
        let mut sel = StakeWeightedSelector::new(Some(1));
        assert_eq!(sel.select(&all_zero).unwrap_err(), ChainError::NoActiveValidators);

        all_zero.bond("a", 10.0).unwrap();
        all_zero.deactivate("a").unwrap();
        assert_eq!(sel.select(&all_zero).unwrap_err(), ChainError::NoActiveValidators);

        let empty = ValidatorSet::default();
        assert_eq!(sel.select(&empty).unwrap_err(), ChainError::NoActiveValidators);
    }

    #[test]
    fn selection_is_reproducible_for_a_seed() {
        let s = three();
        let mut a = StakeWeightedSelector::new(Some(7));
        let mut b = StakeWeightedSelector::new(Some(7));
        for _ in 0..50 {
            assert_eq!(a.select(&s).unwrap().address, b.select(&s).unwrap().address);
        }
    }

    #[test]
    fn fixed_selector_requires_eligibility() {
        let mut s = three();
        let mut sel = FixedSelector("b".into());
        assert_eq!(sel.select(&s).unwrap().address, "b");
        s.deactivate("b").unwrap();
        assert_eq!(sel.select(&s).unwrap_err(), ChainError::NoActiveValidators);
        let mut missing = FixedSelector("zz".into());
        assert_eq!(missing.select(&s).unwrap_err(), ChainError::NoActiveValidators);
    }

    #[test]
    fn frequencies_follow_stake() {
        let s = three();
        let mut rng = StdRng::seed_from_u64(2024);
        let n = 20_000;
        let mut counts: HashMap<String, usize> = HashMap::new();
        for _ in 0..n {
            let picked = select_validator(&s, &mut rng).unwrap();
            *counts.entry(picked.address.clone()).or_insert(0) += 1;
        }
        let share = |a: &str| counts.get(a).copied().unwrap_or(0) as f64 / n as f64;
        assert!((share("a") - 0.1).abs() < 0.02, "a={}", share("a"));
        assert!((share("b") - 0.3).abs() < 0.03, "b={}", share("b"));
        assert!((share("c") - 0.6).abs() < 0.03, "c={}", share("c"));
    }
}
