//! Deterministic fallback corpus used when no trade history store exists.

use crate::domain::ml::{CorpusOrigin, FeatureVector, TrainingCorpus, TrainingExample};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;

pub const DEFAULT_SYNTHETIC_SAMPLES: usize = 100;
pub const DEFAULT_SYNTHETIC_SEED: u64 = 42;

const AMOUNT_RANGE: RangeInclusive<f64> = 1000.0..=10000.0;
const SLIPPAGE_RANGE: RangeInclusive<f64> = 0.1..=1.0;
const GAS_PRICE_RANGE: RangeInclusive<f64> = 20.0..=100.0;
const VOLATILITY_RANGE: RangeInclusive<f64> = 0.5..=3.0;
const PROFIT_RANGE: RangeInclusive<f64> = -50.0..=200.0;

/// Generates `n` examples with uniformly drawn features and labels.
/// The same seed always yields the same examples.
pub fn synthetic_examples(n: usize, seed: u64) -> Vec<TrainingExample> {
    let mut rng = StdRng::seed_from_u64(seed);

    // Column-wise generation: every amount first, then every slippage, ...
    let mut column = |range: RangeInclusive<f64>| -> Vec<f64> {
        (0..n).map(|_| rng.random_range(range.clone())).collect()
    };
    let amounts = column(AMOUNT_RANGE);
    let slippages = column(SLIPPAGE_RANGE);
    let gas_prices = column(GAS_PRICE_RANGE);
    let volatilities = column(VOLATILITY_RANGE);
    let profits = column(PROFIT_RANGE);

    (0..n)
        .map(|i| TrainingExample {
            features: FeatureVector::new(amounts[i], slippages[i], gas_prices[i], volatilities[i]),
            profit: profits[i],
        })
        .collect()
}

/// Synthetic corpus over the full feature contract, flagged as synthetic.
pub fn synthetic_corpus(n: usize, seed: u64, label: &str) -> TrainingCorpus {
    TrainingCorpus::full(
        label,
        synthetic_examples(n, seed),
        CorpusOrigin::Synthetic { seed },
    )
}
