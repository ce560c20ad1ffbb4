use crate::domain::ml::feature_contract::{Feature, TrainingExample};
use std::fmt;

/// Where a training corpus came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorpusOrigin {
    /// Rows read from the trade history store.
    Store,
    /// Deterministic fallback data generated because no store exists.
    Synthetic { seed: u64 },
}

impl fmt::Display for CorpusOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorpusOrigin::Store => write!(f, "store"),
            CorpusOrigin::Synthetic { seed } => write!(f, "synthetic (seed={})", seed),
        }
    }
}

/// Labeled examples plus the contract features actually present in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingCorpus {
    /// Contract features found in the source, in contract order. May be empty.
    pub features: Vec<Feature>,
    pub label: String,
    pub examples: Vec<TrainingExample>,
    pub origin: CorpusOrigin,
}

impl TrainingCorpus {
    pub fn new(
        features: Vec<Feature>,
        label: impl Into<String>,
        examples: Vec<TrainingExample>,
        origin: CorpusOrigin,
    ) -> Self {
        Self {
            features,
            label: label.into(),
            examples,
            origin,
        }
    }

    /// Corpus over the full feature contract.
    pub fn full(
        label: impl Into<String>,
        examples: Vec<TrainingExample>,
        origin: CorpusOrigin,
    ) -> Self {
        Self::new(Feature::ALL.to_vec(), label, examples, origin)
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self.origin, CorpusOrigin::Synthetic { .. })
    }
}
