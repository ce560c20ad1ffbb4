use crate::domain::errors::TrainingError;
use crate::domain::ml::{
    CorpusOrigin, FEATURE_NAMES, FeatureSchema, ModelArtifact, TrainingCorpus,
};
use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use std::fmt;
use tracing::{debug, info};

pub const DEFAULT_N_TREES: usize = 100;
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_TEST_RATIO: f64 = 0.2;

/// Fixed hyperparameters of a training run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainerParams {
    /// Number of trees in the random forest
    pub n_trees: usize,
    /// Seed for both the train/test split and the forest
    pub seed: u64,
    /// Fraction of the corpus held out for evaluation
    pub test_ratio: f64,
}

impl Default for TrainerParams {
    fn default() -> Self {
        Self {
            n_trees: DEFAULT_N_TREES,
            seed: DEFAULT_SEED,
            test_ratio: DEFAULT_TEST_RATIO,
        }
    }
}

/// Evaluation summary of a training run. Observability only, never a gate.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainReport {
    /// R² on the train partition. `None` when the labels have no variance.
    pub train_r2: Option<f64>,
    /// R² on the test partition. `None` when it is empty or has no variance.
    pub test_r2: Option<f64>,
    pub train_size: usize,
    pub test_size: usize,
    pub n_trees: usize,
    pub seed: u64,
    pub origin: CorpusOrigin,
    pub schema: FeatureSchema,
    pub trained_at: DateTime<Utc>,
}

impl TrainReport {
    pub fn used_synthetic_data(&self) -> bool {
        matches!(self.origin, CorpusOrigin::Synthetic { .. })
    }
}

fn fmt_r2(r2: Option<f64>) -> String {
    r2.map(|v| format!("{:.4}", v))
        .unwrap_or_else(|| "n/a".to_string())
}

impl fmt::Display for TrainReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Data source: {}", self.origin)?;
        writeln!(f, "Schema: {}", self.schema)?;
        writeln!(
            f,
            "Samples: train={}, test={} (trees={}, seed={})",
            self.train_size, self.test_size, self.n_trees, self.seed
        )?;
        writeln!(f, "Train R²: {}", fmt_r2(self.train_r2))?;
        write!(f, "Test R²: {}", fmt_r2(self.test_r2))
    }
}

/// Coefficient of determination. Unclamped, so poor fits go negative.
pub fn r_squared(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    let n = actual.len();
    if n == 0 || n != predicted.len() {
        return None;
    }

    let mean = actual.iter().sum::<f64>() / n as f64;
    let ss_tot: f64 = actual.iter().map(|y| (y - mean).powi(2)).sum();
    if ss_tot <= 0.0 {
        return None;
    }
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(y, p)| (y - p).powi(2))
        .sum();

    Some(1.0 - ss_res / ss_tot)
}

pub struct Trainer {
    params: TrainerParams,
}

impl Trainer {
    pub fn new(params: TrainerParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &TrainerParams {
        &self.params
    }

    /// Seeded shuffle split of `n` row indices into `(train, test)`.
    ///
    /// The test partition takes `ceil(n * test_ratio)` rows but never all of them.
    pub fn split(&self, n: usize) -> (Vec<usize>, Vec<usize>) {
        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(self.params.seed);
        indices.shuffle(&mut rng);

        let test_size = ((n as f64 * self.params.test_ratio).ceil() as usize).min(n.saturating_sub(1));
        let train = indices.split_off(test_size);
        (train, indices)
    }

    pub fn train(
        &self,
        corpus: &TrainingCorpus,
    ) -> Result<(ModelArtifact, TrainReport), TrainingError> {
        if corpus.is_empty() {
            return Err(TrainingError::EmptyCorpus);
        }

        let schema = FeatureSchema::from_available(&corpus.features, corpus.label.clone())
            .ok_or(TrainingError::NoUsableFeatures {
                expected: FEATURE_NAMES,
            })?;

        let rows: Vec<Vec<f64>> = corpus
            .examples
            .iter()
            .map(|ex| ex.features.project(&schema))
            .collect();
        let labels: Vec<f64> = corpus.examples.iter().map(|ex| ex.profit).collect();

        let (train_idx, test_idx) = self.split(rows.len());
        let x_train: Vec<Vec<f64>> = train_idx.iter().map(|&i| rows[i].clone()).collect();
        let y_train: Vec<f64> = train_idx.iter().map(|&i| labels[i]).collect();
        let x_test: Vec<Vec<f64>> = test_idx.iter().map(|&i| rows[i].clone()).collect();
        let y_test: Vec<f64> = test_idx.iter().map(|&i| labels[i]).collect();

        info!(
            "Training Random Forest Regressor (Trees: {}, Seed: {}) on {} samples, schema {}",
            self.params.n_trees,
            self.params.seed,
            x_train.len(),
            schema
        );

        let x_matrix = DenseMatrix::from_2d_vec(&x_train).map_err(|e| TrainingError::Matrix {
            reason: e.to_string(),
        })?;

        let params = RandomForestRegressorParameters::default()
            .with_n_trees(self.params.n_trees)
            .with_seed(self.params.seed);

        let model = RandomForestRegressor::fit(&x_matrix, &y_train, params).map_err(|e| {
            TrainingError::Fit {
                reason: e.to_string(),
            }
        })?;

        let trained_at = Utc::now();
        let artifact = ModelArtifact::new(schema.clone(), model, trained_at);

        let train_pred = artifact
            .predict_rows(x_train)
            .map_err(|e| TrainingError::Evaluate {
                reason: e.to_string(),
            })?;
        let train_r2 = r_squared(&y_train, &train_pred);

        let test_r2 = if x_test.is_empty() {
            None
        } else {
            let test_pred = artifact
                .predict_rows(x_test)
                .map_err(|e| TrainingError::Evaluate {
                    reason: e.to_string(),
                })?;
            r_squared(&y_test, &test_pred)
        };

        let report = TrainReport {
            train_r2,
            test_r2,
            train_size: train_idx.len(),
            test_size: test_idx.len(),
            n_trees: self.params.n_trees,
            seed: self.params.seed,
            origin: corpus.origin,
            schema,
            trained_at,
        };
        debug!("Training report: {:?}", report);

        Ok((artifact, report))
    }
}

impl Default for Trainer {
    fn default() -> Self {
        Self::new(TrainerParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ml::synthetic::synthetic_corpus;
    use crate::domain::ml::{Feature, FeatureVector, TrainingExample};

    fn small_trainer() -> Trainer {
        Trainer::new(TrainerParams {
            n_trees: 10,
            ..TrainerParams::default()
        })
    }

    #[test]
    fn test_r_squared_perfect_and_negative() {
        let actual = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(r_squared(&actual, &actual), Some(1.0));

        // Predicting the reverse is worse than the mean, so R² < 0 and stays unclamped
        let reversed = [4.0, 3.0, 2.0, 1.0];
        let r2 = r_squared(&actual, &reversed).unwrap();
        assert!(r2 < 0.0);
        assert!((r2 - (-3.0)).abs() < 1e-12);
    }

    #[test]
    fn test_r_squared_degenerate() {
        assert_eq!(r_squared(&[], &[]), None);
        assert_eq!(r_squared(&[2.0, 2.0], &[1.0, 3.0]), None);
        assert_eq!(r_squared(&[1.0, 2.0], &[1.0]), None);
    }

    #[test]
    fn test_split_is_deterministic_80_20() {
        let trainer = Trainer::default();
        let (train_a, test_a) = trainer.split(100);
        let (train_b, test_b) = trainer.split(100);
        assert_eq!(train_a, train_b);
        assert_eq!(test_a, test_b);
        assert_eq!(train_a.len(), 80);
        assert_eq!(test_a.len(), 20);

        let mut all: Vec<usize> = train_a.iter().chain(test_a.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_keeps_one_training_row() {
        let trainer = Trainer::default();
        let (train, test) = trainer.split(1);
        assert_eq!(train, vec![0]);
        assert!(test.is_empty());
    }

    #[test]
    fn test_empty_corpus_fails() {
        let corpus = synthetic_corpus(0, 42, "profit");
        let result = small_trainer().train(&corpus);
        assert!(matches!(result, Err(TrainingError::EmptyCorpus)));
    }

    #[test]
    fn test_no_usable_features_fails() {
        let mut corpus = synthetic_corpus(20, 42, "profit");
        corpus.features.clear();
        let result = small_trainer().train(&corpus);
        assert!(matches!(
            result,
            Err(TrainingError::NoUsableFeatures { .. })
        ));
    }

    #[test]
    fn test_train_on_synthetic_corpus() {
        let corpus = synthetic_corpus(100, 42, "profit");
        let (artifact, report) = Trainer::default().train(&corpus).expect("training succeeds");

        assert_eq!(report.train_size, 80);
        assert_eq!(report.test_size, 20);
        assert_eq!(report.n_trees, 100);
        assert!(report.used_synthetic_data());
        let train_r2 = report.train_r2.expect("train R²");
        let test_r2 = report.test_r2.expect("test R²");
        assert!(train_r2 <= 1.0);
        assert!(test_r2 <= 1.0);
        assert!(train_r2.is_finite() && test_r2.is_finite());

        let prediction = artifact
            .predict(&FeatureVector::new(5000.0, 0.5, 50.0, 1.5))
            .unwrap();
        assert!(prediction.is_finite());
    }

    #[test]
    fn test_training_is_deterministic() {
        let corpus = synthetic_corpus(60, 42, "profit");
        let trainer = small_trainer();
        let (a, report_a) = trainer.train(&corpus).unwrap();
        let (b, report_b) = trainer.train(&corpus).unwrap();

        assert_eq!(report_a.train_r2, report_b.train_r2);
        assert_eq!(report_a.test_r2, report_b.test_r2);

        let probe = FeatureVector::new(2500.0, 0.3, 40.0, 2.0);
        assert_eq!(a.predict(&probe).unwrap(), b.predict(&probe).unwrap());
    }

    #[test]
    fn test_train_on_feature_subset() {
        let examples: Vec<TrainingExample> = (0..30)
            .map(|i| TrainingExample {
                features: FeatureVector::new(1000.0 + i as f64 * 100.0, 0.0, 0.0, 1.0),
                profit: i as f64,
            })
            .collect();
        let corpus = TrainingCorpus::new(
            vec![Feature::Amount, Feature::Volatility],
            "profit",
            examples,
            CorpusOrigin::Store,
        );

        let (artifact, report) = small_trainer().train(&corpus).unwrap();
        assert_eq!(
            artifact.schema().features(),
            &[Feature::Amount, Feature::Volatility]
        );
        assert_eq!(report.schema.len(), 2);
        assert!(!report.used_synthetic_data());
    }
}
