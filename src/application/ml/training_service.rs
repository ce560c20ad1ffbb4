use super::predictor::ProfitPredictor;
use super::trainer::{TrainReport, Trainer};
use crate::domain::ports::TrainingDataSource;
use crate::infrastructure::model_store::ModelStore;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// Runs one offline training cycle: load corpus, fit, evaluate, persist.
///
/// Nothing is written when any step before the save fails, so the
/// previous model stays in place.
pub struct TrainingService {
    source: Arc<dyn TrainingDataSource>,
    trainer: Trainer,
    store: ModelStore,
    subscribers: Vec<Arc<dyn ProfitPredictor>>,
}

impl TrainingService {
    pub fn new(source: Arc<dyn TrainingDataSource>, trainer: Trainer, store: ModelStore) -> Self {
        Self {
            source,
            trainer,
            store,
            subscribers: Vec::new(),
        }
    }

    /// Registers a predictor whose cached model is dropped after every successful save.
    pub fn with_predictor(mut self, predictor: Arc<dyn ProfitPredictor>) -> Self {
        self.subscribers.push(predictor);
        self
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    pub async fn run(&self) -> Result<TrainReport> {
        info!("Loading training data...");
        let corpus = self
            .source
            .load_training_data()
            .await
            .context("Failed to load training data")?;

        if corpus.is_synthetic() {
            warn!(
                "Training store not found, using {} synthetic samples ({})",
                corpus.len(),
                corpus.origin
            );
        } else {
            info!("Loaded {} training samples from store", corpus.len());
        }

        let (artifact, report) = self.trainer.train(&corpus).context("Training failed")?;

        info!(
            train_r2 = ?report.train_r2,
            test_r2 = ?report.test_r2,
            synthetic = report.used_synthetic_data(),
            "Training completed"
        );

        self.store
            .save(&artifact)
            .with_context(|| format!("Failed to save model to {:?}", self.store.path()))?;

        for predictor in &self.subscribers {
            predictor.invalidate();
        }

        Ok(report)
    }
}
