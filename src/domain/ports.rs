use crate::domain::errors::DataSourceError;
use crate::domain::ml::{TrainingCorpus, TrainingExample};
use anyhow::Result;
use async_trait::async_trait;

/// Supplies the labeled corpus the trainer fits on.
#[async_trait]
pub trait TrainingDataSource: Send + Sync {
    async fn load_training_data(&self) -> Result<TrainingCorpus, DataSourceError>;
}

/// Appends observed trade outcomes for future training runs.
#[async_trait]
pub trait TrainingDataSink: Send + Sync {
    async fn record(&self, example: &TrainingExample) -> Result<()>;
}
