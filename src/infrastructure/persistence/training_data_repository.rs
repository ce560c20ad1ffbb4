use super::database::Database;
use crate::application::ml::synthetic::{
    DEFAULT_SYNTHETIC_SAMPLES, DEFAULT_SYNTHETIC_SEED, synthetic_corpus,
};
use crate::domain::errors::DataSourceError;
use crate::domain::ml::{
    CorpusOrigin, Feature, FeatureVector, TrainingCorpus, TrainingExample,
};
use crate::domain::ports::{TrainingDataSink, TrainingDataSource};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, SqlitePool, TypeInfo, ValueRef};
use std::path::PathBuf;
use tracing::{debug, info};

pub const DEFAULT_TRAINING_TABLE: &str = "ai_training_data";
pub const DEFAULT_LABEL_COLUMN: &str = "profit";
pub const DEFAULT_TRAINING_WINDOW: usize = 1000;

/// How the training corpus is read from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingDataSettings {
    pub table: String,
    pub label_column: String,
    /// Maximum number of most recent rows to read
    pub window: usize,
    pub synthetic_samples: usize,
    pub synthetic_seed: u64,
}

impl Default for TrainingDataSettings {
    fn default() -> Self {
        Self {
            table: DEFAULT_TRAINING_TABLE.to_string(),
            label_column: DEFAULT_LABEL_COLUMN.to_string(),
            window: DEFAULT_TRAINING_WINDOW,
            synthetic_samples: DEFAULT_SYNTHETIC_SAMPLES,
            synthetic_seed: DEFAULT_SYNTHETIC_SEED,
        }
    }
}

/// Reads labeled trade outcomes from the SQLite history store.
///
/// A missing database file is the first-run path and yields the synthetic corpus.
/// Any other failure is returned to the caller.
pub struct SqliteTrainingDataSource {
    db_path: PathBuf,
    settings: TrainingDataSettings,
}

impl SqliteTrainingDataSource {
    pub fn new(db_path: impl Into<PathBuf>, settings: TrainingDataSettings) -> Self {
        Self {
            db_path: db_path.into(),
            settings,
        }
    }

    fn corpus_from_rows(&self, rows: &[SqliteRow]) -> Result<TrainingCorpus, DataSourceError> {
        let label = &self.settings.label_column;
        let Some(first) = rows.first() else {
            return Ok(TrainingCorpus::new(
                Vec::new(),
                label.clone(),
                Vec::new(),
                CorpusOrigin::Store,
            ));
        };

        let columns: Vec<String> = first
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        let position = |name: &str| columns.iter().position(|c| c.eq_ignore_ascii_case(name));

        let label_idx = position(label).ok_or_else(|| DataSourceError::MissingLabel {
            column: label.clone(),
            available: columns.clone(),
        })?;

        // Contract features present in the result, in contract order
        let feature_idx: Vec<(Feature, usize)> = Feature::ALL
            .into_iter()
            .filter_map(|f| position(f.column_name()).map(|idx| (f, idx)))
            .collect();

        let mut examples = Vec::with_capacity(rows.len());
        let mut skipped = 0usize;
        'rows: for row in rows {
            let Some(profit) = read_number(row, label_idx)? else {
                skipped += 1;
                continue;
            };

            let mut features = FeatureVector::default();
            for (feature, idx) in &feature_idx {
                match read_number(row, *idx)? {
                    Some(value) => features.set(*feature, value),
                    None => {
                        skipped += 1;
                        continue 'rows;
                    }
                }
            }
            examples.push(TrainingExample { features, profit });
        }

        if skipped > 0 {
            debug!(
                "Skipped {} rows with NULL or non-numeric feature or label values",
                skipped
            );
        }

        Ok(TrainingCorpus::new(
            feature_idx.into_iter().map(|(f, _)| f).collect(),
            label.clone(),
            examples,
            CorpusOrigin::Store,
        ))
    }
}

/// Reads a numeric cell. INTEGER and REAL values are accepted; NULL, TEXT,
/// BLOB and non-finite values are `None`.
fn read_number(row: &SqliteRow, idx: usize) -> Result<Option<f64>, DataSourceError> {
    let raw = row.try_get_raw(idx).map_err(|e| DataSourceError::Query {
        reason: e.to_string(),
    })?;
    if raw.is_null() || !matches!(raw.type_info().name(), "INTEGER" | "REAL") {
        return Ok(None);
    }

    // Storage class checked above; SQLite widens INTEGER to f64
    let value: f64 = row
        .try_get_unchecked(idx)
        .map_err(|e| DataSourceError::Query {
            reason: e.to_string(),
        })?;
    Ok(Some(value).filter(|v| v.is_finite()))
}

#[async_trait]
impl TrainingDataSource for SqliteTrainingDataSource {
    async fn load_training_data(&self) -> Result<TrainingCorpus, DataSourceError> {
        if !self.db_path.exists() {
            info!(
                "Database not found at {:?}, creating sample data...",
                self.db_path
            );
            return Ok(synthetic_corpus(
                self.settings.synthetic_samples,
                self.settings.synthetic_seed,
                &self.settings.label_column,
            ));
        }

        let db = Database::open_read_only(&self.db_path)
            .await
            .map_err(|e| DataSourceError::Unreachable {
                path: self.db_path.clone(),
                reason: format!("{:#}", e),
            })?;

        let query = format!(
            "SELECT * FROM {} ORDER BY timestamp DESC LIMIT ?",
            self.settings.table
        );
        let rows = sqlx::query(&query)
            .bind(self.settings.window as i64)
            .fetch_all(&db.pool)
            .await;
        db.close().await;

        let rows = rows.map_err(|e| DataSourceError::Query {
            reason: e.to_string(),
        })?;

        let corpus = self.corpus_from_rows(&rows)?;
        info!(
            "Read {} rows from {}, {} usable (features: {:?})",
            rows.len(),
            self.settings.table,
            corpus.len(),
            corpus.features
        );
        Ok(corpus)
    }
}

/// Appends observed opportunities and their outcomes to the training table.
pub struct SqliteTrainingDataRecorder {
    pool: SqlitePool,
    table: String,
    label_column: String,
}

impl SqliteTrainingDataRecorder {
    pub fn new(db: &Database, settings: &TrainingDataSettings) -> Self {
        Self {
            pool: db.pool.clone(),
            table: settings.table.clone(),
            label_column: settings.label_column.clone(),
        }
    }

    /// Inserts one example with an explicit timestamp (unix millis).
    pub async fn record_at(&self, example: &TrainingExample, timestamp: i64) -> Result<()> {
        let fv = &example.features;
        sqlx::query(&format!(
            r#"
            INSERT INTO {} (amount, slippage, gas_price, volatility, {}, timestamp)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            self.table, self.label_column
        ))
        .bind(fv.amount)
        .bind(fv.slippage)
        .bind(fv.gas_price)
        .bind(fv.volatility)
        .bind(example.profit)
        .bind(timestamp)
        .execute(&self.pool)
        .await
        .context("Failed to record training example")?;

        Ok(())
    }
}

#[async_trait]
impl TrainingDataSink for SqliteTrainingDataRecorder {
    async fn record(&self, example: &TrainingExample) -> Result<()> {
        self.record_at(example, Utc::now().timestamp_millis()).await
    }
}
