//! Model lifecycle configuration parsing from environment variables.
//!
//! Covers where the model and the trade history live and the fixed
//! training hyperparameters.

use crate::application::ml::predictor::ProfitGate;
use crate::application::ml::synthetic::{DEFAULT_SYNTHETIC_SAMPLES, DEFAULT_SYNTHETIC_SEED};
use crate::application::ml::trainer::{
    DEFAULT_N_TREES, DEFAULT_SEED, DEFAULT_TEST_RATIO, TrainerParams,
};
use crate::domain::ml::FEATURE_NAMES;
use crate::infrastructure::model_store::DEFAULT_MODEL_PATH;
use crate::infrastructure::persistence::database::is_valid_identifier;
use crate::infrastructure::persistence::training_data_repository::{
    DEFAULT_LABEL_COLUMN, DEFAULT_TRAINING_TABLE, DEFAULT_TRAINING_WINDOW, TrainingDataSettings,
};
use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_DATABASE_PATH: &str = "data/arbitrage.db";
pub const DEFAULT_MIN_PROFIT_PERCENT: f64 = 0.5;

/// Model lifecycle environment configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ModelEnvConfig {
    pub model_path: PathBuf,
    pub database_path: PathBuf,
    pub training_table: String,
    pub label_column: String,
    pub training_window: usize,
    pub n_trees: usize,
    pub seed: u64,
    pub test_ratio: f64,
    pub synthetic_samples: usize,
    pub min_profit_percent: f64,
}

impl Default for ModelEnvConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            training_table: DEFAULT_TRAINING_TABLE.to_string(),
            label_column: DEFAULT_LABEL_COLUMN.to_string(),
            training_window: DEFAULT_TRAINING_WINDOW,
            n_trees: DEFAULT_N_TREES,
            seed: DEFAULT_SEED,
            test_ratio: DEFAULT_TEST_RATIO,
            synthetic_samples: DEFAULT_SYNTHETIC_SAMPLES,
            min_profit_percent: DEFAULT_MIN_PROFIT_PERCENT,
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Invalid {}: '{}'", key, raw)),
        None => Ok(default),
    }
}

impl ModelEnvConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup (environment, map, ...).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            model_path: lookup("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            database_path: lookup("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            training_table: lookup("TRAINING_TABLE").unwrap_or(defaults.training_table),
            label_column: lookup("LABEL_COLUMN").unwrap_or(defaults.label_column),
            training_window: parse_or(&lookup, "TRAINING_WINDOW", defaults.training_window)?,
            n_trees: parse_or(&lookup, "N_TREES", defaults.n_trees)?,
            seed: parse_or(&lookup, "MODEL_SEED", defaults.seed)?,
            test_ratio: parse_or(&lookup, "TEST_RATIO", defaults.test_ratio)?,
            synthetic_samples: parse_or(
                &lookup,
                "SYNTHETIC_SAMPLES",
                defaults.synthetic_samples,
            )?,
            min_profit_percent: parse_or(
                &lookup,
                "MIN_PROFIT_PERCENT",
                defaults.min_profit_percent,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !is_valid_identifier(&self.training_table) {
            bail!("Invalid TRAINING_TABLE: '{}'", self.training_table);
        }
        if !is_valid_identifier(&self.label_column) {
            bail!("Invalid LABEL_COLUMN: '{}'", self.label_column);
        }
        if FEATURE_NAMES
            .iter()
            .any(|f| f.eq_ignore_ascii_case(&self.label_column))
        {
            bail!(
                "LABEL_COLUMN '{}' collides with a feature column",
                self.label_column
            );
        }
        if self.training_window == 0 {
            bail!("TRAINING_WINDOW must be greater than 0");
        }
        if self.n_trees == 0 {
            bail!("N_TREES must be greater than 0");
        }
        if !(self.test_ratio > 0.0 && self.test_ratio < 1.0) {
            bail!("TEST_RATIO must be in (0, 1), got {}", self.test_ratio);
        }
        if !self.min_profit_percent.is_finite() {
            bail!("MIN_PROFIT_PERCENT must be finite");
        }
        Ok(())
    }

    pub fn trainer_params(&self) -> TrainerParams {
        TrainerParams {
            n_trees: self.n_trees,
            seed: self.seed,
            test_ratio: self.test_ratio,
        }
    }

    /// Execution threshold for predicted profit (`MIN_PROFIT_PERCENT`).
    pub fn profit_gate(&self) -> ProfitGate {
        ProfitGate::new(self.min_profit_percent)
    }

    pub fn training_data_settings(&self) -> TrainingDataSettings {
        TrainingDataSettings {
            table: self.training_table.clone(),
            label_column: self.label_column.clone(),
            window: self.training_window,
            synthetic_samples: self.synthetic_samples,
            synthetic_seed: DEFAULT_SYNTHETIC_SEED,
        }
    }
}
