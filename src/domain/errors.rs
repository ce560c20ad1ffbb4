use crate::domain::ml::feature_contract::Feature;
use std::path::PathBuf;
use thiserror::Error;

/// Errors related to predictor input arguments
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Expected {expected} feature arguments, got {got}")]
    MissingArguments { expected: usize, got: usize },

    #[error("Argument for {feature} is not a number: '{value}'")]
    NotANumber { feature: Feature, value: String },

    #[error("Argument for {feature} is not finite: {value}")]
    NotFinite { feature: Feature, value: f64 },
}

/// Errors related to reading historical training data
#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("Training store at {path:?} is unreachable: {reason}")]
    Unreachable { path: PathBuf, reason: String },

    #[error("Training data query failed: {reason}")]
    Query { reason: String },

    #[error("Label column '{column}' not found in training data (columns: {available:?})")]
    MissingLabel {
        column: String,
        available: Vec<String>,
    },
}

/// Errors related to fitting and evaluating the profit model
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("Training corpus is empty")]
    EmptyCorpus,

    #[error("No usable feature columns found (expected any of {expected:?})")]
    NoUsableFeatures { expected: &'static [&'static str] },

    #[error("Failed to build feature matrix: {reason}")]
    Matrix { reason: String },

    #[error("Model fit failed: {reason}")]
    Fit { reason: String },

    #[error("Model evaluation failed: {reason}")]
    Evaluate { reason: String },
}

/// Errors related to persisted model artifacts
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("No model artifact at {path:?}")]
    NotFound { path: PathBuf },

    #[error("Model artifact at {path:?} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("Model schema mismatch: {reason}")]
    SchemaMismatch { reason: String },

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize model: {reason}")]
    Serialize { reason: String },

    #[error("Inference failed: {reason}")]
    Inference { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ml::feature_contract::FEATURE_NAMES;

    #[test]
    fn test_input_error_formatting() {
        let error = InputError::NotANumber {
            feature: Feature::Amount,
            value: "abc".to_string(),
        };

        let msg = error.to_string();
        assert!(msg.contains("amount"));
        assert!(msg.contains("'abc'"));
    }

    #[test]
    fn test_training_error_formatting() {
        let error = TrainingError::NoUsableFeatures {
            expected: FEATURE_NAMES,
        };

        let msg = error.to_string();
        assert!(msg.contains("gas_price"));
        assert_eq!(TrainingError::EmptyCorpus.to_string(), "Training corpus is empty");
    }

    #[test]
    fn test_data_source_error_formatting() {
        let error = DataSourceError::MissingLabel {
            column: "profit".to_string(),
            available: vec!["amount".to_string(), "pnl".to_string()],
        };

        let msg = error.to_string();
        assert!(msg.contains("'profit'"));
        assert!(msg.contains("pnl"));
    }
}
