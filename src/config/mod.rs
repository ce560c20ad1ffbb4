//! Configuration module for the profit model.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by concern: model lifecycle and observability.

mod model_config;
mod observability_config;

pub use model_config::{DEFAULT_DATABASE_PATH, DEFAULT_MIN_PROFIT_PERCENT, ModelEnvConfig};
pub use observability_config::{LogFormat, ObservabilityEnvConfig};

use anyhow::{Context, Result};

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub model: ModelEnvConfig,
    pub observability: ObservabilityEnvConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let model = ModelEnvConfig::from_env().context("Failed to load model config")?;
        let observability =
            ObservabilityEnvConfig::from_env().context("Failed to load observability config")?;

        Ok(Self {
            model,
            observability,
        })
    }
}
