//! Observability configuration parsing from environment variables.
//!
//! This module handles the log output format of the binaries.

use anyhow::bail;
use std::env;
use std::str::FromStr;

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Pretty,
    #[default]
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => bail!(
                "Invalid LOG_FORMAT: {}. Must be 'pretty', 'compact', or 'json'",
                s
            ),
        }
    }
}

/// Observability environment configuration
#[derive(Debug, Clone, Default)]
pub struct ObservabilityEnvConfig {
    pub log_format: LogFormat,
}

impl ObservabilityEnvConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let log_format = match env::var("LOG_FORMAT") {
            Ok(raw) => LogFormat::from_str(&raw)?,
            Err(_) => LogFormat::default(),
        };
        Ok(Self { log_format })
    }
}
