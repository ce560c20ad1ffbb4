//! One-shot profit estimate for a candidate arbitrage trade.
//!
//! # Usage
//! ```sh
//! predict <amount> <slippage> <gas_price> <volatility>
//! ```
//!
//! Prints the predicted profit, or `0` on any failure (bad arguments,
//! missing or corrupt model). Always exits with status 0; callers must
//! parse stdout. Logs go to stderr.
//!
//! Arguments must be finite numbers: `nan`, `inf` and `-inf` are rejected
//! and score `0`. Arguments after the fourth are ignored.
//!
//! `-h`/`--help` and `-V`/`--version` print clap's text instead of a score,
//! so scripted callers should not pass them.
//!
//! The `MIN_PROFIT_PERCENT` execution decision is logged at `info`
//! (`RUST_LOG=info`); stdout carries only the score.

use arbprofit::application::ml::SmartCorePredictor;
use arbprofit::config::{ModelEnvConfig, ObservabilityEnvConfig};
use arbprofit::infrastructure::observability::init_logging;
use clap::Parser;
use clap::error::ErrorKind;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Model file to score with (overrides MODEL_PATH)
    #[arg(long)]
    model_path: Option<PathBuf>,

    /// amount slippage gas_price volatility
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    features: Vec<String>,
}

fn main() {
    dotenvy::dotenv().ok();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(_) => {
            println!("0");
            return;
        }
    };

    let observability = ObservabilityEnvConfig::from_env().unwrap_or_default();
    init_logging(observability.log_format, "warn").ok();

    let config = ModelEnvConfig::from_env().unwrap_or_else(|e| {
        warn!("Invalid model config, using defaults: {:#}", e);
        ModelEnvConfig::default()
    });
    let gate = config.profit_gate();
    let model_path = args.model_path.unwrap_or(config.model_path);

    let predictor = SmartCorePredictor::new(model_path);
    let predicted = predictor.predict_args(&args.features);
    info!(
        predicted,
        min_profit = gate.min_profit,
        execute = gate.should_execute(predicted),
        "Scored trade"
    );
    println!("{}", predicted);
}
