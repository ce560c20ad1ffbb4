//! Offline training job for the arbitrage profit model.
//!
//! Loads the most recent trade outcomes (or a synthetic corpus when no
//! history store exists yet), fits the random forest, prints the evaluation
//! summary and writes the model. Intended to run as a singleton weekly job.
//!
//! # Usage
//! ```sh
//! cargo run --bin train -- --n-trees 100
//! ```
//!
//! Exits non-zero when training fails; the previous model is left untouched.

use arbprofit::application::ml::{Trainer, TrainingService};
use arbprofit::config::Config;
use arbprofit::infrastructure::observability::init_logging;
use arbprofit::infrastructure::{ModelStore, SqliteTrainingDataSource};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the trade history SQLite database (overrides DATABASE_PATH)
    #[arg(long)]
    database: Option<PathBuf>,

    /// Path to output model file (overrides MODEL_PATH)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Number of trees in the random forest (overrides N_TREES)
    #[arg(long)]
    n_trees: Option<usize>,

    /// Seed for the split and the forest (overrides MODEL_SEED)
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum number of most recent rows to use (overrides TRAINING_WINDOW)
    #[arg(long)]
    max_rows: Option<usize>,

    /// Label column in the training table (overrides LABEL_COLUMN)
    #[arg(long)]
    label_column: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            println!("Training failed: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(config.observability.log_format, "info") {
        eprintln!("Failed to initialise logging: {:#}", e);
    }

    let model = &mut config.model;
    if let Some(database) = args.database {
        model.database_path = database;
    }
    if let Some(output) = args.output {
        model.model_path = output;
    }
    if let Some(n_trees) = args.n_trees {
        model.n_trees = n_trees;
    }
    if let Some(seed) = args.seed {
        model.seed = seed;
    }
    if let Some(max_rows) = args.max_rows {
        model.training_window = max_rows;
    }
    if let Some(label_column) = args.label_column {
        model.label_column = label_column;
    }
    if let Err(e) = model.validate() {
        println!("Training failed: {:#}", e);
        return ExitCode::FAILURE;
    }

    println!("Loading training data from {:?}", model.database_path);
    let source = SqliteTrainingDataSource::new(
        model.database_path.clone(),
        model.training_data_settings(),
    );
    let service = TrainingService::new(
        Arc::new(source),
        Trainer::new(model.trainer_params()),
        ModelStore::new(model.model_path.clone()),
    );

    match service.run().await {
        Ok(report) => {
            if report.used_synthetic_data() {
                println!("WARNING: trained on synthetic fallback data, not trade history.");
            }
            println!("{}", report);
            println!("Model saved to {:?}", service.store().path());
            println!("Training completed");
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("Training failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
