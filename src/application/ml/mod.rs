pub mod predictor;
pub mod smartcore_predictor;
pub mod synthetic;
pub mod trainer;
pub mod training_service;

pub use predictor::{ProfitGate, ProfitPredictor};
pub use smartcore_predictor::{NEUTRAL_PROFIT, SmartCorePredictor};
pub use trainer::{TrainReport, Trainer, TrainerParams};
pub use training_service::TrainingService;
