pub mod database;
pub mod training_data_repository;

pub use database::Database;
pub use training_data_repository::{
    SqliteTrainingDataRecorder, SqliteTrainingDataSource, TrainingDataSettings,
};
