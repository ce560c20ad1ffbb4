pub mod model_store;
pub mod observability;
pub mod persistence;

pub use model_store::ModelStore;
pub use persistence::{Database, SqliteTrainingDataRecorder, SqliteTrainingDataSource};
