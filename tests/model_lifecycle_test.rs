use arbprofit::application::ml::{
    ProfitGate, ProfitPredictor, SmartCorePredictor, Trainer, TrainerParams, TrainingService,
};
use arbprofit::domain::errors::TrainingError;
use arbprofit::domain::ml::{FeatureVector, TrainingExample};
use arbprofit::domain::ports::{TrainingDataSink, TrainingDataSource};
use arbprofit::infrastructure::persistence::TrainingDataSettings;
use arbprofit::infrastructure::{
    Database, ModelStore, SqliteTrainingDataRecorder, SqliteTrainingDataSource,
};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

fn temp_dir(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "arbprofit_it_{}_{}_{}",
        tag,
        std::process::id(),
        Uuid::new_v4()
    ))
}

#[test]
fn test_predict_without_model_returns_zero() {
    let dir = temp_dir("nomodel");
    let predictor = SmartCorePredictor::new(dir.join("models").join("arbitrage_model.json"));

    assert_eq!(predictor.predict_args(&["5000", "0.5", "50", "1.5"]), 0.0);
    assert_eq!(predictor.predict_args(&["abc", "0.5", "50", "1.5"]), 0.0);
    assert_eq!(predictor.predict_args::<&str>(&[]), 0.0);
    assert!(!dir.exists());
}

#[tokio::test]
async fn test_first_run_trains_on_synthetic_data() {
    let dir = temp_dir("firstrun");
    let model_path = dir.join("models").join("arbitrage_model.json");
    let source = SqliteTrainingDataSource::new(
        dir.join("data").join("arbitrage.db"),
        TrainingDataSettings::default(),
    );

    let service = TrainingService::new(
        Arc::new(source),
        Trainer::default(),
        ModelStore::new(&model_path),
    );
    let report = service.run().await.expect("training succeeds");

    assert!(report.used_synthetic_data());
    assert_eq!(report.train_size + report.test_size, 100);
    assert!(report.train_r2.unwrap() <= 1.0);
    assert!(report.test_r2.unwrap() <= 1.0);
    assert!(model_path.is_file());

    let predictor = SmartCorePredictor::new(&model_path);
    let estimate = predictor.predict_args(&["5000", "0.5", "50", "1.5"]);
    assert!(estimate.is_finite());
    // Random forest averages training labels, so the estimate stays within their range
    assert!((-50.0..=200.0).contains(&estimate));
    fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn test_recorded_history_drives_training() {
    let dir = temp_dir("history");
    let db_path = dir.join("arbitrage.db");
    let model_path = dir.join("arbitrage_model.json");
    let settings = TrainingDataSettings::default();

    let db = Database::open_or_create(&db_path, &settings.table, &settings.label_column)
        .await
        .unwrap();
    let recorder = SqliteTrainingDataRecorder::new(&db, &settings);
    for i in 0..60 {
        let amount = 1000.0 + 150.0 * i as f64;
        let example = TrainingExample {
            features: FeatureVector::new(amount, 0.5, 40.0, 1.0),
            // Profit grows with trade size
            profit: amount / 100.0,
        };
        recorder.record(&example).await.unwrap();
    }
    db.close().await;

    let source = Arc::new(SqliteTrainingDataSource::new(&db_path, settings));
    let corpus = source.load_training_data().await.unwrap();
    assert_eq!(corpus.len(), 60);
    assert!(!corpus.is_synthetic());

    let predictor = Arc::new(SmartCorePredictor::new(&model_path));
    let service = TrainingService::new(
        source,
        Trainer::new(TrainerParams {
            n_trees: 20,
            ..TrainerParams::default()
        }),
        ModelStore::new(&model_path),
    )
    .with_predictor(predictor.clone());
    let report = service.run().await.unwrap();
    assert!(!report.used_synthetic_data());

    let small = predictor.predict(&FeatureVector::new(1200.0, 0.5, 40.0, 1.0));
    let large = predictor.predict(&FeatureVector::new(9500.0, 0.5, 40.0, 1.0));
    assert!(large > small);

    let gate = ProfitGate::new(50.0);
    assert!(gate.should_execute(large));
    assert!(!gate.should_execute(small));
    fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn test_empty_history_fails_without_writing() {
    let dir = temp_dir("empty");
    let db_path = dir.join("arbitrage.db");
    let model_path = dir.join("models").join("arbitrage_model.json");
    let settings = TrainingDataSettings::default();

    let db = Database::open_or_create(&db_path, &settings.table, &settings.label_column)
        .await
        .unwrap();
    db.close().await;

    let service = TrainingService::new(
        Arc::new(SqliteTrainingDataSource::new(&db_path, settings)),
        Trainer::default(),
        ModelStore::new(&model_path),
    );
    let err = service.run().await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<TrainingError>(),
        Some(TrainingError::EmptyCorpus)
    ));
    assert!(!model_path.exists());
    fs::remove_dir_all(dir).ok();
}
