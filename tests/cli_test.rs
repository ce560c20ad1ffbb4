use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use uuid::Uuid;

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "arbprofit_cli_{}_{}_{}",
        tag,
        std::process::id(),
        Uuid::new_v4()
    ));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn command(bin: &str, cwd: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::new(bin);
    cmd.args(args)
        .current_dir(cwd)
        .env_remove("MODEL_PATH")
        .env_remove("DATABASE_PATH")
        .env_remove("MIN_PROFIT_PERCENT")
        .env_remove("LOG_FORMAT")
        .env_remove("RUST_LOG");
    cmd
}

fn run(bin: &str, cwd: &Path, args: &[&str]) -> Output {
    command(bin, cwd, args).output().expect("binary runs")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[test]
fn test_predict_prints_zero_without_model() {
    let dir = temp_dir("predict_nomodel");
    let output = run(
        env!("CARGO_BIN_EXE_predict"),
        &dir,
        &["5000", "0.5", "50", "1.5"],
    );

    assert!(output.status.success());
    assert_eq!(stdout(&output), "0");
    fs::remove_dir_all(dir).ok();
}

#[test]
fn test_predict_prints_zero_for_bad_input() {
    let dir = temp_dir("predict_badinput");
    for args in [
        vec!["abc", "0.5", "50", "1.5"],
        vec!["5000", "0.5"],
        vec!["inf", "0.5", "50", "1.5"],
        vec!["5000", "NaN", "50", "1.5"],
        vec![],
    ] {
        let output = run(env!("CARGO_BIN_EXE_predict"), &dir, &args);
        assert!(output.status.success());
        assert_eq!(stdout(&output), "0");
    }
    fs::remove_dir_all(dir).ok();
}

#[test]
fn test_train_then_predict() {
    let dir = temp_dir("train_predict");

    let train = run(env!("CARGO_BIN_EXE_train"), &dir, &["--n-trees", "20"]);
    assert!(train.status.success(), "train failed: {}", stdout(&train));
    let summary = stdout(&train);
    assert!(summary.contains("Train R²"));
    assert!(summary.contains("Test R²"));
    assert!(summary.contains("synthetic"));
    assert!(dir.join("models").join("arbitrage_model.json").is_file());

    let predict = run(
        env!("CARGO_BIN_EXE_predict"),
        &dir,
        &["5000", "0.5", "50", "1.5"],
    );
    assert!(predict.status.success());
    let value: f64 = stdout(&predict).parse().expect("numeric output");
    assert!(value.is_finite());

    // Trailing arguments beyond the four features are ignored
    let with_extra = run(
        env!("CARGO_BIN_EXE_predict"),
        &dir,
        &["5000", "0.5", "50", "1.5", "extra"],
    );
    assert!(with_extra.status.success());
    assert_eq!(stdout(&with_extra), stdout(&predict));

    // Gate decision goes to the log, stdout keeps only the score
    let logged = command(
        env!("CARGO_BIN_EXE_predict"),
        &dir,
        &["5000", "0.5", "50", "1.5"],
    )
    .env("RUST_LOG", "info")
    .env("LOG_FORMAT", "json")
    .env("MIN_PROFIT_PERCENT", "1000000")
    .output()
    .expect("binary runs");
    assert!(logged.status.success());
    assert_eq!(stdout(&logged), stdout(&predict));
    let log = String::from_utf8_lossy(&logged.stderr);
    assert!(log.contains("Scored trade"));
    assert!(log.contains("\"execute\":false"));
    fs::remove_dir_all(dir).ok();
}

#[test]
fn test_train_failure_is_loud() {
    let dir = temp_dir("train_fail");
    // An existing file that is not a database is a hard failure, not a fallback
    fs::write(dir.join("broken.db"), b"definitely not sqlite").unwrap();

    let output = run(
        env!("CARGO_BIN_EXE_train"),
        &dir,
        &["--database", "broken.db"],
    );

    assert!(!output.status.success());
    assert!(stdout(&output).contains("Training failed"));
    assert!(!dir.join("models").exists());
    fs::remove_dir_all(dir).ok();
}
