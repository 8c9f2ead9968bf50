//! Drives the `searchcounter` binary against a temporary database

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

fn run_searchcounter(db: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_searchcounter"))
        .env_remove("SEARCHCOUNTER_CONFIG")
        .env_remove("SEARCHCOUNTER_LOG")
        .env_remove("RUST_LOG")
        .env("SEARCHCOUNTER_DATABASE", db)
        .args(args)
        .output()
        .expect("run searchcounter");

    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
    )
}

#[test]
fn test_increment_then_count() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("searches.redb");

    let (code, _, stderr) = run_searchcounter(&db, &["increment", "--term", "rust"]);
    assert_eq!(code, 0, "increment failed: {stderr}");
    let (code, _, stderr) = run_searchcounter(&db, &["increment", "--term", "rust"]);
    assert_eq!(code, 0, "increment failed: {stderr}");

    let (code, stdout, _) = run_searchcounter(&db, &["num-last-minute"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "2");

    let (code, stdout, _) = run_searchcounter(&db, &["num-arbitrary-lookback", "3600"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "2");

    let (code, stdout, _) = run_searchcounter(&db, &["most-common-term", "60"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "rust");
}

#[test]
fn test_queries_on_fresh_database() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("nested").join("fresh.redb");

    let (code, stdout, _) = run_searchcounter(&db, &["num-last-minute"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "0");

    let (code, stdout, _) = run_searchcounter(&db, &["most-common-term", "60"]);
    assert_eq!(code, 0);
    assert!(stdout.is_empty());
}

#[test]
fn test_negative_lookback_fails() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("searches.redb");

    let (code, stdout, _) = run_searchcounter(&db, &["num-arbitrary-lookback", "-1"]);
    assert_ne!(code, 0);
    assert!(stdout.is_empty());
}

#[test]
fn test_increment_without_terms_fails() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("searches.redb");

    let (code, _, _) = run_searchcounter(&db, &["increment"]);
    assert_ne!(code, 0);

    let (_, stdout, _) = run_searchcounter(&db, &["num-last-minute"]);
    assert_eq!(stdout.trim(), "0");
}

#[test]
fn test_config_file_supplies_terms() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("searches.redb");
    let config = temp.path().join("searchcounter.toml");
    std::fs::write(&config, "terms = [\"from-config\"]\n").unwrap();

    let config_arg = config.to_str().unwrap();
    let (code, _, stderr) = run_searchcounter(&db, &["--config", config_arg, "increment"]);
    assert_eq!(code, 0, "increment failed: {stderr}");

    let (_, stdout, _) = run_searchcounter(&db, &["most-common-term", "60"]);
    assert_eq!(stdout.trim(), "from-config");
}

#[test]
fn test_simulate_ignores_database() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("unused.redb");

    let (code, stdout, stderr) = run_searchcounter(
        &db,
        &["simulate", "--count", "5", "--spacing-ms", "100", "--term", "x", "--seed", "9"],
    );
    assert_eq!(code, 0, "simulate failed: {stderr}");
    assert!(stdout.contains("searches: 5"));
    assert!(stdout.contains("last_minute: 5"));
    assert!(!db.exists());
}

#[test]
fn test_partial_log_section_keeps_stdout_clean() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("searches.redb");
    let config = temp.path().join("searchcounter.toml");
    std::fs::write(&config, "[log]\ndefault_level = \"info\"\n").unwrap();

    let config_arg = config.to_str().unwrap();
    let (code, stdout, stderr) =
        run_searchcounter(&db, &["--config", config_arg, "num-last-minute"]);
    assert_eq!(code, 0, "num-last-minute failed: {stderr}");
    assert_eq!(stdout, "0\n");
    assert!(stderr.contains("Opened search history database"));
}
