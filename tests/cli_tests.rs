use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn salon_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("salon-invoice"))
}

const BATCH_HEADER: &str = "Stylist,Invoice,Date,From,To,Weeks,Services,Products,Tips,Extra\n";

fn init_config(config_path: &std::path::Path) {
    salon_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();
}

#[test]
fn test_help() {
    salon_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Batch salon invoice generator"));
}

#[test]
fn test_version() {
    salon_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("salon-invoice"));
}

#[test]
fn test_init_creates_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("salon-config");

    salon_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized salon-invoice config"));

    // Check files were created
    assert!(config_path.join("config.toml").exists());
    assert!(config_path.join("stylists.toml").exists());
    assert!(config_path.join("layout.toml").exists());
    assert!(config_path.join("output").is_dir());
    assert!(config_path.join("templates").is_dir());
}

#[test]
fn test_init_fails_if_exists() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("salon-config");

    // First init should succeed
    init_config(&config_path);

    // Second init should fail
    salon_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_run_without_init() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("nonexistent");

    salon_cmd()
        .args(["-C", config_path.to_str().unwrap(), "run", "batch.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_stylists_list() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("salon-config");

    init_config(&config_path);

    salon_cmd()
        .args(["-C", config_path.to_str().unwrap(), "stylists"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Alex Example"))
        .stdout(predicate::str::contains("alex@example.com"));
}

#[test]
fn test_check_computes_figures() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("salon-config");
    init_config(&config_path);

    let batch_path = temp_dir.path().join("figures.csv");
    fs::write(
        &batch_path,
        format!(
            "{BATCH_HEADER}Alex Example,1041,21/05/2022,09/05/2022,20/05/2022,4,1000.00,200.00,50.00,0.00\n"
        ),
    )
    .unwrap();

    salon_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "check",
            batch_path.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("1041"))
        .stdout(predicate::str::contains("£1000.00"))
        .stdout(predicate::str::contains("£565.00"))
        .stdout(predicate::str::contains("1 record(s) checked"));
}

#[test]
fn test_check_missing_batch_is_empty() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("salon-config");
    init_config(&config_path);

    salon_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "check",
            temp_dir.path().join("missing.csv").to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("No invoice records"));
}

#[test]
fn test_run_header_only_batch() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("salon-config");
    init_config(&config_path);

    let batch_path = temp_dir.path().join("figures.csv");
    fs::write(&batch_path, BATCH_HEADER).unwrap();

    salon_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "run",
            batch_path.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Processed 0 invoice(s): 0 succeeded, 0 failed",
        ));

    // Nothing was produced
    assert!(fs::read_dir(config_path.join("output")).unwrap().next().is_none());
}

#[test]
fn test_run_unknown_stylist_aborts_batch() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("salon-config");
    init_config(&config_path);

    let batch_path = temp_dir.path().join("figures.csv");
    fs::write(
        &batch_path,
        format!(
            "{BATCH_HEADER}Nobody,1041,21/05/2022,09/05/2022,20/05/2022,4,1000.00,200.00,50.00,0.00\n"
        ),
    )
    .unwrap();

    salon_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "run",
            batch_path.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nobody"));
}

#[test]
fn test_run_malformed_row_aborts_batch() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("salon-config");
    init_config(&config_path);

    let batch_path = temp_dir.path().join("figures.csv");
    fs::write(&batch_path, format!("{BATCH_HEADER}Alex Example,1041\n")).unwrap();

    salon_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "run",
            batch_path.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected 10"));
}
