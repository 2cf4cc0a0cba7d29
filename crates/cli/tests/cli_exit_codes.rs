//! Exit-code behavior of the `vidnorm` binary.

use std::process::{Command, Output};
use tempfile::TempDir;

fn vidnorm(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_vidnorm"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run vidnorm")
}

#[test]
fn test_all_with_positional_is_usage_error() {
    let output = vidnorm(&["--all", "in.mp4"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--all"));
}

#[test]
fn test_missing_output_is_usage_error() {
    let output = vidnorm(&["in.mp4"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_zero_jobs_is_usage_error() {
    let output = vidnorm(&["--all", "--jobs", "0"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_empty_directory_succeeds() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"not a video").unwrap();

    let output = vidnorm(&["--all", "--dir", dir.path().to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stderr).contains("No matching files found"));
}

#[test]
fn test_missing_root_is_fatal() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing");

    let output = vidnorm(&["--all", "--dir", missing.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_missing_config_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("vidnorm.toml");

    let output = vidnorm(&[
        "--all",
        "--dir",
        dir.path().to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_invalid_config_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("vidnorm.toml");
    std::fs::write(&config, "[targets]\nmax_height = 0\n").unwrap();

    let output = vidnorm(&[
        "--all",
        "--dir",
        dir.path().to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("targets.max_height"));
}
