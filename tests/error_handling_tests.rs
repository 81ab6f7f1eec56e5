use clap::Parser;
use dupehound::cli::Cli;
use dupehound::duplicates::FinderError;
use dupehound::error::{ExitCode, StructuredError};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_run_app_success_text() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a"), "dup").unwrap();
    fs::write(dir.path().join("b"), "dup").unwrap();

    let cli = Cli::try_parse_from([
        "dupehound",
        "-q",
        dir.path().to_str().unwrap(),
        "--workers",
        "2",
        "--no-progress",
    ])
    .unwrap();

    let result = dupehound::run_app(cli).unwrap();
    assert_eq!(result, ExitCode::Success);
}

#[test]
fn test_run_app_success_json_without_duplicates() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("only"), "unique").unwrap();

    let cli = Cli::try_parse_from([
        "dupehound",
        "-q",
        dir.path().to_str().unwrap(),
        "--output",
        "json",
    ])
    .unwrap();

    assert_eq!(dupehound::run_app(cli).unwrap(), ExitCode::Success);
}

#[test]
fn test_run_app_missing_root_is_general_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope");

    let cli = Cli::try_parse_from(["dupehound", "-q", missing.to_str().unwrap()]).unwrap();
    let err = dupehound::run_app(cli).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<FinderError>(),
        Some(FinderError::PathNotFound(_))
    ));

    let structured = StructuredError::new(&err, ExitCode::GeneralError);
    assert_eq!(structured.code, "DH001");
    assert_eq!(structured.exit_code, 1);
    assert!(structured.message.contains("Path not found"));
}

#[test]
fn test_run_app_rejects_zero_workers() {
    let dir = TempDir::new().unwrap();

    let cli = Cli::try_parse_from(["dupehound", "-q", dir.path().to_str().unwrap(), "-w", "0"])
        .unwrap();
    let err = dupehound::run_app(cli).unwrap_err();

    assert!(format!("{err:#}").contains("workers"));
}

#[test]
fn test_run_app_missing_config_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("missing.toml");

    let cli = Cli::try_parse_from([
        "dupehound",
        "-q",
        dir.path().to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ])
    .unwrap();

    let err = dupehound::run_app(cli).unwrap_err();
    assert!(format!("{err:#}").contains("Configuration file not found"));
}

#[test]
fn test_missing_path_argument_is_usage_error() {
    let err = Cli::try_parse_from(["dupehound"]).unwrap_err();
    assert_eq!(
        err.kind(),
        clap::error::ErrorKind::MissingRequiredArgument
    );
}
