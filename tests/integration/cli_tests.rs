use clap::Parser;
use dupescan::cli::{Cli, OutputFormat};
use dupescan::error::ExitCode;
use dupescan::run_app;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

use crate::{clear_env, ENV_MUTEX};

/// Parse a quiet invocation pinned to an empty config file.
fn quiet_cli(config: &Path, extra: &[&str], path: &Path) -> Cli {
    let mut args = vec![
        "dupescan".to_string(),
        "-q".to_string(),
        "--no-progress".to_string(),
        "--no-color".to_string(),
        "--config".to_string(),
        config.display().to_string(),
    ];
    args.extend(extra.iter().map(|s| (*s).to_string()));
    args.push(path.display().to_string());
    Cli::parse_from(args)
}

#[test]
fn test_run_app_clean_scan_exits_zero() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    let dir = tempdir().unwrap();
    let config = dir.path().join("dupescan.toml");
    fs::write(&config, "").unwrap();
    fs::write(dir.path().join("a.txt"), b"same").unwrap();
    fs::write(dir.path().join("b.txt"), b"same").unwrap();

    let code = run_app(quiet_cli(&config, &["--output", "json"], dir.path())).unwrap();

    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_run_app_missing_path_is_usage_error() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    let dir = tempdir().unwrap();
    let config = dir.path().join("dupescan.toml");
    fs::write(&config, "").unwrap();

    let err = run_app(quiet_cli(&config, &[], &dir.path().join("missing"))).unwrap_err();

    assert_eq!(ExitCode::for_error(&err), ExitCode::Usage);
    assert!(format!("{err:#}").contains("missing"));
}

#[test]
fn test_run_app_file_argument_scans_parent() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    let dir = tempdir().unwrap();
    let config = dir.path().join("dupescan.toml");
    fs::write(&config, "").unwrap();
    let photo = dir.path().join("photo.bin");
    fs::write(&photo, b"payload").unwrap();

    let code = run_app(quiet_cli(&config, &[], &photo)).unwrap();

    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_run_app_partial_success_on_unreadable_image() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    let dir = tempdir().unwrap();
    let config = dir.path().join("dupescan.toml");
    fs::write(&config, "").unwrap();
    fs::write(dir.path().join("broken.png"), b"\x89PNG\r\n\x1a\nnope").unwrap();

    let code = run_app(quiet_cli(&config, &[], dir.path())).unwrap();

    assert_eq!(code, ExitCode::PartialSuccess);
    assert_eq!(code.code_prefix(), "DS003");
}

#[test]
fn test_run_app_missing_config_file_is_error() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    let dir = tempdir().unwrap();

    let err = run_app(quiet_cli(&dir.path().join("nope.toml"), &[], dir.path())).unwrap_err();

    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
    assert!(err.to_string().contains("Config file not found"));
}

#[test]
fn test_run_app_rejects_zero_workers() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    let dir = tempdir().unwrap();
    let config = dir.path().join("dupescan.toml");
    fs::write(&config, "").unwrap();

    let err = run_app(quiet_cli(&config, &["-j", "0"], dir.path())).unwrap_err();

    assert!(format!("{err:#}").contains("workers"));
}

#[test]
fn test_cli_parse_output_and_tuning_flags() {
    let cli = Cli::try_parse_from([
        "dupescan",
        "--output",
        "json",
        "--chunk-size",
        "4KiB",
        "--similarity-threshold",
        "6",
        "--bloom-capacity",
        "500",
        "/photos",
    ])
    .unwrap();

    assert_eq!(cli.output, OutputFormat::Json);
    assert_eq!(cli.chunk_size, Some(4096));
    assert_eq!(cli.similarity_threshold, Some(6));
    assert_eq!(cli.bloom_capacity, Some(500));
}

#[test]
fn test_cli_rejects_unknown_output_format() {
    let err = Cli::try_parse_from(["dupescan", "--output", "xml", "/photos"]).unwrap_err();
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_cli_quiet_conflicts_with_verbose() {
    assert!(Cli::try_parse_from(["dupescan", "-q", "-v", "/photos"]).is_err());
}
