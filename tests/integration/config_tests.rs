use clap::Parser;
use dupescan::cli::Cli;
use dupescan::config::Config;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use tempfile::tempdir;

use crate::{clear_env, ENV_MUTEX};

#[test]
fn test_config_defaults_extract() {
    let figment = Figment::from(Serialized::defaults(Config::default()));
    let config: Config = figment.extract().unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_config_load_from_toml() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
workers = 8
chunk_size = 4096
similarity_threshold = 6
skip_hidden = true
"#,
    )
    .unwrap();

    let config = Config::load(Some(&path)).unwrap();

    assert_eq!(config.workers, 8);
    assert_eq!(config.chunk_size, 4096);
    assert_eq!(config.similarity_threshold, 6);
    assert!(config.skip_hidden);
    // Untouched keys keep their defaults
    assert_eq!(config.bloom_capacity, Config::default().bloom_capacity);
}

#[test]
fn test_env_overrides_toml() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "workers = 8\nbloom_capacity = 100\n").unwrap();

    std::env::set_var("DUPESCAN_WORKERS", "2");
    let config = Config::load(Some(&path));
    std::env::remove_var("DUPESCAN_WORKERS");

    let config = config.unwrap();
    assert_eq!(config.workers, 2);
    assert_eq!(config.bloom_capacity, 100);
}

#[test]
fn test_cli_overrides_env_and_toml() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "similarity_threshold = 4\nworkers = 8\n").unwrap();

    std::env::set_var("DUPESCAN_SIMILARITY_THRESHOLD", "5");
    let loaded = Config::load(Some(&path));
    std::env::remove_var("DUPESCAN_SIMILARITY_THRESHOLD");

    let mut config = loaded.unwrap();
    assert_eq!(config.similarity_threshold, 5);

    let cli = Cli::parse_from(["dupescan", "--similarity-threshold", "12", "/photos"]);
    config.apply_cli(&cli);

    assert_eq!(config.similarity_threshold, 12);
    assert_eq!(config.workers, 8);
}

#[test]
fn test_env_layer_through_figment() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    std::env::set_var("DUPESCAN_BLOOM_FP_RATE", "0.02");
    std::env::set_var("DUPESCAN_FOLLOW_SYMLINKS", "true");

    let figment =
        Figment::from(Serialized::defaults(Config::default())).merge(Env::prefixed("DUPESCAN_"));
    let config: Result<Config, _> = figment.extract();

    std::env::remove_var("DUPESCAN_BLOOM_FP_RATE");
    std::env::remove_var("DUPESCAN_FOLLOW_SYMLINKS");

    let config = config.unwrap();
    assert_eq!(config.bloom_fp_rate, 0.02);
    assert!(config.follow_symlinks);
}

#[test]
fn test_invalid_toml_is_rejected() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "workers = \"many\"\n").unwrap();

    let err = Config::load(Some(&path)).unwrap_err();

    assert!(err.to_string().contains(&path.display().to_string()));
}

#[test]
fn test_malformed_toml_syntax_is_rejected() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "workers = [").unwrap();

    assert!(Config::load(Some(&path)).is_err());
}

#[test]
fn test_missing_explicit_config_is_rejected() {
    let dir = tempdir().unwrap();
    let err = Config::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
}

#[test]
fn test_serialized_config_round_trips_through_toml_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let config = Config {
        workers: 6,
        chunk_size: 2048,
        similarity_threshold: 3,
        ..Config::default()
    };
    fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

    let figment = Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(&path));
    let loaded: Config = figment.extract().unwrap();

    assert_eq!(loaded, config);
}

#[test]
fn test_validated_config_feeds_finder() {
    let mut config = Config {
        bloom_fp_rate: 0.5,
        ..Config::default()
    };
    config.validate().unwrap();

    let finder = config.to_finder_config();
    assert_eq!(finder.bloom.fp_rate, 0.1);
}
