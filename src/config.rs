//! Layered configuration.
//!
//! Settings are merged from lowest to highest precedence:
//!
//! 1. built-in defaults
//! 2. a TOML file (`--config`, else `config.toml` in the platform config dir)
//! 3. `DUPESCAN_*` environment variables
//! 4. command-line flags
//!
//! ```toml
//! workers = 8
//! chunk_size = 4096
//! bloom_capacity = 100000
//! bloom_fp_rate = 0.001
//! similarity_threshold = 8
//! skip_hidden = true
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::duplicates::exact::clamp_fp_rate;
use crate::duplicates::{BloomConfig, FinderConfig, DEFAULT_BLOOM_CAPACITY, DEFAULT_BLOOM_FP_RATE};
use crate::scanner::perceptual::{DEFAULT_SIMILARITY_THRESHOLD, PERCEPTUAL_HASH_BITS};
use crate::scanner::{FingerprintConfig, WalkerConfig, DEFAULT_CHUNK_SIZE, DEFAULT_WORKERS};

/// Prefix for environment overrides, e.g. `DUPESCAN_WORKERS=8`.
pub const ENV_PREFIX: &str = "DUPESCAN_";

/// Scan settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Threads walking directories concurrently.
    pub workers: usize,
    /// Bytes read per chunk while hashing.
    pub chunk_size: usize,
    /// Distinct hashes the Bloom pre-filter is sized for.
    pub bloom_capacity: usize,
    /// Bloom pre-filter false-positive rate.
    pub bloom_fp_rate: f64,
    /// Hamming distances strictly below this are similar.
    pub similarity_threshold: u32,
    /// Fingerprint symlinks that point at files.
    pub follow_symlinks: bool,
    /// Skip entries whose names start with `.`.
    pub skip_hidden: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            chunk_size: DEFAULT_CHUNK_SIZE,
            bloom_capacity: DEFAULT_BLOOM_CAPACITY,
            bloom_fp_rate: DEFAULT_BLOOM_FP_RATE,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            follow_symlinks: false,
            skip_hidden: false,
        }
    }
}

impl Config {
    /// Load defaults, the config file and the environment.
    ///
    /// An explicit `path` must exist; the platform default file is optional.
    ///
    /// # Errors
    ///
    /// Returns an error if the explicit file is missing or any layer fails
    /// to parse.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => {
                anyhow::ensure!(p.is_file(), "Config file not found: {}", p.display());
                Some(p.to_path_buf())
            }
            None => Self::default_path().filter(|p| p.is_file()),
        };

        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(ref file) = file {
            log::debug!("Loading config from {}", file.display());
            figment = figment.merge(Toml::file(file));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX));

        figment
            .extract()
            .with_context(|| match file {
                Some(f) => format!("Invalid configuration in {}", f.display()),
                None => "Invalid configuration".to_string(),
            })
    }

    /// Platform config file location, if a home directory is known.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dupescan").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Overlay flags given on the command line.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(workers) = cli.workers {
            self.workers = workers;
        }
        if let Some(chunk_size) = cli.chunk_size {
            self.chunk_size = usize::try_from(chunk_size).unwrap_or(usize::MAX);
        }
        if let Some(capacity) = cli.bloom_capacity {
            self.bloom_capacity = capacity;
        }
        if let Some(rate) = cli.bloom_fp_rate {
            self.bloom_fp_rate = rate;
        }
        if let Some(threshold) = cli.similarity_threshold {
            self.similarity_threshold = threshold;
        }
        self.follow_symlinks |= cli.follow_symlinks;
        self.skip_hidden |= cli.skip_hidden;
    }

    /// Reject unusable values and clamp the rest into range.
    ///
    /// # Errors
    ///
    /// Returns an error for zero workers, zero chunk size or zero capacity.
    pub fn validate(&mut self) -> Result<()> {
        anyhow::ensure!(self.workers > 0, "workers must be at least 1");
        anyhow::ensure!(self.chunk_size > 0, "chunk_size must be at least 1 byte");
        anyhow::ensure!(self.bloom_capacity > 0, "bloom_capacity must be at least 1");

        let rate = clamp_fp_rate(self.bloom_fp_rate);
        if rate != self.bloom_fp_rate {
            log::warn!(
                "bloom_fp_rate {} out of range, using {}",
                self.bloom_fp_rate,
                rate
            );
            self.bloom_fp_rate = rate;
        }
        if self.similarity_threshold > PERCEPTUAL_HASH_BITS {
            log::warn!(
                "similarity_threshold {} exceeds {} bits, using {}",
                self.similarity_threshold,
                PERCEPTUAL_HASH_BITS,
                PERCEPTUAL_HASH_BITS
            );
            self.similarity_threshold = PERCEPTUAL_HASH_BITS;
        }
        Ok(())
    }

    /// Build the finder configuration these settings describe.
    #[must_use]
    pub fn to_finder_config(&self) -> FinderConfig {
        FinderConfig::default()
            .with_walker_config(
                WalkerConfig::default()
                    .with_workers(self.workers)
                    .with_follow_symlinks(self.follow_symlinks)
                    .with_skip_hidden(self.skip_hidden),
            )
            .with_fingerprint_config(FingerprintConfig::default().with_chunk_size(self.chunk_size))
            .with_bloom(
                BloomConfig::default()
                    .with_capacity(self.bloom_capacity)
                    .with_fp_rate(self.bloom_fp_rate),
            )
            .with_similarity_threshold(self.similarity_threshold)
    }
}
