//! Command-line interface definitions.
//!
//! # Example
//!
//! ```bash
//! # Scan a directory and print both sections as text
//! dupescan ~/Pictures
//!
//! # JSON for scripting, with a stricter image threshold
//! dupescan ~/Pictures --output json --similarity-threshold 6
//!
//! # Passing a file scans the directory that contains it
//! dupescan ~/Pictures/IMG_0001.jpg
//!
//! # Verbose mode for debugging
//! dupescan -vv ~/Pictures
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Find byte-identical files and visually similar images.
///
/// Every regular file under PATH is hashed with XXH64; PNG and JPEG files
/// are also given a 64-bit difference hash and clustered by Hamming
/// distance. Nothing is modified.
#[derive(Debug, Parser)]
#[command(name = "dupescan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan (a file means its containing directory)
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors and the report
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,

    /// Configuration file (TOML); defaults to the platform config dir
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Threads walking directories concurrently (default: 4)
    #[arg(short = 'j', long, value_name = "N")]
    pub workers: Option<usize>,

    /// Read size per chunk while hashing (e.g. 1024, 4KiB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub chunk_size: Option<u64>,

    /// Distinct hashes the Bloom pre-filter is sized for (default: 20000)
    #[arg(long, value_name = "N")]
    pub bloom_capacity: Option<usize>,

    /// Bloom pre-filter false-positive rate, clamped to [0.0001, 0.1]
    #[arg(long, value_name = "RATE")]
    pub bloom_fp_rate: Option<f64>,

    /// Images whose hashes differ in fewer bits than this are similar (0-64, default: 10)
    #[arg(long, value_name = "BITS")]
    pub similarity_threshold: Option<u32>,

    /// Fingerprint symbolic links that point at files
    ///
    /// Symlinked directories are never descended.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Do not draw the progress spinner
    #[arg(long)]
    pub no_progress: bool,
}

/// Output format for scan reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Labeled sections for reading
    #[default]
    Text,
    /// JSON document for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
/// Case-insensitive. Numbers without suffix are treated as bytes.
///
/// # Examples
///
/// ```
/// use dupescan::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("4KiB").unwrap(), 4096);
/// assert_eq!(parse_size("1MB").unwrap(), 1_000_000);
/// ```
///
/// # Errors
///
/// Returns a message if the number or suffix cannot be parsed.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}
