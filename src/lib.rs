//! dupescan - duplicate file and similar image finder
//!
//! Walks a directory tree on a bounded worker pool, hashes every regular
//! file with XXH64 and gives PNG and JPEG files a 64-bit difference hash.
//! Byte-identical files are grouped through a Bloom-filtered index; images
//! are clustered by Hamming distance through a BK-tree. Nothing on disk is
//! modified.

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{IsTerminal, Write};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::duplicates::DuplicateFinder;
use crate::error::ExitCode;
use crate::logging::LogOptions;
use crate::output::{format_summary, JsonOutput, TextOutput};
use crate::progress::Progress;
use crate::scanner::resolve_scan_root;

/// Run one scan as described by the command line.
///
/// Returns the exit code the process should use once the report has been
/// written to stdout.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the path cannot be
/// scanned, or writing the report fails.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(LogOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
        no_color: cli.no_color,
    });
    if cli.no_color {
        yansi::disable();
    }

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_cli(&cli);
    config.validate().context("Invalid configuration")?;
    log::debug!("Effective configuration: {config:?}");

    let root = resolve_scan_root(&cli.path)?;
    log::info!("Scan root: {}", root.display());

    let handler = signal::install_handler()?;

    let hide_progress = cli.quiet || cli.no_progress || !std::io::stderr().is_terminal();
    let progress = Arc::new(Progress::new(hide_progress));

    let finder_config = config
        .to_finder_config()
        .with_shutdown_flag(handler.get_flag())
        .with_progress_callback(progress.clone())
        .with_diagnostics(progress);

    let report = DuplicateFinder::new(finder_config).find_duplicates(&root)?;
    let exit_code = ExitCode::for_report(&report);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match cli.output {
        OutputFormat::Text => {
            let color = !cli.no_color && std::io::stdout().is_terminal();
            TextOutput::new(&report, color)
                .write_to(&mut out)
                .context("Failed to write report")?;
        }
        OutputFormat::Json => {
            JsonOutput::new(&report, exit_code)
                .write_to(&mut out, true)
                .context("Failed to write report")?;
        }
    }
    out.flush().context("Failed to write report")?;

    if !cli.quiet {
        eprintln!("{}", format_summary(&report.summary));
    }

    Ok(exit_code)
}
