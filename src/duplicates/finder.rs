//! Scan pipeline orchestration.
//!
//! # Overview
//!
//! [`DuplicateFinder::find_duplicates`] wires one scan together:
//!
//! 1. **Consumers** - two named threads, one owning the [`Aggregator`]
//!    and one owning the [`ErrorCollector`], each reading its own
//!    rendezvous channel
//! 2. **Walk** - the [`TreeWalker`] fans out one unit per directory on
//!    its worker pool and fingerprints files inline
//! 3. **Drain** - once the walk has joined, both senders are dropped; each
//!    consumer sees the disconnect, finishes and hands its state back
//!    through its `JoinHandle`
//! 4. **Report** - the aggregator is finished into a [`ScanReport`]
//!
//! The report is only built after both consumers have been joined, so
//! every message the walk produced is accounted for.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default());
//! let report = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! println!(
//!     "{} exact groups, {} image groups",
//!     report.summary.exact_groups, report.summary.similar_groups
//! );
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crossbeam_channel::bounded;

use super::aggregator::{Aggregator, ScanReport};
use super::errors::{DiagnosticSink, ErrorCollector};
use super::exact::BloomConfig;
use crate::progress::ProgressCallback;
use crate::scanner::perceptual::DEFAULT_SIMILARITY_THRESHOLD;
use crate::scanner::{
    FingerprintConfig, FingerprintResult, Fingerprinter, ScanError, TreeWalker, WalkError,
    WalkerConfig,
};

/// Configuration for one scan.
#[derive(Clone)]
pub struct FinderConfig {
    /// Directory traversal settings.
    pub walker_config: WalkerConfig,
    /// Per-file fingerprinting settings.
    pub fingerprint_config: FingerprintConfig,
    /// Bloom pre-filter sizing for the exact index.
    pub bloom: BloomConfig,
    /// Hamming distances strictly below this are similar.
    pub similarity_threshold: u32,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
    /// Where `<path>: <cause>` lines go; the `log` facade when unset.
    pub diagnostics: Option<Arc<dyn DiagnosticSink>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("walker_config", &self.walker_config)
            .field("fingerprint_config", &self.fingerprint_config)
            .field("bloom", &self.bloom)
            .field("similarity_threshold", &self.similarity_threshold)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .field(
                "diagnostics",
                &self.diagnostics.as_ref().map(|_| "<sink>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            walker_config: WalkerConfig::default(),
            fingerprint_config: FingerprintConfig::default(),
            bloom: BloomConfig::default(),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            shutdown_flag: None,
            progress_callback: None,
            diagnostics: None,
        }
    }
}

impl FinderConfig {
    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the fingerprint configuration.
    #[must_use]
    pub fn with_fingerprint_config(mut self, config: FingerprintConfig) -> Self {
        self.fingerprint_config = config;
        self
    }

    /// Set the Bloom filter sizing.
    #[must_use]
    pub fn with_bloom(mut self, bloom: BloomConfig) -> Self {
        self.bloom = bloom;
        self
    }

    /// Set the similarity threshold (clamped to 64).
    #[must_use]
    pub fn with_similarity_threshold(mut self, threshold: u32) -> Self {
        self.similarity_threshold = threshold.min(64);
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Set the diagnostic sink for scan errors.
    #[must_use]
    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = Some(sink);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Errors that stop a scan from producing a report.
///
/// Per-file and per-directory problems are never reported here; they are
/// [`ScanError`]s collected into the report.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The provided path does not exist.
    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// The walker could not start.
    #[error(transparent)]
    Walk(#[from] WalkError),

    /// A consumer thread could not be spawned.
    #[error("Failed to spawn {name} thread: {source}")]
    Spawn {
        /// Thread name
        name: &'static str,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A consumer thread panicked before returning its state.
    #[error("The {0} thread panicked")]
    ConsumerPanicked(&'static str),
}

const INDEX_THREAD: &str = "dupescan-index";
const ERROR_THREAD: &str = "dupescan-errors";

/// Runs the scan pipeline.
#[derive(Debug, Default)]
pub struct DuplicateFinder {
    config: FinderConfig,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Finder configuration.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Scan the directory tree under `root` and report duplicate groups.
    ///
    /// Always yields the report derivable from the files that could be
    /// read; unreadable directories and files end up in
    /// [`ScanReport::errors`]. A shutdown request stops the walk early and
    /// marks the summary as interrupted.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError`] if `root` is not an existing directory, a
    /// thread cannot be started, or a consumer thread panics.
    pub fn find_duplicates(&self, root: &Path) -> Result<ScanReport, FinderError> {
        let start_time = Instant::now();

        let metadata = std::fs::metadata(root)
            .map_err(|_| FinderError::PathNotFound(root.to_path_buf()))?;
        if !metadata.is_dir() {
            return Err(FinderError::NotADirectory(root.to_path_buf()));
        }

        log::info!("Scanning {}", root.display());

        let (results_tx, results_rx) = bounded::<FingerprintResult>(0);
        let (errors_tx, errors_rx) = bounded::<ScanError>(0);

        let index_handle = {
            let bloom = self.config.bloom;
            let threshold = self.config.similarity_threshold;
            let progress = self.config.progress_callback.clone();
            thread::Builder::new()
                .name(INDEX_THREAD.to_string())
                .spawn(move || {
                    let mut aggregator = Aggregator::new(bloom, threshold);
                    for result in results_rx {
                        if let Some(ref callback) = progress {
                            callback.on_fingerprint(&result.path);
                        }
                        aggregator.observe(&result);
                    }
                    aggregator
                })
                .map_err(|source| FinderError::Spawn {
                    name: INDEX_THREAD,
                    source,
                })?
        };

        let error_handle = {
            let sink = self.config.diagnostics.clone();
            let progress = self.config.progress_callback.clone();
            thread::Builder::new()
                .name(ERROR_THREAD.to_string())
                .spawn(move || {
                    let mut collector = ErrorCollector::new(sink);
                    for error in errors_rx {
                        if let Some(ref callback) = progress {
                            callback.on_error(&error);
                        }
                        collector.collect(error);
                    }
                    collector
                })
                .map_err(|source| FinderError::Spawn {
                    name: ERROR_THREAD,
                    source,
                })?
        };

        let mut walker = TreeWalker::new(
            Fingerprinter::new(self.config.fingerprint_config),
            self.config.walker_config.clone(),
        );
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(Arc::clone(flag));
        }

        let walk = walker.walk(root, &results_tx, &errors_tx);

        // Disconnect so both consumers finish draining and return
        drop(results_tx);
        drop(errors_tx);

        let aggregator = index_handle
            .join()
            .map_err(|_| FinderError::ConsumerPanicked(INDEX_THREAD))?;
        let collector = error_handle
            .join()
            .map_err(|_| FinderError::ConsumerPanicked(ERROR_THREAD))?;

        let stats = walk?;

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_finish();
        }

        let mut report = aggregator.finish();
        let summary = &mut report.summary;
        summary.root = root.to_path_buf();
        summary.error_count = collector.count();
        summary.file_errors = collector.file_errors();
        summary.total_files = summary.fingerprinted_files + summary.file_errors;
        summary.interrupted = stats.interrupted || self.config.is_shutdown_requested();
        summary.duration = start_time.elapsed();
        report.errors = collector.into_errors();

        log::info!(
            "Scanned {} files in {} directories: {} exact groups, {} image groups, {} errors",
            report.summary.total_files,
            stats.directories,
            report.summary.exact_groups,
            report.summary.similar_groups,
            report.summary.error_count
        );

        Ok(report)
    }
}
