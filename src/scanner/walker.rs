//! Concurrent directory walker.
//!
//! # Overview
//!
//! This module provides the [`TreeWalker`] which visits a directory tree
//! and fingerprints every regular file it finds. Each directory is one unit
//! of work spawned into a `rayon` scope; files are fingerprinted inline in
//! their directory's unit. The scope bounds concurrency to the configured
//! worker count and joins every spawned unit before [`TreeWalker::walk`]
//! returns.
//!
//! # Features
//!
//! - Bounded worker pool (see [`WalkerConfig::workers`])
//! - Listing failures are isolated to the failing subtree
//! - Deterministic name order within each directory
//! - Optional hidden-entry skipping and symlink following
//! - Graceful shutdown via atomic flag
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::{Fingerprinter, FingerprintConfig, TreeWalker, WalkerConfig};
//! use std::path::Path;
//!
//! let (results_tx, results_rx) = crossbeam_channel::unbounded();
//! let (errors_tx, _errors_rx) = crossbeam_channel::unbounded();
//!
//! let walker = TreeWalker::new(
//!     Fingerprinter::new(FingerprintConfig::default()),
//!     WalkerConfig::default().with_workers(8),
//! );
//! let stats = walker.walk(Path::new("/home/user/Downloads"), &results_tx, &errors_tx).unwrap();
//! drop(results_tx);
//!
//! println!("{} of {} files fingerprinted", results_rx.iter().count(), stats.files);
//! ```

use std::ffi::OsStr;
use std::fs::{self, DirEntry};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;

use super::{FingerprintResult, Fingerprinter, ScanError, WalkerConfig};

/// Errors that prevent a walk from starting.
#[derive(thiserror::Error, Debug)]
pub enum WalkError {
    /// The worker pool could not be created.
    #[error("Failed to build walker thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Counters reported once a walk has joined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Directories whose listing was attempted
    pub directories: usize,
    /// Regular files handed to the fingerprinter
    pub files: usize,
    /// Whether the walk stopped early on a shutdown request
    pub interrupted: bool,
}

/// Directory walker that fingerprints files as it goes.
#[derive(Debug)]
pub struct TreeWalker {
    fingerprinter: Fingerprinter,
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl TreeWalker {
    /// Create a walker using the given fingerprinter and configuration.
    #[must_use]
    pub fn new(fingerprinter: Fingerprinter, config: WalkerConfig) -> Self {
        Self {
            fingerprinter,
            config,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// Once the flag is `true` no new directory or file is started; units
    /// already running finish their current file and return.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Walker configuration.
    #[must_use]
    pub fn config(&self) -> &WalkerConfig {
        &self.config
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Walk the tree under `root`, blocking until every unit has finished.
    ///
    /// Each regular file yields exactly one message: a [`FingerprintResult`]
    /// on `results` or a [`ScanError`] on `errors`. Sends block until the
    /// receiving side accepts them, so rendezvous channels throttle the walk
    /// to the consumers' pace.
    ///
    /// # Errors
    ///
    /// Returns [`WalkError`] only if the worker pool cannot be built.
    /// Per-directory and per-file failures are sent on `errors` instead.
    pub fn walk(
        &self,
        root: &Path,
        results: &Sender<FingerprintResult>,
        errors: &Sender<ScanError>,
    ) -> Result<WalkStats, WalkError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers.max(1))
            .thread_name(|i| format!("dupescan-walk-{i}"))
            .build()?;

        log::debug!(
            "Walking {} with {} worker(s)",
            root.display(),
            pool.current_num_threads()
        );

        let unit = WalkUnit {
            walker: self,
            results,
            errors,
            directories: AtomicUsize::new(0),
            files: AtomicUsize::new(0),
        };

        pool.scope(|scope| unit.visit_dir(scope, root.to_path_buf()));

        let stats = WalkStats {
            directories: unit.directories.load(Ordering::SeqCst),
            files: unit.files.load(Ordering::SeqCst),
            interrupted: self.is_shutdown_requested(),
        };

        if stats.interrupted {
            log::info!("Walk interrupted after {} files", stats.files);
        }

        Ok(stats)
    }
}

/// State shared by every unit of one walk.
struct WalkUnit<'a> {
    walker: &'a TreeWalker,
    results: &'a Sender<FingerprintResult>,
    errors: &'a Sender<ScanError>,
    directories: AtomicUsize,
    files: AtomicUsize,
}

impl WalkUnit<'_> {
    fn visit_dir<'s>(&'s self, scope: &rayon::Scope<'s>, dir: PathBuf) {
        if self.walker.is_shutdown_requested() {
            log::debug!("Walker: Shutdown requested, not entering {}", dir.display());
            return;
        }
        self.directories.fetch_add(1, Ordering::Relaxed);

        let read_dir = match fs::read_dir(&dir) {
            Ok(rd) => rd,
            Err(source) => {
                self.emit_error(ScanError::DirectoryList { path: dir, source });
                return;
            }
        };

        let mut entries: Vec<DirEntry> = Vec::new();
        for entry in read_dir {
            match entry {
                Ok(entry) => entries.push(entry),
                Err(source) => self.emit_error(ScanError::DirectoryList {
                    path: dir.clone(),
                    source,
                }),
            }
        }
        entries.sort_by_key(DirEntry::file_name);

        for entry in entries {
            if self.walker.is_shutdown_requested() {
                log::debug!("Walker: Shutdown requested, leaving {}", dir.display());
                return;
            }

            let path = entry.path();
            if self.walker.config.skip_hidden && is_hidden(&entry.file_name()) {
                log::trace!("Skipping hidden entry: {}", path.display());
                continue;
            }

            let file_type = match entry.file_type() {
                Ok(t) => t,
                Err(source) => {
                    self.emit_error(ScanError::Metadata { path, source });
                    continue;
                }
            };

            if file_type.is_dir() {
                log::trace!("Spawning walk of {}", path.display());
                scope.spawn(move |s| self.visit_dir(s, path));
            } else if file_type.is_file() {
                self.visit_file(&path);
            } else if file_type.is_symlink() {
                self.visit_symlink(&path);
            } else {
                log::trace!("Skipping special file: {}", path.display());
            }
        }
    }

    fn visit_symlink(&self, path: &Path) {
        if !self.walker.config.follow_symlinks {
            log::trace!("Skipping symlink: {}", path.display());
            return;
        }

        match fs::metadata(path) {
            Ok(m) if m.is_file() => self.visit_file(path),
            Ok(m) if m.is_dir() => {
                log::debug!("Not descending symlinked directory: {}", path.display());
            }
            Ok(_) => log::trace!("Skipping symlink to special file: {}", path.display()),
            Err(source) => self.emit_error(ScanError::Metadata {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn visit_file(&self, path: &Path) {
        self.files.fetch_add(1, Ordering::Relaxed);

        match self.walker.fingerprinter.fingerprint(path) {
            Ok(result) => {
                if self.results.send(result).is_err() {
                    log::error!(
                        "Result consumer disconnected, dropping {}",
                        path.display()
                    );
                }
            }
            Err(e) => self.emit_error(e),
        }
    }

    fn emit_error(&self, error: ScanError) {
        if let Err(e) = self.errors.send(error) {
            log::error!("Error consumer disconnected, dropping: {}", e.into_inner());
        }
    }
}

fn is_hidden(name: &OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}
