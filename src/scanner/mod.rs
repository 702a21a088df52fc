//! Scanner module for directory traversal and file fingerprinting.
//!
//! This module provides functionality for:
//! - Concurrent directory walking on a bounded worker pool
//! - Streaming content hashing with XXH64
//! - Magic-byte image classification and difference hashing
//! - Scan root resolution
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal, one unit of work per directory
//! - [`fingerprint`]: Per-file content and perceptual fingerprints
//! - [`hasher`]: XXH64 streaming hasher
//! - [`perceptual`]: Image classification, decoding and dHash
//! - [`path_utils`]: Scan root derivation from the command-line argument
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::{Fingerprinter, FingerprintConfig, TreeWalker, WalkerConfig};
//! use std::path::Path;
//!
//! let (results_tx, results_rx) = crossbeam_channel::unbounded();
//! let (errors_tx, errors_rx) = crossbeam_channel::unbounded();
//!
//! let walker = TreeWalker::new(
//!     Fingerprinter::new(FingerprintConfig::default()),
//!     WalkerConfig::default(),
//! );
//! walker.walk(Path::new("."), &results_tx, &errors_tx).unwrap();
//! drop((results_tx, errors_tx));
//!
//! for result in results_rx {
//!     println!("{}: {:016x}", result.path.display(), result.content_hash);
//! }
//! for error in errors_rx {
//!     eprintln!("{error}");
//! }
//! ```

pub mod fingerprint;
pub mod hasher;
pub mod path_utils;
pub mod perceptual;
pub mod walker;

use std::path::{Path, PathBuf};

// Re-export main types
pub use fingerprint::{FingerprintConfig, FingerprintResult, Fingerprinter};
pub use hasher::{hash_to_hex, ContentHash, ContentHasher, DEFAULT_CHUNK_SIZE};
pub use path_utils::{resolve_scan_root, RootError};
pub use perceptual::{ImageKind, PerceptualHash, PerceptualHasher};
pub use walker::{TreeWalker, WalkError, WalkStats};

/// Default number of worker threads for the directory walk.
pub const DEFAULT_WORKERS: usize = 4;

/// Configuration for directory walking.
///
/// Controls concurrency, symlink handling and hidden-entry filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkerConfig {
    /// Upper bound on threads walking directories concurrently.
    pub workers: usize,

    /// Fingerprint symbolic links that resolve to regular files.
    /// Symlinked directories are never descended.
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            follow_symlinks: false,
            skip_hidden: false,
        }
    }
}

impl WalkerConfig {
    /// Set the worker count (at least one).
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set whether symlinks to files are fingerprinted.
    #[must_use]
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Set whether hidden entries are skipped.
    #[must_use]
    pub fn with_skip_hidden(mut self, skip: bool) -> Self {
        self.skip_hidden = skip;
        self
    }
}

/// A non-fatal failure scanning a single directory or file.
///
/// Displays as `<path>: <cause>`.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// A directory could not be listed; its subtree is skipped.
    #[error("{}: failed to list directory: {source}", .path.display())]
    DirectoryList {
        /// Directory being listed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// File type or metadata could not be read.
    #[error("{}: failed to read metadata: {source}", .path.display())]
    Metadata {
        /// Entry being inspected
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A file could not be opened.
    #[error("{}: failed to open file: {source}", .path.display())]
    FileOpen {
        /// File being opened
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Reading a file failed part way through.
    #[error("{}: failed to read file: {source}", .path.display())]
    FileRead {
        /// File being read
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A file with an image signature failed to decode.
    #[error("{}: failed to decode image: {source}", .path.display())]
    ImageDecode {
        /// File being decoded
        path: PathBuf,
        /// The decoder error
        #[source]
        source: image::ImageError,
    },
}

impl ScanError {
    /// Path the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::DirectoryList { path, .. }
            | Self::Metadata { path, .. }
            | Self::FileOpen { path, .. }
            | Self::FileRead { path, .. }
            | Self::ImageDecode { path, .. } => path,
        }
    }

    /// Whether the error refers to a directory rather than a single file.
    #[must_use]
    pub fn is_directory_error(&self) -> bool {
        matches!(self, Self::DirectoryList { .. })
    }
}
