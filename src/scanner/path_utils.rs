//! Scan root resolution.
//!
//! The command line takes a single path. A directory is scanned as given;
//! a file stands for its containing directory, so `dupescan ~/photos/a.jpg`
//! scans `~/photos`. Anything else is rejected up front rather than
//! surfacing later as a listing error.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::path_utils::resolve_scan_root;
//! use std::path::Path;
//!
//! let root = resolve_scan_root(Path::new("/home/user/Pictures/IMG_0001.jpg")).unwrap();
//! assert_eq!(root, Path::new("/home/user/Pictures"));
//! ```

use std::path::{Path, PathBuf};

/// Errors resolving the scan root.
#[derive(thiserror::Error, Debug)]
pub enum RootError {
    /// The argument names nothing on disk.
    #[error("Path not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The argument exists but its metadata cannot be read.
    #[error("Cannot access {}: {source}", .path.display())]
    Inaccessible {
        /// Path given on the command line
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The argument is neither a directory nor a regular file.
    #[error("Not a directory or regular file: {}", .0.display())]
    Unsupported(PathBuf),
}

/// Derive the directory to scan from the command-line argument.
///
/// - a directory is returned unchanged
/// - a regular file resolves to its parent directory; a bare file name
///   resolves to `.`
///
/// # Errors
///
/// Returns [`RootError`] if the path does not exist, cannot be inspected,
/// or is some other kind of file system object.
pub fn resolve_scan_root(arg: &Path) -> Result<PathBuf, RootError> {
    let metadata = std::fs::metadata(arg).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            RootError::NotFound(arg.to_path_buf())
        } else {
            RootError::Inaccessible {
                path: arg.to_path_buf(),
                source,
            }
        }
    })?;

    if metadata.is_dir() {
        return Ok(arg.to_path_buf());
    }

    if metadata.is_file() {
        let parent = match arg.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        log::debug!(
            "{} is a file, scanning its directory {}",
            arg.display(),
            parent.display()
        );
        return Ok(parent);
    }

    Err(RootError::Unsupported(arg.to_path_buf()))
}
