//! Progress reporting utilities using indicatif.
//!
//! The scan has no known total up front, so [`Progress`] is a single
//! spinner counting fingerprinted files. It also serves as the
//! [`DiagnosticSink`] for scan errors: lines are printed with the spinner
//! suspended so the two never interleave on stderr.

use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::duplicates::DiagnosticSink;
use crate::scanner::ScanError;

/// Progress callback for a running scan.
///
/// Callbacks are invoked from the consumer threads, one call per message.
pub trait ProgressCallback: Send + Sync {
    /// Called after a file has been fingerprinted.
    fn on_fingerprint(&self, path: &Path);

    /// Called for each non-fatal scan error.
    fn on_error(&self, _error: &ScanError) {}

    /// Called once both consumers have drained.
    fn on_finish(&self);
}

/// Spinner on stderr.
pub struct Progress {
    bar: ProgressBar,
}

impl Progress {
    /// Create a progress reporter.
    ///
    /// When `hidden` is true nothing is drawn, but diagnostic lines are
    /// still written to stderr.
    ///
    /// ```
    /// use dupescan::progress::Progress;
    ///
    /// let progress = Progress::new(true);
    /// ```
    #[must_use]
    pub fn new(hidden: bool) -> Self {
        let bar = if hidden {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new_spinner();
            bar.set_style(spinner_style());
            bar.set_message("Scanning");
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        };
        Self { bar }
    }

    /// Whether the spinner is drawn.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }

    /// Files counted so far.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
}

impl ProgressCallback for Progress {
    fn on_fingerprint(&self, path: &Path) {
        self.bar.inc(1);
        if !self.bar.is_hidden() {
            self.bar.set_message(truncate_path(path, 30));
        }
    }

    fn on_finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl DiagnosticSink for Progress {
    fn report(&self, line: &str) {
        self.bar.suspend(|| eprintln!("{line}"));
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress")
            .field("hidden", &self.bar.is_hidden())
            .field("position", &self.bar.position())
            .finish()
    }
}

/// Truncate a path for display next to the spinner.
fn truncate_path(path: &Path, max_len: usize) -> String {
    let full = path.to_string_lossy();
    if full.chars().count() <= max_len {
        return full.into_owned();
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let name_len = file_name.chars().count();
    if name_len + 4 > max_len {
        let tail: String = file_name.chars().skip(name_len + 3 - max_len).collect();
        return format!("...{tail}");
    }

    format!(".../{file_name}")
}
