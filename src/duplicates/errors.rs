//! Non-fatal scan error collection.
//!
//! The [`ErrorCollector`] sits at the end of the error channel. Each
//! [`ScanError`] becomes one `<path>: <cause>` diagnostic line and is kept
//! for the final report; nothing it receives can stop the scan.

use std::sync::Arc;

use crate::scanner::ScanError;

/// Destination for diagnostic lines.
///
/// The binary routes lines through the progress display so they do not
/// tear the spinner; tests capture them in memory.
pub trait DiagnosticSink: Send + Sync {
    /// Write one complete diagnostic line (no trailing newline).
    fn report(&self, line: &str);
}

/// Sink that writes straight to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn report(&self, line: &str) {
        eprintln!("{line}");
    }
}

/// Drains scan errors into diagnostics and a count.
#[derive(Default)]
pub struct ErrorCollector {
    sink: Option<Arc<dyn DiagnosticSink>>,
    errors: Vec<ScanError>,
    directory_errors: usize,
}

impl ErrorCollector {
    /// Create a collector writing to `sink`, or to the `log` facade at warn
    /// level when `None`.
    #[must_use]
    pub fn new(sink: Option<Arc<dyn DiagnosticSink>>) -> Self {
        Self {
            sink,
            errors: Vec::new(),
            directory_errors: 0,
        }
    }

    /// Record one error.
    pub fn collect(&mut self, error: ScanError) {
        let line = error.to_string();
        match &self.sink {
            Some(sink) => sink.report(&line),
            None => log::warn!("{line}"),
        }
        if error.is_directory_error() {
            self.directory_errors += 1;
        }
        self.errors.push(error);
    }

    /// Errors recorded so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.errors.len()
    }

    /// Errors that cost a whole directory listing or one of its entries.
    #[must_use]
    pub fn directory_errors(&self) -> usize {
        self.directory_errors
    }

    /// Errors tied to a single file.
    #[must_use]
    pub fn file_errors(&self) -> usize {
        self.errors.len() - self.directory_errors
    }

    /// Consume the collector, returning the errors in arrival order.
    #[must_use]
    pub fn into_errors(self) -> Vec<ScanError> {
        self.errors
    }
}

impl std::fmt::Debug for ErrorCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorCollector")
            .field("sink", &self.sink.as_ref().map(|_| "<sink>"))
            .field("errors", &self.errors.len())
            .finish()
    }
}
