//! Exit codes and structured errors for the binary.

use serde::Serialize;

use crate::duplicates::{FinderError, ScanReport};
use crate::scanner::RootError;

/// Process exit codes.
///
/// - 0: scan completed without errors
/// - 1: general error
/// - 2: usage error (bad arguments, missing path)
/// - 3: scan completed but some files or directories could not be read
/// - 130: interrupted by Ctrl+C
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// The scan completed and every file was read.
    Success = 0,
    /// An unexpected error occurred.
    GeneralError = 1,
    /// The command line or its path argument was unusable.
    Usage = 2,
    /// The scan completed with non-fatal scan errors.
    PartialSuccess = 3,
    /// The scan was interrupted by Ctrl+C.
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DS000",
            Self::GeneralError => "DS001",
            Self::Usage => "DS002",
            Self::PartialSuccess => "DS003",
            Self::Interrupted => "DS130",
        }
    }

    /// Exit code for a finished scan.
    #[must_use]
    pub fn for_report(report: &ScanReport) -> Self {
        if report.summary.interrupted {
            Self::Interrupted
        } else if report.summary.error_count > 0 {
            Self::PartialSuccess
        } else {
            Self::Success
        }
    }

    /// Exit code for an error that stopped the run.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        if err.downcast_ref::<RootError>().is_some() {
            return Self::Usage;
        }
        match err.downcast_ref::<FinderError>() {
            Some(FinderError::PathNotFound(_) | FinderError::NotADirectory(_)) => Self::Usage,
            _ => Self::GeneralError,
        }
    }
}

/// Structured error information for `--json-errors`.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DS001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message, including its causes
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
