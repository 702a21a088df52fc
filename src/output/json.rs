//! JSON output formatter for scan reports.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "exact_groups": [
//!     {
//!       "hash": "9c0f3a1b2d4e5f60",
//!       "canonical": "/photos/a.txt",
//!       "duplicates": ["/photos/b.txt"],
//!       "size": 1024
//!     }
//!   ],
//!   "similar_groups": [
//!     {
//!       "hash": "f0e1d2c3b4a59687",
//!       "canonical": "/photos/img1.png",
//!       "members": [{ "path": "/photos/img2.png", "distance": 2 }]
//!     }
//!   ],
//!   "errors": [{ "path": "/photos/locked", "message": "..." }],
//!   "summary": { "total_files": 4, "exact_groups": 1, "...": "..." },
//!   "exit_code": 0,
//!   "exit_code_name": "DS000"
//! }
//! ```

use std::io::Write;

use serde::Serialize;

use crate::duplicates::{DuplicateGroup, ScanReport, ScanSummary, SimilarGroup};
use crate::error::ExitCode;
use crate::scanner::ScanError;

/// A scan error in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonScanError {
    /// Path the error refers to
    pub path: String,
    /// Full `<path>: <cause>` message
    pub message: String,
}

impl From<&ScanError> for JsonScanError {
    fn from(error: &ScanError) -> Self {
        Self {
            path: error.path().to_string_lossy().into_owned(),
            message: error.to_string(),
        }
    }
}

/// Complete JSON document for one report.
#[derive(Debug, Serialize)]
pub struct JsonOutput<'a> {
    /// Byte-identical groups
    pub exact_groups: &'a [DuplicateGroup],
    /// Visually similar image clusters
    pub similar_groups: &'a [SimilarGroup],
    /// Non-fatal errors
    pub errors: Vec<JsonScanError>,
    /// Scan counters
    pub summary: &'a ScanSummary,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DS000")
    pub exit_code_name: &'static str,
}

impl<'a> JsonOutput<'a> {
    /// Build the document for `report`.
    #[must_use]
    pub fn new(report: &'a ScanReport, exit_code: ExitCode) -> Self {
        Self {
            exact_groups: &report.exact_groups,
            similar_groups: &report.similar_groups,
            errors: report.errors.iter().map(JsonScanError::from).collect(),
            summary: &report.summary,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix(),
        }
    }

    /// Serialize to compact JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output generation.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization failed.
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Writing the output failed.
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
