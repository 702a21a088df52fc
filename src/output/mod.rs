//! Output formatters for scan reports.
//!
//! This module provides the two report formats:
//! - text, two labeled sections for reading
//! - JSON for automation and scripting
//!
//! # Example
//!
//! ```no_run
//! use dupescan::duplicates::DuplicateFinder;
//! use dupescan::output::TextOutput;
//! use std::path::Path;
//!
//! let report = DuplicateFinder::with_defaults()
//!     .find_duplicates(Path::new("."))
//!     .unwrap();
//!
//! print!("{}", TextOutput::new(&report, false).render());
//! ```

pub mod json;
pub mod text;

// Re-export main types
pub use json::{JsonOutput, JsonOutputError};
pub use text::{format_summary, TextOutput};
