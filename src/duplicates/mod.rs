//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Exact duplicate detection behind a Bloom pre-filter
//! - Perceptual near-duplicate clustering of images
//! - Non-fatal error collection
//! - Pipeline orchestration and the final report

pub mod aggregator;
pub mod errors;
pub mod exact;
pub mod finder;
pub mod groups;
pub mod similar;

pub use aggregator::{Aggregator, ScanReport, ScanSummary};
pub use errors::{DiagnosticSink, ErrorCollector, StderrSink};
pub use exact::{
    BloomConfig, ExactClassification, ExactDedupIndex, MembershipFilter, DEFAULT_BLOOM_CAPACITY,
    DEFAULT_BLOOM_FP_RATE,
};
pub use finder::{DuplicateFinder, FinderConfig, FinderError};
pub use groups::{DuplicateGroup, SimilarGroup, SimilarMember};
pub use similar::{ImageSimilarityIndex, SimilarityClassification};
