//! Per-scan ownership of both indices and the final report.
//!
//! # Overview
//!
//! An [`Aggregator`] lives for exactly one scan: it is created empty, fed
//! every [`FingerprintResult`] through [`Aggregator::observe`] by a single
//! consumer, then consumed by [`Aggregator::finish`] into a [`ScanReport`].
//! Nothing is shared, so neither index needs a lock.
//!
//! # Example
//!
//! ```
//! use dupescan::duplicates::{Aggregator, BloomConfig};
//! use dupescan::scanner::{FingerprintResult, PerceptualHash};
//! use std::path::PathBuf;
//!
//! let file = |path: &str| FingerprintResult {
//!     path: PathBuf::from(path),
//!     content_hash: 7,
//!     is_image: false,
//!     perceptual_hash: PerceptualHash::ZERO,
//!     size: 5,
//! };
//!
//! let mut aggregator = Aggregator::new(BloomConfig::default(), 10);
//! aggregator.observe(&file("/a.txt"));
//! aggregator.observe(&file("/b.txt"));
//!
//! let report = aggregator.finish();
//! assert_eq!(report.exact_groups.len(), 1);
//! assert_eq!(report.summary.duplicate_files, 1);
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Serialize, Serializer};

use super::exact::{BloomConfig, ExactClassification, ExactDedupIndex};
use super::groups::{DuplicateGroup, SimilarGroup};
use super::similar::{ImageSimilarityIndex, SimilarityClassification};
use crate::scanner::{FingerprintResult, ScanError};

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

/// Summary statistics from one scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanSummary {
    /// Directory that was scanned
    pub root: PathBuf,
    /// Files fingerprinted plus files that failed
    pub total_files: usize,
    /// Files with a content hash
    pub fingerprinted_files: usize,
    /// Files decoded as PNG or JPEG
    pub image_files: usize,
    /// Scan errors of every kind
    pub error_count: usize,
    /// Scan errors tied to a single file
    pub file_errors: usize,
    /// Bytes fed through the content hasher
    pub bytes_hashed: u64,
    /// Exact groups with at least one duplicate
    pub exact_groups: usize,
    /// Duplicates across all exact groups, canonicals excluded
    pub duplicate_files: usize,
    /// Bytes freed by keeping one file per exact group
    pub reclaimable_bytes: u64,
    /// Image clusters with at least one similar member
    pub similar_groups: usize,
    /// Similar members across all clusters, canonicals excluded
    pub similar_files: usize,
    /// Bloom filter hits the authoritative map rejected
    pub bloom_false_positives: usize,
    /// Wall-clock time of the scan
    #[serde(rename = "duration_secs", serialize_with = "serialize_secs")]
    pub duration: Duration,
    /// Whether a shutdown request cut the walk short
    pub interrupted: bool,
}

impl ScanSummary {
    /// Human-readable reclaimable space.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        bytesize::ByteSize::b(self.reclaimable_bytes).to_string()
    }

    /// Human-readable hashed volume.
    #[must_use]
    pub fn hashed_display(&self) -> String {
        bytesize::ByteSize::b(self.bytes_hashed).to_string()
    }
}

/// Everything a scan produced.
#[derive(Debug, Default, Serialize)]
pub struct ScanReport {
    /// Byte-identical groups in canonical discovery order
    pub exact_groups: Vec<DuplicateGroup>,
    /// Visually similar image clusters in canonical discovery order
    pub similar_groups: Vec<SimilarGroup>,
    /// Counters for the scan
    pub summary: ScanSummary,
    /// Non-fatal errors in arrival order
    #[serde(skip)]
    pub errors: Vec<ScanError>,
}

impl ScanReport {
    /// Check if any group was found.
    #[must_use]
    pub fn has_groups(&self) -> bool {
        !self.exact_groups.is_empty() || !self.similar_groups.is_empty()
    }
}

/// Owns the exact and similarity indices for one scan.
#[derive(Debug)]
pub struct Aggregator {
    exact: ExactDedupIndex,
    similar: ImageSimilarityIndex,
    fingerprinted: usize,
    images: usize,
    bytes_hashed: u64,
}

impl Aggregator {
    /// Create an aggregator with fresh, empty indices.
    #[must_use]
    pub fn new(bloom: BloomConfig, similarity_threshold: u32) -> Self {
        Self {
            exact: ExactDedupIndex::new(bloom),
            similar: ImageSimilarityIndex::new(similarity_threshold),
            fingerprinted: 0,
            images: 0,
            bytes_hashed: 0,
        }
    }

    /// Feed one result to both indices.
    pub fn observe(&mut self, result: &FingerprintResult) -> ExactClassification {
        self.fingerprinted += 1;
        self.bytes_hashed += result.size;

        let exact = self.exact.observe(result);
        if result.is_image {
            self.images += 1;
            if let SimilarityClassification::Similar {
                canonical,
                distance,
            } = self.similar.observe(result)
            {
                log::debug!(
                    "{} looks like {} (distance {})",
                    result.path.display(),
                    canonical.display(),
                    distance
                );
            }
        }
        exact
    }

    /// Finalize into a report. Scan-level fields (`root`, errors, timing)
    /// are left for the caller to fill in.
    #[must_use]
    pub fn finish(self) -> ScanReport {
        let false_positives = self.exact.false_positives();
        let exact_groups = self.exact.into_groups();
        let similar_groups = self.similar.into_groups();

        let summary = ScanSummary {
            total_files: self.fingerprinted,
            fingerprinted_files: self.fingerprinted,
            image_files: self.images,
            bytes_hashed: self.bytes_hashed,
            exact_groups: exact_groups.len(),
            duplicate_files: exact_groups.iter().map(|g| g.duplicates.len()).sum(),
            reclaimable_bytes: exact_groups
                .iter()
                .map(DuplicateGroup::reclaimable_space)
                .sum(),
            similar_groups: similar_groups.len(),
            similar_files: similar_groups.iter().map(|g| g.members.len()).sum(),
            bloom_false_positives: false_positives,
            ..ScanSummary::default()
        };

        ScanReport {
            exact_groups,
            similar_groups,
            summary,
            errors: Vec::new(),
        }
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(
            BloomConfig::default(),
            crate::scanner::perceptual::DEFAULT_SIMILARITY_THRESHOLD,
        )
    }
}
