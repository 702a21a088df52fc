//! Exact-duplicate index.
//!
//! # Overview
//!
//! [`ExactDedupIndex`] classifies each fingerprint as the first file seen
//! with its content hash or as a duplicate of that first file. A Bloom
//! filter answers the common "definitely new" case without touching the
//! map; every filter hit is confirmed against the authoritative
//! `hash -> canonical` map before anything is grouped, so a filter false
//! positive can only cost a map lookup.
//!
//! # Example
//!
//! ```
//! use dupescan::duplicates::{BloomConfig, ExactClassification, ExactDedupIndex};
//! use dupescan::scanner::{FingerprintResult, PerceptualHash};
//! use std::path::PathBuf;
//!
//! let result = |path: &str| FingerprintResult {
//!     path: PathBuf::from(path),
//!     content_hash: 42,
//!     is_image: false,
//!     perceptual_hash: PerceptualHash::ZERO,
//!     size: 3,
//! };
//!
//! let mut index = ExactDedupIndex::new(BloomConfig::default());
//! assert_eq!(index.observe(&result("/a")), ExactClassification::New);
//! assert_eq!(
//!     index.observe(&result("/b")),
//!     ExactClassification::Duplicate(PathBuf::from("/a"))
//! );
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use growable_bloom_filter::GrowableBloom;

use super::groups::DuplicateGroup;
use crate::scanner::{ContentHash, FingerprintResult};

/// Default number of distinct hashes the filter is sized for.
pub const DEFAULT_BLOOM_CAPACITY: usize = 20_000;

/// Default target false-positive rate of the filter.
pub const DEFAULT_BLOOM_FP_RATE: f64 = 0.01;

const MIN_BLOOM_FP_RATE: f64 = 0.0001;
const MAX_BLOOM_FP_RATE: f64 = 0.1;

/// Probabilistic set membership used as the index's fast path.
///
/// `contains` may return false positives but never false negatives for
/// inserted hashes.
pub trait MembershipFilter {
    /// Whether `hash` may have been inserted.
    fn contains(&self, hash: ContentHash) -> bool;

    /// Record `hash` as present.
    fn insert(&mut self, hash: ContentHash);
}

impl MembershipFilter for GrowableBloom {
    fn contains(&self, hash: ContentHash) -> bool {
        GrowableBloom::contains(self, hash)
    }

    fn insert(&mut self, hash: ContentHash) {
        GrowableBloom::insert(self, hash);
    }
}

/// Sizing for the Bloom pre-filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomConfig {
    /// Expected number of distinct content hashes.
    pub capacity: usize,
    /// Target false-positive rate.
    pub fp_rate: f64,
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_BLOOM_CAPACITY,
            fp_rate: DEFAULT_BLOOM_FP_RATE,
        }
    }
}

impl BloomConfig {
    /// Set the expected item count (at least one).
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Set the false-positive rate, clamped to `[0.0001, 0.1]`.
    #[must_use]
    pub fn with_fp_rate(mut self, rate: f64) -> Self {
        self.fp_rate = clamp_fp_rate(rate);
        self
    }

    /// Build an empty filter with this sizing.
    #[must_use]
    pub fn build(&self) -> GrowableBloom {
        GrowableBloom::new(clamp_fp_rate(self.fp_rate), self.capacity.max(1))
    }
}

/// Clamp a false-positive rate into the supported range.
#[must_use]
pub fn clamp_fp_rate(rate: f64) -> f64 {
    if rate.is_nan() {
        return DEFAULT_BLOOM_FP_RATE;
    }
    rate.clamp(MIN_BLOOM_FP_RATE, MAX_BLOOM_FP_RATE)
}

/// Outcome of observing one fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExactClassification {
    /// First file seen with this content hash.
    New,
    /// Same content as the given canonical path.
    Duplicate(PathBuf),
}

/// Exact-duplicate index with a Bloom pre-filter.
pub struct ExactDedupIndex<F = GrowableBloom> {
    filter: F,
    /// Authoritative map from content hash to its slot in `groups`
    canonical: HashMap<ContentHash, usize>,
    groups: Vec<DuplicateGroup>,
    false_positives: usize,
}

impl ExactDedupIndex<GrowableBloom> {
    /// Create an empty index with a Bloom filter sized by `config`.
    #[must_use]
    pub fn new(config: BloomConfig) -> Self {
        Self::with_filter(config.build())
    }
}

impl<F: MembershipFilter> ExactDedupIndex<F> {
    /// Create an empty index over a caller-supplied filter.
    #[must_use]
    pub fn with_filter(filter: F) -> Self {
        Self {
            filter,
            canonical: HashMap::new(),
            groups: Vec::new(),
            false_positives: 0,
        }
    }

    /// Classify a fingerprint and record it.
    pub fn observe(&mut self, result: &FingerprintResult) -> ExactClassification {
        let hash = result.content_hash;

        if !self.filter.contains(hash) {
            self.filter.insert(hash);
            self.insert_canonical(result);
            return ExactClassification::New;
        }

        match self.canonical.get(&hash) {
            Some(&slot) => {
                let group = &mut self.groups[slot];
                group.push(result.path.clone());
                ExactClassification::Duplicate(group.canonical.clone())
            }
            None => {
                self.false_positives += 1;
                log::debug!(
                    "Bloom filter false positive for {} ({:016x})",
                    result.path.display(),
                    hash
                );
                self.insert_canonical(result);
                ExactClassification::New
            }
        }
    }

    fn insert_canonical(&mut self, result: &FingerprintResult) {
        self.canonical.insert(result.content_hash, self.groups.len());
        self.groups.push(DuplicateGroup::new(
            result.content_hash,
            result.path.clone(),
            result.size,
        ));
    }

    /// Canonical path recorded for a content hash.
    #[must_use]
    pub fn canonical_path(&self, hash: ContentHash) -> Option<&Path> {
        self.canonical
            .get(&hash)
            .map(|&slot| self.groups[slot].canonical.as_path())
    }

    /// Number of distinct content hashes recorded.
    #[must_use]
    pub fn unique_count(&self) -> usize {
        self.groups.len()
    }

    /// Filter hits that the authoritative map did not confirm.
    #[must_use]
    pub fn false_positives(&self) -> usize {
        self.false_positives
    }

    /// Groups with at least one duplicate, in canonical discovery order.
    pub fn duplicate_groups(&self) -> impl Iterator<Item = &DuplicateGroup> {
        self.groups.iter().filter(|g| g.has_duplicates())
    }

    /// Consume the index, keeping only groups with duplicates.
    #[must_use]
    pub fn into_groups(self) -> Vec<DuplicateGroup> {
        self.groups
            .into_iter()
            .filter(DuplicateGroup::has_duplicates)
            .collect()
    }
}

impl<F> std::fmt::Debug for ExactDedupIndex<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExactDedupIndex")
            .field("unique", &self.groups.len())
            .field("false_positives", &self.false_positives)
            .finish_non_exhaustive()
    }
}
