//! Near-duplicate image index.
//!
//! Each image joins the earliest-inserted cluster whose canonical hash is
//! within the distance threshold, or starts a new cluster. Lookup is a
//! BK-tree range query over Hamming distance; among all clusters in range
//! the one with the lowest insertion ordinal wins, which gives the same
//! answer as scanning clusters in insertion order and stopping at the
//! first match.

use std::collections::HashMap;
use std::path::PathBuf;

use bk_tree::{BKTree, Metric};

use super::groups::SimilarGroup;
use crate::scanner::perceptual::DEFAULT_SIMILARITY_THRESHOLD;
use crate::scanner::{FingerprintResult, PerceptualHash};

/// A cluster's canonical hash tagged with its insertion ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ClusterKey {
    hash: PerceptualHash,
    ordinal: usize,
}

/// Metric for comparing cluster keys by Hamming distance of their hashes.
#[derive(Default, Clone, Copy, Debug)]
struct HammingMetric;

impl Metric<ClusterKey> for HammingMetric {
    fn distance(&self, a: &ClusterKey, b: &ClusterKey) -> u32 {
        a.hash.distance(&b.hash)
    }

    fn threshold_distance(&self, a: &ClusterKey, b: &ClusterKey, threshold: u32) -> Option<u32> {
        let d = self.distance(a, b);
        if d <= threshold {
            Some(d)
        } else {
            None
        }
    }
}

/// Outcome of observing one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimilarityClassification {
    /// Starts a new cluster (or was not an image).
    New,
    /// Joined the cluster anchored at `canonical`.
    Similar {
        /// Canonical image of the cluster
        canonical: PathBuf,
        /// Hamming distance to the canonical hash
        distance: u32,
    },
}

/// Clusters images whose perceptual hashes are close.
pub struct ImageSimilarityIndex {
    /// Distances strictly below this are similar
    threshold: u32,
    exact: HashMap<PerceptualHash, usize>,
    tree: BKTree<ClusterKey, HammingMetric>,
    groups: Vec<SimilarGroup>,
}

impl ImageSimilarityIndex {
    /// Create an empty index; `threshold` is clamped to 64 bits.
    #[must_use]
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.min(crate::scanner::perceptual::PERCEPTUAL_HASH_BITS),
            exact: HashMap::new(),
            tree: BKTree::new(HammingMetric),
            groups: Vec::new(),
        }
    }

    /// Similarity threshold in use.
    #[must_use]
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Classify an image fingerprint and record it.
    ///
    /// Results that are not images are ignored and reported as `New`.
    pub fn observe(&mut self, result: &FingerprintResult) -> SimilarityClassification {
        if !result.is_image {
            return SimilarityClassification::New;
        }
        let hash = result.perceptual_hash;

        let found = match self.exact.get(&hash) {
            Some(&ordinal) => Some((ordinal, 0)),
            None => self.nearest(hash),
        };

        match found {
            Some((ordinal, distance)) => {
                let group = &mut self.groups[ordinal];
                group.push(result.path.clone(), distance);
                log::trace!(
                    "{} is similar to {} (distance {})",
                    result.path.display(),
                    group.canonical.display(),
                    distance
                );
                SimilarityClassification::Similar {
                    canonical: group.canonical.clone(),
                    distance,
                }
            }
            None => {
                let ordinal = self.groups.len();
                self.exact.insert(hash, ordinal);
                self.tree.add(ClusterKey { hash, ordinal });
                self.groups
                    .push(SimilarGroup::new(hash, result.path.clone()));
                SimilarityClassification::New
            }
        }
    }

    /// Earliest-inserted cluster strictly within the threshold.
    fn nearest(&self, hash: PerceptualHash) -> Option<(usize, u32)> {
        if self.threshold == 0 {
            return None;
        }
        let probe = ClusterKey {
            hash,
            ordinal: usize::MAX,
        };

        self.tree
            .find(&probe, self.threshold - 1)
            .map(|(distance, key)| (key.ordinal, distance))
            .min_by_key(|&(ordinal, _)| ordinal)
    }

    /// Number of clusters, singletons included.
    #[must_use]
    pub fn cluster_count(&self) -> usize {
        self.groups.len()
    }

    /// Consume the index, keeping only clusters with similar members.
    #[must_use]
    pub fn into_groups(self) -> Vec<SimilarGroup> {
        self.groups
            .into_iter()
            .filter(SimilarGroup::has_members)
            .collect()
    }
}

impl Default for ImageSimilarityIndex {
    fn default() -> Self {
        Self::new(DEFAULT_SIMILARITY_THRESHOLD)
    }
}

impl std::fmt::Debug for ImageSimilarityIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageSimilarityIndex")
            .field("threshold", &self.threshold)
            .field("clusters", &self.groups.len())
            .finish_non_exhaustive()
    }
}
