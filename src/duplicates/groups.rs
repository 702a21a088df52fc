//! Duplicate and similarity groups.
//!
//! # Overview
//!
//! A group is anchored on its canonical path, the first file observed for a
//! content hash (exact groups) or for a perceptual cluster (similar groups).
//! Members follow in discovery order. Groups are only reported once they
//! have at least one member besides the canonical file.
//!
//! # Example
//!
//! ```
//! use dupescan::duplicates::DuplicateGroup;
//! use std::path::PathBuf;
//!
//! let mut group = DuplicateGroup::new(0xabcd, PathBuf::from("/a.txt"), 1024);
//! assert!(!group.has_duplicates());
//!
//! group.push(PathBuf::from("/b.txt"));
//! assert_eq!(group.len(), 2);
//! assert_eq!(group.reclaimable_space(), 1024);
//! ```

use std::path::{Path, PathBuf};

use serde::{Serialize, Serializer};

use crate::scanner::{hash_to_hex, ContentHash, PerceptualHash};

fn serialize_hex<S: Serializer>(hash: &ContentHash, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hash_to_hex(*hash))
}

/// Files sharing one content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    /// Content hash shared by every file in the group
    #[serde(serialize_with = "serialize_hex")]
    pub hash: ContentHash,
    /// First path observed with this hash
    pub canonical: PathBuf,
    /// Later paths with the same hash, in discovery order
    pub duplicates: Vec<PathBuf>,
    /// Size of each file in bytes
    pub size: u64,
}

impl DuplicateGroup {
    /// Create a group holding only its canonical file.
    #[must_use]
    pub fn new(hash: ContentHash, canonical: PathBuf, size: u64) -> Self {
        Self {
            hash,
            canonical,
            duplicates: Vec::new(),
            size,
        }
    }

    /// Append a duplicate.
    pub fn push(&mut self, path: PathBuf) {
        self.duplicates.push(path);
    }

    /// Number of files in this group, canonical included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.duplicates.len() + 1
    }

    /// Always false; a group holds at least its canonical file.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Check if any duplicate has been observed.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        !self.duplicates.is_empty()
    }

    /// Bytes freed by keeping only the canonical file.
    #[must_use]
    pub fn reclaimable_space(&self) -> u64 {
        self.size * self.duplicates.len() as u64
    }

    /// Every path in the group, canonical first.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.canonical.as_path()).chain(self.duplicates.iter().map(PathBuf::as_path))
    }
}

/// A file judged visually similar to a cluster's canonical image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimilarMember {
    /// Path of the similar image
    pub path: PathBuf,
    /// Hamming distance to the canonical image's hash
    pub distance: u32,
}

/// Images clustered around one canonical perceptual hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimilarGroup {
    /// Perceptual hash of the canonical image
    pub hash: PerceptualHash,
    /// First image observed for this cluster
    pub canonical: PathBuf,
    /// Later similar images, in discovery order
    pub members: Vec<SimilarMember>,
}

impl SimilarGroup {
    /// Create a cluster holding only its canonical image.
    #[must_use]
    pub fn new(hash: PerceptualHash, canonical: PathBuf) -> Self {
        Self {
            hash,
            canonical,
            members: Vec::new(),
        }
    }

    /// Append a similar image.
    pub fn push(&mut self, path: PathBuf, distance: u32) {
        self.members.push(SimilarMember { path, distance });
    }

    /// Number of images in this cluster, canonical included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len() + 1
    }

    /// Always false; a cluster holds at least its canonical image.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Check if any similar image has been observed.
    #[must_use]
    pub fn has_members(&self) -> bool {
        !self.members.is_empty()
    }
}
