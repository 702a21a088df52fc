//! Streaming XXH64 content hasher.
//!
//! # Overview
//!
//! This module provides the [`ContentHasher`] used for exact-duplicate
//! detection. Bytes are fed incrementally, so memory use is bounded by the
//! caller's chunk size regardless of file length.
//!
//! # Example
//!
//! ```
//! use dupescan::scanner::hasher::{hash_bytes, ContentHasher};
//!
//! let mut hasher = ContentHasher::new();
//! hasher.update(b"hello ");
//! hasher.update(b"world");
//!
//! assert_eq!(hasher.finish(), hash_bytes(b"hello world"));
//! ```

use xxhash_rust::xxh64::{xxh64, Xxh64};

/// Seed used for every content hash so results are stable across runs.
pub const HASH_SEED: u64 = 0;

/// Default read size for streaming a file through the hasher.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// 64-bit content fingerprint.
pub type ContentHash = u64;

/// Incremental 64-bit content hasher.
#[derive(Clone)]
pub struct ContentHasher {
    state: Xxh64,
    bytes: u64,
}

impl ContentHasher {
    /// Create a hasher with no input.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Xxh64::new(HASH_SEED),
            bytes: 0,
        }
    }

    /// Feed the next slice of the stream.
    pub fn update(&mut self, chunk: &[u8]) {
        self.state.update(chunk);
        self.bytes += chunk.len() as u64;
    }

    /// Number of bytes fed so far.
    #[must_use]
    pub fn bytes_hashed(&self) -> u64 {
        self.bytes
    }

    /// Final digest for everything fed so far.
    #[must_use]
    pub fn finish(&self) -> ContentHash {
        self.state.digest()
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ContentHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentHasher")
            .field("bytes", &self.bytes)
            .finish_non_exhaustive()
    }
}

/// One-shot hash of an in-memory buffer.
#[must_use]
pub fn hash_bytes(data: &[u8]) -> ContentHash {
    xxh64(data, HASH_SEED)
}

/// Format a content hash as 16 lowercase hex digits.
#[must_use]
pub fn hash_to_hex(hash: ContentHash) -> String {
    format!("{hash:016x}")
}
