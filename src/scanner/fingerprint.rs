//! Per-file fingerprinting.
//!
//! # Overview
//!
//! [`Fingerprinter::fingerprint`] streams a file once through the
//! [`ContentHasher`] in fixed-size chunks. The first chunk is also sniffed
//! for an image signature; recognized images are rewound and decoded in
//! full to compute a [`PerceptualHash`].
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::{Fingerprinter, FingerprintConfig};
//! use std::path::Path;
//!
//! let fingerprinter = Fingerprinter::new(FingerprintConfig::default());
//! let result = fingerprinter.fingerprint(Path::new("photo.png")).unwrap();
//! println!("{:016x} image={}", result.content_hash, result.is_image);
//! ```

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::hasher::{ContentHash, ContentHasher, DEFAULT_CHUNK_SIZE};
use super::perceptual::{self, ImageKind, PerceptualHash, PerceptualHasher};
use super::ScanError;

/// Configuration for fingerprinting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FingerprintConfig {
    /// Bytes read per chunk. Also the window used for image classification.
    pub chunk_size: usize,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl FingerprintConfig {
    /// Set the chunk size (at least one byte).
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}

/// Fingerprints of a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FingerprintResult {
    /// Path of the file as discovered by the walk
    pub path: PathBuf,
    /// Hash of the entire byte stream
    pub content_hash: ContentHash,
    /// Whether the file was classified and decoded as an image
    pub is_image: bool,
    /// Difference hash; zero unless `is_image`
    pub perceptual_hash: PerceptualHash,
    /// Number of bytes hashed
    pub size: u64,
}

/// Computes content and perceptual fingerprints.
#[derive(Debug, Default)]
pub struct Fingerprinter {
    config: FingerprintConfig,
    perceptual: PerceptualHasher,
}

impl Fingerprinter {
    /// Create a fingerprinter with the given configuration.
    #[must_use]
    pub fn new(config: FingerprintConfig) -> Self {
        Self {
            config: config.with_chunk_size(config.chunk_size),
            perceptual: PerceptualHasher::new(),
        }
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> FingerprintConfig {
        self.config
    }

    /// Fingerprint the file at `path`.
    ///
    /// # Errors
    ///
    /// - [`ScanError::FileOpen`] if the file cannot be opened
    /// - [`ScanError::FileRead`] if reading or rewinding fails part way
    /// - [`ScanError::ImageDecode`] if the file looks like an image but does
    ///   not decode; the content hash is discarded in that case
    pub fn fingerprint(&self, path: &Path) -> Result<FingerprintResult, ScanError> {
        let mut file = File::open(path).map_err(|source| ScanError::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;

        let (hasher, kind) = self.stream(&mut file, path)?;

        let mut result = FingerprintResult {
            path: path.to_path_buf(),
            content_hash: hasher.finish(),
            is_image: false,
            perceptual_hash: PerceptualHash::ZERO,
            size: hasher.bytes_hashed(),
        };

        if let Some(kind) = kind {
            result.perceptual_hash = self.perceptual_hash(file, path, kind)?;
            result.is_image = true;
        }

        Ok(result)
    }

    /// Hash the whole stream, classifying the first chunk only.
    fn stream(
        &self,
        file: &mut File,
        path: &Path,
    ) -> Result<(ContentHasher, Option<ImageKind>), ScanError> {
        let mut hasher = ContentHasher::new();
        let mut buf = vec![0u8; self.config.chunk_size];
        let mut classified: Option<Option<ImageKind>> = None;

        loop {
            let n = match file.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(ScanError::FileRead {
                        path: path.to_path_buf(),
                        source,
                    })
                }
            };

            let chunk = &buf[..n];
            hasher.update(chunk);

            if classified.is_none() {
                let kind = perceptual::classify(chunk);
                log::trace!("Classified {} as {:?}", path.display(), kind);
                classified = Some(kind);
            }
        }

        Ok((hasher, classified.flatten()))
    }

    fn perceptual_hash(
        &self,
        mut file: File,
        path: &Path,
        kind: ImageKind,
    ) -> Result<PerceptualHash, ScanError> {
        file.seek(SeekFrom::Start(0))
            .map_err(|source| ScanError::FileRead {
                path: path.to_path_buf(),
                source,
            })?;

        let image = perceptual::decode(BufReader::new(file), kind).map_err(|source| {
            log::debug!("Failed to decode {} as {}: {}", path.display(), kind, source);
            ScanError::ImageDecode {
                path: path.to_path_buf(),
                source,
            }
        })?;

        Ok(self.perceptual.hash_image(&image))
    }
}
