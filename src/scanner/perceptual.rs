//! Perceptual image hashing for similarity detection.
//!
//! This module provides the capabilities the fingerprinter consumes for
//! images: magic-byte classification ([`classify`]), pixel decoding
//! ([`decode`]) and the 64-bit difference hash ([`PerceptualHasher`]).
//! A difference hash stays stable under re-encoding and small crops, so
//! visually near-identical files land within a small Hamming distance.

use std::fmt;
use std::io::{BufRead, Seek};

use image::{DynamicImage, ImageFormat, ImageReader};
use image_hasher::{HashAlg, HasherConfig};
use serde::{Deserialize, Serialize};

/// Default similarity threshold: distances strictly below this are similar.
pub const DEFAULT_SIMILARITY_THRESHOLD: u32 = 10;

/// Number of bits in a [`PerceptualHash`].
pub const PERCEPTUAL_HASH_BITS: u32 = 64;

/// Image formats the scanner fingerprints perceptually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    /// Portable Network Graphics.
    Png,
    /// JPEG/JFIF.
    Jpeg,
}

impl ImageKind {
    fn format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Png => write!(f, "png"),
            Self::Jpeg => write!(f, "jpeg"),
        }
    }
}

/// Sniff the leading bytes of a file.
///
/// Returns `None` for anything that is not a supported image, including
/// formats `image` recognizes but the scanner does not hash.
#[must_use]
pub fn classify(bytes: &[u8]) -> Option<ImageKind> {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => Some(ImageKind::Png),
        Ok(ImageFormat::Jpeg) => Some(ImageKind::Jpeg),
        _ => None,
    }
}

/// Decode a full image stream of the given kind into a pixel grid.
///
/// # Errors
///
/// Returns the decoder's error if the stream is truncated or malformed.
pub fn decode<R: BufRead + Seek>(reader: R, kind: ImageKind) -> image::ImageResult<DynamicImage> {
    ImageReader::with_format(reader, kind.format()).decode()
}

/// 64-bit difference hash of an image.
///
/// Bits are packed row-major, most significant bit first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PerceptualHash(pub u64);

impl PerceptualHash {
    /// The all-zero hash, used for files that are not images.
    pub const ZERO: Self = Self(0);

    /// Build a hash from big-endian packed bytes.
    ///
    /// Bytes beyond the eighth are ignored; fewer than eight are
    /// left-aligned into the high bits.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut value = 0u64;
        for (i, byte) in bytes.iter().take(8).enumerate() {
            value |= u64::from(*byte) << (56 - 8 * i);
        }
        Self(value)
    }

    /// Number of differing bits between two hashes.
    #[must_use]
    pub fn distance(&self, other: &Self) -> u32 {
        (self.0 ^ other.0).count_ones()
    }

    /// Raw bit vector.
    #[must_use]
    pub fn bits(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PerceptualHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Computes difference hashes for decoded images.
///
/// The image is reduced to luma and resized to a 9×8 grid; each pair of
/// horizontally adjacent cells contributes one bit.
pub struct PerceptualHasher {
    hasher: image_hasher::Hasher,
}

impl PerceptualHasher {
    /// Create a hasher producing 64-bit difference hashes.
    #[must_use]
    pub fn new() -> Self {
        let config = HasherConfig::new()
            .hash_alg(HashAlg::Gradient)
            .hash_size(8, 8);

        Self {
            hasher: config.to_hasher(),
        }
    }

    /// Hash an already decoded image.
    #[must_use]
    pub fn hash_image(&self, image: &DynamicImage) -> PerceptualHash {
        let hash = self.hasher.hash_image(image);
        PerceptualHash::from_bytes(hash.as_bytes())
    }
}

impl Default for PerceptualHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PerceptualHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerceptualHasher")
            .field("algorithm", &"dHash")
            .field("bits", &PERCEPTUAL_HASH_BITS)
            .finish()
    }
}
